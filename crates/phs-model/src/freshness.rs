//! Staleness tracking for the two derived-constants groups.
//!
//! Setting a subject input makes the subject constants stale, setting a
//! step input makes the step constants stale. Recomputing the subject
//! constants always recomputes the step constants too, so a clean subject
//! group implies nothing about the step group until that recompute lands.

/// Whether a constants group reflects the current inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Freshness {
    Clean,
    Stale,
}

impl Freshness {
    pub fn is_stale(self) -> bool {
        self == Freshness::Stale
    }
}

/// Pair of flags with explicit transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstantsTracker {
    subject: Freshness,
    step: Freshness,
}

impl Default for ConstantsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantsTracker {
    /// Nothing has been computed yet: both groups stale.
    pub const fn new() -> Self {
        Self {
            subject: Freshness::Stale,
            step: Freshness::Stale,
        }
    }

    pub fn subject(&self) -> Freshness {
        self.subject
    }

    pub fn step(&self) -> Freshness {
        self.step
    }

    /// A subject input changed. Returns the previous state.
    pub fn subject_input_changed(&mut self) -> Freshness {
        std::mem::replace(&mut self.subject, Freshness::Stale)
    }

    /// A step input changed. Returns the previous state.
    pub fn step_input_changed(&mut self) -> Freshness {
        std::mem::replace(&mut self.step, Freshness::Stale)
    }

    /// Subject constants were recomputed. The step group goes stale because
    /// it depends on them and must be recomputed next.
    pub fn subject_recomputed(&mut self) {
        self.subject = Freshness::Clean;
        self.step = Freshness::Stale;
    }

    /// Step constants were recomputed.
    pub fn step_recomputed(&mut self) {
        self.step = Freshness::Clean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_fully_stale() {
        let t = ConstantsTracker::new();
        assert!(t.subject().is_stale());
        assert!(t.step().is_stale());
    }

    #[test]
    fn subject_recompute_forces_step_recompute() {
        let mut t = ConstantsTracker::new();
        t.subject_recomputed();
        assert_eq!(t.subject(), Freshness::Clean);
        assert_eq!(t.step(), Freshness::Stale);
        t.step_recomputed();
        assert_eq!(t.step(), Freshness::Clean);
    }

    #[test]
    fn input_changes_report_previous_state() {
        let mut t = ConstantsTracker::new();
        t.subject_recomputed();
        t.step_recomputed();
        assert_eq!(t.step_input_changed(), Freshness::Clean);
        assert_eq!(t.step_input_changed(), Freshness::Stale);
        assert_eq!(t.subject(), Freshness::Clean);
        assert_eq!(t.subject_input_changed(), Freshness::Clean);
        assert!(t.subject().is_stale());
    }
}
