//! phs-core: shared foundation for the heat-strain workspace.
//!
//! Contains:
//! - units (uom SI types + constructors for the quantities PHS works in)
//! - numeric (tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
