//! hen-core: stable foundation for the HEN retrofit optimizer.
//!
//! Contains:
//! - units (uom SI types + constructors used at the input boundary)
//! - numeric (Real + tolerances + float helpers)
//! - lambert (principal and lower branches of the Lambert W function)
//! - error (shared error types)

pub mod error;
pub mod lambert;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{HenError, HenResult};
pub use lambert::{lambert_w0, lambert_wm1};
pub use numeric::*;
pub use units::*;
