//! Error shared by the hen crates.
//!
//! Each downstream crate keeps its own enum and collapses into [`HenError`]
//! where a single error type is wanted.

use crate::numeric::Real;
use thiserror::Error;

pub type HenResult<T> = Result<T, HenError>;

#[derive(Error, Debug)]
pub enum HenError {
    #[error("{quantity} is not finite: {value}")]
    NonFinite { quantity: &'static str, value: Real },

    #[error("{what} has {found} entries, expected {expected}")]
    Shape {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("{what} refers to index {index}, only {len} defined")]
    Reference {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("rejected {what}")]
    Rejected { what: &'static str },
}
