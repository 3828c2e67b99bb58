//! Error taxonomy shared by every module.
//!
//! - `DimensionMismatch`: A/b/Aeq/beq or point shapes are inconsistent.
//! - `UnsupportedMethod`: a method name outside the documented allow-list, or a
//!   walk that the chosen volume algorithm cannot drive.
//! - `DegenerateSystem`: empty/unbounded body, or an equality system without a
//!   positive-dimensional feasible null space.
//! - `NumericalFailure`: non-finite or non-positive-definite intermediate results.
//! - `InvalidParameter`: numeric knobs outside their domain (epsilon, counts).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolyError {
    #[error("dimension mismatch in {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("unsupported {kind} `{name}`")]
    UnsupportedMethod { kind: &'static str, name: String },
    #[error("degenerate system: {reason}")]
    DegenerateSystem { reason: String },
    #[error("numerical failure: {reason}")]
    NumericalFailure { reason: String },
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, PolyError>;

impl PolyError {
    pub(crate) fn mismatch(what: &'static str, expected: usize, got: usize) -> Self {
        Self::DimensionMismatch {
            what,
            expected,
            got,
        }
    }

    pub(crate) fn unsupported(kind: &'static str, name: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateSystem {
            reason: reason.into(),
        }
    }

    pub(crate) fn numerical(reason: impl Into<String>) -> Self {
        Self::NumericalFailure {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
