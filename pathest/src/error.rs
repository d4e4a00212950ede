use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Precondition violations. None of these leave a trajectory or predictor partially modified.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    #[error("invalid {name} {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("{operation} needs at least {required} {unit}, but only {found} available")]
    InsufficientData {
        operation: &'static str,
        required: usize,
        found: usize,
        unit: &'static str,
    },
}

impl Error {
    pub(crate) fn too_few_samples(operation: &'static str, required: usize, found: usize) -> Self {
        Error::InsufficientData {
            operation,
            required,
            found,
            unit: "samples",
        }
    }
}
