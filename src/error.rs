// Error taxonomy
//
// - Construction failures propagate (shader compile/link, missing features, backend refusals).
// - Precondition and range errors flag programming bugs; callers avoid them rather than recover.
// - Soft failures (swap chain creation) never reach this type: they are logged and turned into `None`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An object could not be built.
    #[error("{what} construction failed: {reason}")]
    Construction { what: &'static str, reason: String },

    /// `DescriptorSetLayout::binding` was asked for a binding point it does not declare.
    #[error("Descriptor set layout binding {0} was not found")]
    BindingNotFound(u32),

    /// A logical precondition of the API was violated.
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// An object created by another backend was handed to this one.
    #[error("{0} belongs to another backend")]
    ForeignObject(&'static str),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Failure reported by the underlying graphics API.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn construction(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Construction {
            what,
            reason: reason.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Tells if this error flags a programming bug rather than a runtime condition.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::Precondition(_) | Self::BindingNotFound(_) | Self::ForeignObject(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_not_found_message() {
        let error = Error::BindingNotFound(3);
        assert_eq!(error.to_string(), "Descriptor set layout binding 3 was not found");
        assert!(error.is_precondition());
    }

    #[test]
    fn backend_errors_keep_their_context() {
        use anyhow::Context;
        let failure: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("driver refused"));
        let error: Error = failure.context("Failed to create buffer").unwrap_err().into();
        assert_eq!(error.to_string(), "Failed to create buffer");
        assert!(!error.is_precondition());
    }
}
