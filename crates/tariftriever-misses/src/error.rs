use thiserror::Error;

#[derive(Debug, Error)]
pub enum MissError {
    /// A record could not be handed off or persisted. Logged, never returned
    /// to a resolution caller.
    #[error("Miss recording failed: {message}")]
    RecordingFailed { message: String },

    /// Backing store failure while reading statistics
    #[error("Miss storage error: {message}")]
    Storage { message: String },
}

impl MissError {
    pub fn recording_failed(message: impl std::fmt::Display) -> Self {
        Self::RecordingFailed {
            message: message.to_string(),
        }
    }

    pub fn storage(message: impl std::fmt::Display) -> Self {
        Self::Storage {
            message: message.to_string(),
        }
    }
}

pub type MissResult<T> = Result<T, MissError>;
