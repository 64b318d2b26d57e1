use thiserror::Error;

/// Exit code for invalid configuration or malformed input.
pub const EXIT_CONFIG: u8 = 2;
/// Exit code for a score that cannot be played on the configured instrument.
pub const EXIT_UNPLAYABLE: u8 = 3;
/// Exit code for an internal consistency fault (a bug, not a user error).
pub const EXIT_INTERNAL: u8 = 4;

#[derive(Clone, Error)]
#[error("{message}")]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn unplayable(message: impl Into<String>) -> Self {
        Self::new(EXIT_UNPLAYABLE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(EXIT_INTERNAL, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}
