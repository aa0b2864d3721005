//! Exit codes for the CLI tool.

use rdasave::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Not a save container, or a corrupt one
pub const BAD_SAVE: i32 = 3;
/// The target file is not in the container
pub const NOT_FOUND: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// The tree does not have the expected list layout
pub const SCHEMA_ERROR: i32 = 6;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    FatalError,
    BadSave,
    NotFound,
    IoError,
    SchemaError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::FatalError => FATAL_ERROR,
            Self::BadSave => BAD_SAVE,
            Self::NotFound => NOT_FOUND,
            Self::IoError => IO_ERROR,
            Self::SchemaError => SCHEMA_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts an rdasave error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::InvalidFormat(_) | Error::CorruptHeader { .. } => ExitCode::BadSave,
        Error::CorruptData(_) => ExitCode::BadSave,
        Error::EntryNotFound { .. } => ExitCode::NotFound,
        Error::Schema(_) => ExitCode::SchemaError,
        Error::ResourceLimitExceeded(_) => ExitCode::FatalError,
        Error::InvalidCompressionLevel { .. } => ExitCode::BadArgs,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
