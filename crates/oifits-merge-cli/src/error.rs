/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `oifits-merge` binary.
/// Every variant maps to a stable exit code (1 or 2) via
/// [`CliError::exit_code`]:
///
/// - Exit code **2** — input failure: the tool could not read or parse the
///   input, or a CLI argument was invalid. These errors terminate early
///   before any domain logic runs.
/// - Exit code **1** — logical failure: the tool ran to completion but the
///   result is a well-defined failure (e.g. the merge pipeline rejected its
///   inputs).
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `oifits-merge` CLI can produce.
///
/// Use [`CliError::exit_code`] to obtain the exit code associated with each
/// variant. [`CliError::message`] returns the human-readable error string
/// that should be printed to stderr before exiting.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured [`--max-file-size`] limit.
    FileTooLarge {
        /// A human-readable label for the source (`"-"` for stdin, or the
        /// filesystem path).
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes, if known (disk files only; `None` for
        /// stdin where the exact size is unknown).
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        /// A human-readable label for the source.
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// An I/O error occurred while reading from stdin.
    StdinReadError {
        /// The underlying I/O error message.
        detail: String,
    },

    /// A generic I/O error not covered by the more specific variants above.
    IoError {
        /// A human-readable label for the source.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// The input content could not be parsed as the OIFITS JSON model.
    ParseFailed {
        /// A human-readable description of the parse failure.
        detail: String,
    },

    /// A CLI argument was syntactically well-formed but semantically
    /// invalid (e.g. a malformed `--mjd-range`).
    InvalidArgument {
        /// A human-readable description of the problem.
        detail: String,
    },

    // --- Exit code 1: logical failures ---
    /// The merge pipeline rejected its inputs (e.g. no files supplied).
    MergeFailed {
        /// A description of the failure, from
        /// [`oifits_merge_core::MergeError`].
        detail: String,
    },

    /// An unexpected internal error (e.g. serialization of a value the CLI
    /// itself constructed).
    InternalError {
        /// A human-readable description.
        detail: String,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    ///
    /// - `2` — input failure (file not found, parse error, bad argument).
    /// - `1` — logical failure (merge pipeline rejection, internal error).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::ParseFailed { .. }
            | Self::InvalidArgument { .. } => 2,

            Self::MergeFailed { .. } | Self::InternalError { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                format!(
                    "error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"
                )
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error reading {source}: {detail}")
            }
            Self::ParseFailed { detail } => {
                format!("error: failed to parse OIFITS JSON: {detail}")
            }
            Self::InvalidArgument { detail } => {
                format!("error: invalid argument: {detail}")
            }
            Self::MergeFailed { detail } => {
                format!("error: merge failed: {detail}")
            }
            Self::InternalError { detail } => {
                format!("error: internal error: {detail}")
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
