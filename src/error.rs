//! Error taxonomy shared by the organize and dispatch pipelines.

use std::path::PathBuf;

/// Everything that can abort a run.
///
/// Each variant carries the offending value so the binary can print one
/// actionable line. Validation variants fire before any copy or send, so a
/// failed run leaves the filesystem and the outbox untouched.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Roster auto-discovery needs exactly one `.csv` in the search directory.
    #[error("expected exactly one .csv roster in {}, found {found}; pass --roster to disambiguate", .dir.display())]
    RosterSearch { dir: PathBuf, found: usize },

    /// The roster path exists but cannot be used as a selection table.
    #[error("{} is not a usable roster: {reason}", .path.display())]
    InvalidRoster { path: PathBuf, reason: String },

    /// The output directory exists and is not empty (or is not a directory).
    #[error("output path {} already exists and is not an empty directory", .path.display())]
    OutputDirConflict { path: PathBuf },

    /// A normalized selection does not fit the canonical frame-name form.
    #[error("'{name}' is not a valid frame name; expected the form {expected}")]
    BadFrameName { name: String, expected: String },

    /// A selected frame has no matching file in the input directory.
    #[error("'{name}' not found in {}", .dir.display())]
    MissingFrame { name: String, dir: PathBuf },

    /// The sender address is malformed or not on the required provider.
    #[error("sender {address} is not usable: {reason}")]
    InvalidSender { address: String, reason: String },

    /// A roster row carries an address no message can be built for.
    #[error("recipient {email} is not a deliverable address: {reason}")]
    BadRecipient { email: String, reason: String },

    /// A selection source yielded no frames at all.
    #[error("{who} selects no frames")]
    EmptySelection { who: String },

    /// No SMTP password could be obtained for a live send.
    #[error("no SMTP password available: {reason}")]
    MissingCredential { reason: String },

    /// Message construction or transport failure.
    #[error("mail error: {reason}")]
    Mail { reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl WorkflowError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn mail(reason: impl std::fmt::Display) -> Self {
        Self::Mail {
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
