//! Command error types.

use event_store::EventStoreError;
use item_store::ItemStoreError;
use thiserror::Error;

/// Broad classification of a command failure, reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A system fault: encoding, decoding, storage, or an unexpected shape.
    Internal,

    /// A caller mistake: bad, missing, or conflicting input.
    User,
}

impl ErrorKind {
    /// Numeric code placed in the response document.
    pub fn code(self) -> i16 {
        match self {
            ErrorKind::Internal => 1,
            ErrorKind::User => 2,
        }
    }

    /// Reads a response document's error code; zero means success.
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => None,
            2 => Some(ErrorKind::User),
            _ => Some(ErrorKind::Internal),
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Internal => "internal_error",
            ErrorKind::User => "user_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while handling a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A field required at creation is empty or zero.
    #[error("missing {0} for item")]
    MissingField(&'static str),

    /// An item with the same identifier is already stored.
    #[error("item already exists")]
    Conflict,

    /// The supplied item identifier is not a valid UUID.
    #[error("error parsing ItemID: {0}")]
    MalformedIdentifier(#[from] common::ParseItemIdError),

    /// No stored item matches the filter.
    #[error("item not found")]
    NotFound,

    /// An update command lacks its filter or its update.
    #[error("missing {0} in update parameters")]
    MissingUpdateParams(&'static str),

    /// A filter with no non-empty field would select every item.
    #[error("filter must contain at least one field")]
    EmptyFilter,

    /// An update tries to change a field that is fixed after creation.
    #[error("{0} cannot be changed")]
    ImmutableField(&'static str),

    /// The command action is not one this aggregate handles.
    #[error("unknown command action: {0}")]
    UnknownAction(String),

    /// The command outlived its time-to-live.
    #[error("command expired")]
    Expired,

    /// The command payload could not be decoded.
    #[error("error decoding command data: {0}")]
    Decode(#[source] serde_json::Error),

    /// A result or event payload could not be encoded.
    #[error("error encoding {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The item store failed.
    #[error("item store error: {0}")]
    Store(#[from] ItemStoreError),

    /// The event envelope could not be built.
    #[error("event error: {0}")]
    Event(#[from] EventStoreError),

    /// A stored record does not have the expected shape.
    #[error("unexpected record shape: {0}")]
    UnexpectedShape(String),
}

impl CommandError {
    /// Classifies the error for the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::MissingField(_)
            | CommandError::Conflict
            | CommandError::MalformedIdentifier(_)
            | CommandError::NotFound
            | CommandError::MissingUpdateParams(_)
            | CommandError::EmptyFilter
            | CommandError::ImmutableField(_)
            | CommandError::UnknownAction(_)
            | CommandError::Expired => ErrorKind::User,
            CommandError::Decode(_)
            | CommandError::Encode { .. }
            | CommandError::Store(_)
            | CommandError::Event(_)
            | CommandError::UnexpectedShape(_) => ErrorKind::Internal,
        }
    }

    /// Returns true for caller mistakes.
    pub fn is_user_error(&self) -> bool {
        self.kind() == ErrorKind::User
    }
}

/// Result type for command handling.
pub type Result<T> = std::result::Result<T, CommandError>;
