use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Everything the form can tell the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    /// Input had no recognizable post identifier.
    InvalidIdentifier,
    /// The endpoint answered 404.
    NotFound,
    /// Any other non-success status; carries the status text.
    HttpError { status_text: String },
    /// The request never produced a response.
    Transport,
    Copied,
    Saved { path: String },
    SaveFailed { reason: String },
}

impl NotificationKind {
    pub fn severity(&self) -> Severity {
        match self {
            NotificationKind::Copied | NotificationKind::Saved { .. } => Severity::Info,
            NotificationKind::InvalidIdentifier
            | NotificationKind::NotFound
            | NotificationKind::HttpError { .. }
            | NotificationKind::Transport
            | NotificationKind::SaveFailed { .. } => Severity::Error,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::InvalidIdentifier => write!(f, "The format of the URL is invalid."),
            NotificationKind::NotFound => write!(f, "No posts found."),
            NotificationKind::HttpError { status_text } => {
                write!(f, "An error has occurred: {status_text}")
            }
            NotificationKind::Transport => write!(f, "An error has occurred."),
            NotificationKind::Copied => write!(f, "copied."),
            NotificationKind::Saved { path } => write!(f, "Saved to {path}"),
            NotificationKind::SaveFailed { reason } => write!(f, "Could not save image: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    /// Clock time last observed by the state when raised. Raised before any
    /// tick, it is stamped by the first one.
    pub(crate) raised_at: Option<Instant>,
}
