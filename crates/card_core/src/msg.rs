use std::sync::Arc;
use std::time::Instant;

use crate::{ImageFormat, RequestId, Theme};

/// Why a fetch did not produce an image, as the form distinguishes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The endpoint answered 404.
    NotFound,
    /// Any other non-success status, e.g. `"500 Internal Server Error"`.
    Status { text: String },
    /// No response at all (connect error, timeout, body read failure).
    Transport { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    ImageUrl,
    Snippet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the post URL input box.
    InputChanged(String),
    FormatSelected(ImageFormat),
    ThemeSelected(Theme),
    LanguageSelected(String),
    /// Timezone offset from UTC, in minutes.
    TimezoneSelected(i32),
    /// Raw scale value from the numeric field; non-finite values are ignored.
    ScaleEdited(String),
    /// User pressed Enter or the submit button.
    Submitted,
    /// Any form field gained focus.
    FieldFocused,
    /// A form field lost focus at `at`; arms the settle timer.
    FieldBlurred { at: Instant },
    /// Periodic clock tick from the host loop.
    Tick { now: Instant },
    /// Engine delivered the image for a request.
    FetchSucceeded {
        request_id: RequestId,
        bytes: Arc<[u8]>,
        content_type: Option<String>,
    },
    /// Engine reported a failed request.
    FetchFailed {
        request_id: RequestId,
        failure: FetchFailure,
    },
    CopyClicked(CopyTarget),
    /// Clipboard write finished; failures never come back as messages.
    CopyCompleted(CopyTarget),
    /// User clicked the preview image.
    PreviewClicked,
    SaveImageClicked,
    ImageSaved { path: String },
    ImageSaveFailed { reason: String },
    NotificationDismissed(u64),
    /// Fallback for placeholder wiring.
    NoOp,
}
