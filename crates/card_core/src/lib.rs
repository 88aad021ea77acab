//! Card core: pure form state machine and the strings derived from it.
mod effect;
mod identifier;
mod msg;
mod notification;
mod output;
mod settings;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use identifier::{extract_post_ref, PostRef, PLACEHOLDER_HANDLE, SOURCE_ORIGIN};
pub use msg::{CopyTarget, FetchFailure, Msg};
pub use notification::{Notification, NotificationKind, Severity};
pub use output::{image_path, image_url, scrapbox_snippet};
pub use settings::{
    changed_settings, format_offset_hours, query_string, ImageFormat, Settings, Theme,
    DEFAULT_LANGUAGE, DEFAULT_SCALE, DEFAULT_TIMEZONE_MINUTES, MAX_SCALE, MIN_SCALE,
};
pub use state::{
    AppState, CoreConfig, PreviewImage, RequestId, SettleTimer, Signature, DEFAULT_NOTIFICATION_TTL,
    DEFAULT_ORIGIN, DEFAULT_SETTLE_DELAY,
};
pub use update::update;
pub use view_model::{AppViewModel, NotificationView, PreviewView};
