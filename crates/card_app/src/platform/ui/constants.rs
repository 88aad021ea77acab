pub const WINDOW_TITLE: &str = "post-card";
pub const WINDOW_WIDTH: f32 = 768.0;
pub const WINDOW_HEIGHT: f32 = 860.0;

pub const INPUT_HINT: &str = "https://twitter.com/jack/status/20 or 20";

pub const ID_INPUT_URL: &str = "input_url";
pub const ID_COMBO_FORMAT: &str = "combo_format";
pub const ID_COMBO_THEME: &str = "combo_theme";
pub const ID_INPUT_SCALE: &str = "input_scale";
pub const ID_COMBO_LANGUAGE: &str = "combo_language";
pub const ID_COMBO_TIMEZONE: &str = "combo_timezone";
pub const ID_NOTIFICATIONS: &str = "notifications";

pub const PREVIEW_PLACEHOLDER_HEIGHT: f32 = 240.0;
pub const NOTIFICATION_WIDTH: f32 = 320.0;
