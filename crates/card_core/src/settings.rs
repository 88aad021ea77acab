use url::form_urlencoded;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_TIMEZONE_MINUTES: i32 = 0;
pub const DEFAULT_SCALE: f64 = 2.0;
pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    #[default]
    Jpg,
    Png,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 2] = [ImageFormat::Jpg, ImageFormat::Png];

    /// File extension used both in the endpoint path and for saved files.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImageFormat::Jpg => "JPG",
            ImageFormat::Png => "PNG",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Light, Theme::Dark];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }
}

/// Rendering options sent to the image endpoint.
///
/// Every field has a documented default; only fields that differ from it end
/// up in a query string (see [`changed_settings`]). The image format is part
/// of the path, never of the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub format: ImageFormat,
    pub theme: Theme,
    pub language: String,
    /// Offset from UTC in minutes. Sent to the endpoint in hours.
    pub timezone_minutes: i32,
    scale: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: ImageFormat::default(),
            theme: Theme::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            timezone_minutes: DEFAULT_TIMEZONE_MINUTES,
            scale: DEFAULT_SCALE,
        }
    }
}

impl Settings {
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Sets the output scale, clamped into `[MIN_SCALE, MAX_SCALE]`.
    ///
    /// Non-finite input is ignored and `false` is returned.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        if !scale.is_finite() {
            return false;
        }
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        true
    }

    pub fn is_default(&self) -> bool {
        changed_settings(self).is_empty()
    }
}

/// Returns the settings that differ from their defaults, as query pairs.
///
/// Keys always appear in the order `lang`, `tz`, `theme`, `scale`. This is the
/// only place that decides what a query string contains; the fetch path and
/// the shareable URL are both built from it.
pub fn changed_settings(settings: &Settings) -> Vec<(&'static str, String)> {
    let mut changed = Vec::new();
    if settings.language != DEFAULT_LANGUAGE {
        changed.push(("lang", settings.language.clone()));
    }
    if settings.timezone_minutes != DEFAULT_TIMEZONE_MINUTES {
        changed.push(("tz", format_offset_hours(settings.timezone_minutes)));
    }
    if settings.theme != Theme::default() {
        changed.push(("theme", settings.theme.as_str().to_string()));
    }
    if settings.scale != DEFAULT_SCALE {
        changed.push(("scale", settings.scale.to_string()));
    }
    changed
}

/// Form-urlencoded query built from [`changed_settings`], `None` when empty.
pub fn query_string(settings: &Settings) -> Option<String> {
    let changed = changed_settings(settings);
    if changed.is_empty() {
        return None;
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &changed {
        serializer.append_pair(key, value);
    }
    Some(serializer.finish())
}

/// Formats a minute offset as hours the way the endpoint expects: `9`, `-5`,
/// `5.5`, `5.75`.
pub fn format_offset_hours(minutes: i32) -> String {
    (f64::from(minutes) / 60.0).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_render_whole_and_fractional_hours() {
        assert_eq!(format_offset_hours(540), "9");
        assert_eq!(format_offset_hours(-300), "-5");
        assert_eq!(format_offset_hours(330), "5.5");
        assert_eq!(format_offset_hours(345), "5.75");
    }

    #[test]
    fn scale_is_clamped_and_rejects_nan() {
        let mut settings = Settings::default();
        assert!(settings.set_scale(9.0));
        assert_eq!(settings.scale(), MAX_SCALE);
        assert!(settings.set_scale(0.2));
        assert_eq!(settings.scale(), MIN_SCALE);
        assert!(!settings.set_scale(f64::NAN));
        assert_eq!(settings.scale(), MIN_SCALE);
    }

    #[test]
    fn query_keys_keep_fixed_order() {
        let settings = Settings {
            format: ImageFormat::Png,
            theme: Theme::Dark,
            language: "ja".to_string(),
            timezone_minutes: 540,
            scale: 3.0,
        };
        assert_eq!(
            query_string(&settings).as_deref(),
            Some("lang=ja&tz=9&theme=dark&scale=3")
        );
    }

    #[test]
    fn query_values_are_urlencoded() {
        let settings = Settings {
            language: "zh Hant&x".to_string(),
            ..Settings::default()
        };
        assert_eq!(query_string(&settings).as_deref(), Some("lang=zh+Hant%26x"));
    }

    #[test]
    fn format_alone_does_not_produce_a_query() {
        let settings = Settings {
            format: ImageFormat::Png,
            ..Settings::default()
        };
        assert!(settings.is_default());
        assert_eq!(query_string(&settings), None);
    }
}
