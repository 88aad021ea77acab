use std::sync::OnceLock;

use regex::Regex;

/// Handle used for the source URL when the input carries no account segment.
pub const PLACEHOLDER_HANDLE: &str = "twitter";
pub const SOURCE_ORIGIN: &str = "https://twitter.com";

/// A post identifier extracted from user input, plus the handle it was posted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRef {
    pub id: String,
    pub handle: String,
}

impl PostRef {
    /// Canonical URL of the post on the social network.
    pub fn source_url(&self) -> String {
        format!("{SOURCE_ORIGIN}/{}/status/{}", self.handle, self.id)
    }
}

fn post_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Leftmost match wins, so `<host>/<handle>/status/<digits>` is preferred
        // over a bare digit run whenever the host starts first. The handle is
        // everything between the host and `/status/`, e.g. `i/web`.
        Regex::new(r"(?:[^/\s]+\.[A-Za-z]+/(\S+?)/status/)?(\d+)")
            .expect("post pattern is valid")
    })
}

/// Extracts the post identifier from a bare number or a `<host>/<handle>/status/<digits>` URL.
///
/// Without a host-prefixed status URL the first digit run is the identifier.
/// Returns `None` when the input contains no digit run at all.
pub fn extract_post_ref(input: &str) -> Option<PostRef> {
    let captures = post_pattern().captures(input)?;
    let id = captures.get(2)?.as_str().to_string();
    let handle = captures
        .get(1)
        .map(|m| m.as_str())
        .filter(|handle| !handle.is_empty())
        .unwrap_or(PLACEHOLDER_HANDLE)
        .to_string();
    Some(PostRef { id, handle })
}
