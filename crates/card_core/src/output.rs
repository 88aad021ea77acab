use crate::settings::{query_string, Settings};

/// Path (and query) of the image endpoint, relative to the service origin.
pub fn image_path(post_id: &str, settings: &Settings) -> String {
    let path = format!("/{post_id}.{}", settings.format.extension());
    match query_string(settings) {
        Some(query) => format!("{path}?{query}"),
        None => path,
    }
}

/// Fully-qualified, shareable URL of the rendered image.
pub fn image_url(origin: &str, post_id: &str, settings: &Settings) -> String {
    format!(
        "{}{}",
        origin.trim_end_matches('/'),
        image_path(post_id, settings)
    )
}

/// Scrapbox link markup that shows the image and links it to the source post.
pub fn scrapbox_snippet(image_url: &str, source_url: &str) -> String {
    format!("[{image_url} {source_url}]")
}
