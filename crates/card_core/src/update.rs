use card_logging::{card_debug, card_info};

use crate::output::image_path;
use crate::{
    extract_post_ref, AppState, CopyTarget, Effect, FetchFailure, Msg, NotificationKind,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::FormatSelected(format) => {
            state.settings_mut().format = format;
            Vec::new()
        }
        Msg::ThemeSelected(theme) => {
            state.settings_mut().theme = theme;
            Vec::new()
        }
        Msg::LanguageSelected(code) => {
            state.settings_mut().language = code;
            Vec::new()
        }
        Msg::TimezoneSelected(minutes) => {
            state.settings_mut().timezone_minutes = minutes;
            Vec::new()
        }
        Msg::ScaleEdited(raw) => {
            if let Ok(scale) = raw.trim().parse::<f64>() {
                state.settings_mut().set_scale(scale);
            }
            Vec::new()
        }
        Msg::Submitted => submit(&mut state),
        Msg::FieldFocused => {
            state.focus();
            Vec::new()
        }
        Msg::FieldBlurred { at } => {
            state.blur(at);
            Vec::new()
        }
        Msg::Tick { now } => {
            state.observe(now);
            let fire = state.should_submit_now(now);
            state.take_expired_settle(now);
            state.expire_notifications(now);
            if fire {
                card_debug!("settle delay elapsed, submitting");
                submit(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::FetchSucceeded {
            request_id,
            bytes,
            content_type,
        } => {
            card_info!("request {} resolved with {} bytes", request_id, bytes.len());
            state.complete_success(request_id, bytes, content_type);
            Vec::new()
        }
        Msg::FetchFailed {
            request_id,
            failure,
        } => {
            state.complete_failure(request_id);
            let kind = match failure {
                FetchFailure::NotFound => NotificationKind::NotFound,
                FetchFailure::Status { text } => NotificationKind::HttpError { status_text: text },
                FetchFailure::Transport { message } => {
                    card_debug!("request {} transport failure: {}", request_id, message);
                    NotificationKind::Transport
                }
            };
            state.notify(kind);
            Vec::new()
        }
        Msg::CopyClicked(target) => match state.view().preview {
            Some(preview) => {
                let text = match target {
                    CopyTarget::ImageUrl => preview.image_url,
                    CopyTarget::Snippet => preview.snippet,
                };
                vec![Effect::CopyToClipboard { target, text }]
            }
            None => Vec::new(),
        },
        Msg::CopyCompleted(_) => {
            state.notify(NotificationKind::Copied);
            Vec::new()
        }
        Msg::PreviewClicked => match state.preview() {
            Some(preview) => vec![Effect::OpenUrl {
                url: preview.post.source_url(),
            }],
            None => Vec::new(),
        },
        Msg::SaveImageClicked => match state.preview() {
            Some(preview) => vec![Effect::SaveImage {
                file_name: preview.file_name(),
                bytes: preview.bytes.clone(),
            }],
            None => Vec::new(),
        },
        Msg::ImageSaved { path } => {
            state.notify(NotificationKind::Saved { path });
            Vec::new()
        }
        Msg::ImageSaveFailed { reason } => {
            state.notify(NotificationKind::SaveFailed { reason });
            Vec::new()
        }
        Msg::NotificationDismissed(id) => {
            state.dismiss(id);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    if state.input().is_empty() {
        return Vec::new();
    }
    let Some(post) = extract_post_ref(state.input()) else {
        state.notify(NotificationKind::InvalidIdentifier);
        return Vec::new();
    };
    let post_id = post.id.clone();
    match state.begin_request(post) {
        Some((request_id, settings)) => {
            let path = image_path(&post_id, &settings);
            card_info!("request {} GET {}", request_id, path);
            vec![Effect::FetchImage { request_id, path }]
        }
        None => {
            card_debug!("signature unchanged for post {}, not refetching", post_id);
            Vec::new()
        }
    }
}
