use std::sync::{Arc, Once};

use card_core::{
    update, AppState, CoreConfig, Effect, FetchFailure, ImageFormat, Msg, NotificationKind,
    RequestId,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(card_logging::initialize_for_tests);
}

fn state_with_origin() -> AppState {
    AppState::with_config(CoreConfig {
        origin: "https://card.example".to_string(),
        ..CoreConfig::default()
    })
}

fn submit_input(state: AppState, input: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(input.to_string()));
    update(state, Msg::Submitted)
}

fn fetched_request(effects: &[Effect]) -> RequestId {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::FetchImage { request_id, .. } => Some(*request_id),
            _ => None,
        })
        .expect("fetch effect")
}

fn image(bytes: &[u8]) -> Arc<[u8]> {
    Arc::from(bytes)
}

fn notification_kinds(state: &AppState) -> Vec<NotificationKind> {
    state
        .notifications()
        .iter()
        .map(|notification| notification.kind.clone())
        .collect()
}

#[test]
fn bare_identifier_fetches_default_path() {
    init_logging();
    let (state, effects) = submit_input(state_with_origin(), "20");

    assert_eq!(
        effects,
        vec![Effect::FetchImage {
            request_id: 1,
            path: "/20.jpg".to_string(),
        }]
    );
    assert!(state.is_loading());
    assert!(!state.is_resolved());
    assert_eq!(state.current_post().unwrap().handle, "twitter");
}

#[test]
fn changed_settings_end_up_in_query() {
    init_logging();
    let (state, _) = update(state_with_origin(), Msg::ScaleEdited("3".to_string()));
    let (state, _) = update(state, Msg::FormatSelected(ImageFormat::Png));
    let (_state, effects) = submit_input(state, "https://twitter.com/jack/status/20");

    assert_eq!(
        effects,
        vec![Effect::FetchImage {
            request_id: 1,
            path: "/20.png?scale=3".to_string(),
        }]
    );
}

#[test]
fn empty_input_is_ignored() {
    init_logging();
    let (state, effects) = submit_input(state_with_origin(), "");

    assert!(effects.is_empty());
    assert!(state.notifications().is_empty());
    assert!(!state.is_loading());
}

#[test]
fn input_without_digits_is_rejected_without_request() {
    init_logging();
    let (state, effects) = submit_input(state_with_origin(), "https://twitter.com/jack");

    assert!(effects.is_empty());
    assert!(!state.is_loading());
    assert_eq!(
        notification_kinds(&state),
        vec![NotificationKind::InvalidIdentifier]
    );
    assert_eq!(
        state.view().notifications[0].text,
        "The format of the URL is invalid."
    );
}

#[test]
fn identical_signature_issues_one_request() {
    init_logging();
    let (state, first) = submit_input(state_with_origin(), "20");
    let (state, second) = update(state, Msg::Submitted);
    // A different spelling of the same post keeps the signature.
    let (_state, third) = submit_input(state, "https://twitter.com/jack/status/20");

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert!(third.is_empty());
}

#[test]
fn changing_a_setting_allows_a_new_request() {
    init_logging();
    let (state, first) = submit_input(state_with_origin(), "20");
    let (state, _) = update(state, Msg::ThemeSelected(card_core::Theme::Dark));
    let (_state, second) = update(state, Msg::Submitted);

    assert_eq!(fetched_request(&first), 1);
    assert_eq!(
        second,
        vec![Effect::FetchImage {
            request_id: 2,
            path: "/20.jpg?theme=dark".to_string(),
        }]
    );
}

#[test]
fn not_found_notifies_and_keeps_unresolved() {
    init_logging();
    let (state, effects) = submit_input(state_with_origin(), "20");
    let request_id = fetched_request(&effects);

    let (state, effects) = update(
        state,
        Msg::FetchFailed {
            request_id,
            failure: FetchFailure::NotFound,
        },
    );

    assert!(effects.is_empty());
    assert!(!state.is_loading());
    assert!(!state.is_resolved());
    assert!(state.preview().is_none());
    assert_eq!(notification_kinds(&state), vec![NotificationKind::NotFound]);
    assert_eq!(state.view().notifications[0].text, "No posts found.");
}

#[test]
fn other_status_embeds_status_text() {
    init_logging();
    let (state, effects) = submit_input(state_with_origin(), "20");
    let request_id = fetched_request(&effects);

    let (state, _) = update(
        state,
        Msg::FetchFailed {
            request_id,
            failure: FetchFailure::Status {
                text: "500 Internal Server Error".to_string(),
            },
        },
    );

    assert!(!state.is_loading());
    assert_eq!(
        state.view().notifications[0].text,
        "An error has occurred: 500 Internal Server Error"
    );
}

#[test]
fn transport_failure_is_generic() {
    init_logging();
    let (state, effects) = submit_input(state_with_origin(), "20");
    let request_id = fetched_request(&effects);

    let (state, _) = update(
        state,
        Msg::FetchFailed {
            request_id,
            failure: FetchFailure::Transport {
                message: "connection refused".to_string(),
            },
        },
    );

    assert!(!state.is_loading());
    assert_eq!(notification_kinds(&state), vec![NotificationKind::Transport]);
    assert_eq!(state.view().notifications[0].text, "An error has occurred.");
}

#[test]
fn failure_leaves_previous_image_in_place() {
    init_logging();
    let (state, effects) = submit_input(state_with_origin(), "20");
    let (state, _) = update(
        state,
        Msg::FetchSucceeded {
            request_id: fetched_request(&effects),
            bytes: image(b"first"),
            content_type: Some("image/jpeg".to_string()),
        },
    );
    let before = state.view().preview;

    let (state, effects) = submit_input(state, "21");
    let (state, _) = update(
        state,
        Msg::FetchFailed {
            request_id: fetched_request(&effects),
            failure: FetchFailure::NotFound,
        },
    );

    assert!(state.is_resolved());
    assert_eq!(state.view().preview, before);
}

#[test]
fn success_exposes_image_url_and_snippet() {
    init_logging();
    let (state, effects) = submit_input(state_with_origin(), "https://twitter.com/jack/status/20");
    let (state, _) = update(
        state,
        Msg::FetchSucceeded {
            request_id: fetched_request(&effects),
            bytes: image(b"jpeg"),
            content_type: None,
        },
    );

    let view = state.view();
    let preview = view.preview.expect("preview");
    assert!(view.resolved);
    assert!(!view.loading);
    assert_eq!(preview.revision, 1);
    assert_eq!(&*preview.bytes, b"jpeg");
    assert_eq!(preview.image_url, "https://card.example/20.jpg");
    assert_eq!(preview.source_url, "https://twitter.com/jack/status/20");
    assert_eq!(
        preview.snippet,
        "[https://card.example/20.jpg https://twitter.com/jack/status/20]"
    );
}

#[test]
fn outputs_follow_the_loaded_request_not_pending_edits() {
    init_logging();
    let (state, effects) = submit_input(state_with_origin(), "20");
    let (state, _) = update(
        state,
        Msg::FetchSucceeded {
            request_id: fetched_request(&effects),
            bytes: image(b"a"),
            content_type: None,
        },
    );
    let (state, _) = update(state, Msg::ScaleEdited("3".to_string()));
    assert_eq!(
        state.view().preview.unwrap().image_url,
        "https://card.example/20.jpg"
    );

    let (state, effects) = update(state, Msg::Submitted);
    let (state, _) = update(
        state,
        Msg::FetchSucceeded {
            request_id: fetched_request(&effects),
            bytes: image(b"b"),
            content_type: None,
        },
    );
    let preview = state.view().preview.unwrap();
    assert_eq!(preview.revision, 2);
    assert_eq!(preview.image_url, "https://card.example/20.jpg?scale=3");
    assert_eq!(
        preview.snippet,
        "[https://card.example/20.jpg?scale=3 https://twitter.com/twitter/status/20]"
    );
}

#[test]
fn last_resolved_response_wins_when_requests_overlap() {
    init_logging();
    let (state, first) = submit_input(state_with_origin(), "20");
    let (state, second) = submit_input(state, "21");
    let first_id = fetched_request(&first);
    let second_id = fetched_request(&second);

    // The newer request resolves first, the stale one afterwards.
    let (state, _) = update(
        state,
        Msg::FetchSucceeded {
            request_id: second_id,
            bytes: image(b"twenty-one"),
            content_type: None,
        },
    );
    assert!(!state.is_loading());
    let (state, _) = update(
        state,
        Msg::FetchSucceeded {
            request_id: first_id,
            bytes: image(b"twenty"),
            content_type: None,
        },
    );

    let preview = state.preview().expect("preview");
    assert_eq!(preview.post.id, "20");
    assert_eq!(&*preview.bytes, b"twenty");
    assert_eq!(preview.revision, 2);
}

#[test]
fn unknown_request_only_clears_loading() {
    init_logging();
    let (state, _) = submit_input(state_with_origin(), "20");
    let (state, _) = update(
        state,
        Msg::FetchSucceeded {
            request_id: 99,
            bytes: image(b"x"),
            content_type: None,
        },
    );

    assert!(!state.is_loading());
    assert!(!state.is_resolved());
    assert!(state.preview().is_none());
}

#[test]
fn copy_emits_clipboard_effect_and_confirms() {
    init_logging();
    let (state, effects) = submit_input(state_with_origin(), "20");
    let (state, _) = update(
        state,
        Msg::FetchSucceeded {
            request_id: fetched_request(&effects),
            bytes: image(b"a"),
            content_type: None,
        },
    );

    let (state, effects) = update(state, Msg::CopyClicked(card_core::CopyTarget::ImageUrl));
    assert_eq!(
        effects,
        vec![Effect::CopyToClipboard {
            target: card_core::CopyTarget::ImageUrl,
            text: "https://card.example/20.jpg".to_string(),
        }]
    );
    assert!(state.notifications().is_empty());

    let (state, _) = update(state, Msg::CopyCompleted(card_core::CopyTarget::ImageUrl));
    assert_eq!(notification_kinds(&state), vec![NotificationKind::Copied]);
}

#[test]
fn preview_click_and_save_use_loaded_post() {
    init_logging();
    let (state, _) = update(state_with_origin(), Msg::FormatSelected(ImageFormat::Png));
    let (state, effects) = submit_input(state, "https://twitter.com/jack/status/20");
    let (state, _) = update(
        state,
        Msg::FetchSucceeded {
            request_id: fetched_request(&effects),
            bytes: image(b"png"),
            content_type: Some("image/png".to_string()),
        },
    );

    let (state, open) = update(state, Msg::PreviewClicked);
    assert_eq!(
        open,
        vec![Effect::OpenUrl {
            url: "https://twitter.com/jack/status/20".to_string(),
        }]
    );

    let (state, save) = update(state, Msg::SaveImageClicked);
    assert_eq!(
        save,
        vec![Effect::SaveImage {
            file_name: "20.png".to_string(),
            bytes: image(b"png"),
        }]
    );

    let (state, _) = update(
        state,
        Msg::ImageSaved {
            path: "output/20.png".to_string(),
        },
    );
    assert_eq!(state.view().notifications[0].text, "Saved to output/20.png");
}
