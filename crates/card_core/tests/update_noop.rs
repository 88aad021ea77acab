use card_core::{update, AppState, Msg};

#[test]
fn update_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn outputs_require_a_loaded_image() {
    let state = AppState::new();
    let (state, copy) = update(state, Msg::CopyClicked(card_core::CopyTarget::Snippet));
    let (state, open) = update(state, Msg::PreviewClicked);
    let (_state, save) = update(state, Msg::SaveImageClicked);

    assert!(copy.is_empty());
    assert!(open.is_empty());
    assert!(save.is_empty());
}
