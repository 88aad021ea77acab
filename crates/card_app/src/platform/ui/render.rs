use std::collections::BTreeSet;
use std::time::Instant;

use card_core::{AppViewModel, CopyTarget, ImageFormat, Msg, NotificationView, Severity, Theme};
use card_engine::Catalog;
use eframe::egui::{self, Color32, RichText};

use super::constants::*;

/// Text the user is typing that must survive frames while its field is focused.
#[derive(Debug, Default)]
pub struct UiBuffers {
    scale_text: String,
    scale_focused: bool,
    pickers: PickerFocus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerTransition {
    Opened,
    Closed,
}

/// Which picker popups were open on the previous frame.
#[derive(Debug, Default)]
struct PickerFocus {
    open: BTreeSet<&'static str>,
}

impl PickerFocus {
    fn observe(&mut self, key: &'static str, is_open: bool) -> Option<PickerTransition> {
        let was_open = self.open.contains(key);
        match (was_open, is_open) {
            (false, true) => {
                self.open.insert(key);
                Some(PickerTransition::Opened)
            }
            (true, false) => {
                self.open.remove(key);
                Some(PickerTransition::Closed)
            }
            _ => None,
        }
    }
}

/// Draws the form and returns the messages produced by this frame's interaction.
pub fn render(
    ui: &mut egui::Ui,
    view: &AppViewModel,
    catalog: &Catalog,
    buffers: &mut UiBuffers,
    preview_texture: Option<&egui::TextureHandle>,
) -> Vec<Msg> {
    let mut msgs = Vec::new();

    ui.heading(WINDOW_TITLE);
    ui.separator();

    ui.add_enabled_ui(!view.loading, |ui| {
        render_form(ui, view, catalog, buffers, &mut msgs);
    });

    ui.add_space(8.0);
    render_preview(ui, view, preview_texture, &mut msgs);

    if let Some(preview) = &view.preview {
        ui.add_space(8.0);
        output_row(ui, "Image Url", &preview.image_url, CopyTarget::ImageUrl, &mut msgs);
        output_row(
            ui,
            "Scrapbox Snippet",
            &preview.snippet,
            CopyTarget::Snippet,
            &mut msgs,
        );
        if ui.button("Save image").clicked() {
            msgs.push(Msg::SaveImageClicked);
        }
    }

    msgs
}

fn render_form(
    ui: &mut egui::Ui,
    view: &AppViewModel,
    catalog: &Catalog,
    buffers: &mut UiBuffers,
    msgs: &mut Vec<Msg>,
) {
    ui.label(RichText::new("Post Url").strong());
    let mut input = view.input.clone();
    let response = ui.add(
        egui::TextEdit::singleline(&mut input)
            .id(egui::Id::new(ID_INPUT_URL))
            .hint_text(INPUT_HINT)
            .desired_width(f32::INFINITY),
    );
    if response.changed() {
        msgs.push(Msg::InputChanged(input));
    }
    track_focus(ui, &response, msgs);

    ui.add_space(6.0);
    ui.columns(3, |columns| {
        let settings = &view.settings;

        columns[0].label(RichText::new("Format").strong());
        let mut format = settings.format;
        let response = egui::ComboBox::from_id_salt(ID_COMBO_FORMAT)
            .selected_text(format.label())
            .show_ui(&mut columns[0], |ui| {
                for option in ImageFormat::ALL {
                    ui.selectable_value(&mut format, option, option.label());
                }
            })
            .response;
        let changed = format != settings.format;
        let transition = buffers.pickers.observe(ID_COMBO_FORMAT, popup_open(&response));
        selection_msgs(transition, changed, Msg::FormatSelected(format), msgs);

        columns[1].label(RichText::new("Theme").strong());
        let mut theme = settings.theme;
        let response = egui::ComboBox::from_id_salt(ID_COMBO_THEME)
            .selected_text(theme.label())
            .show_ui(&mut columns[1], |ui| {
                for option in Theme::ALL {
                    ui.selectable_value(&mut theme, option, option.label());
                }
            })
            .response;
        let changed = theme != settings.theme;
        let transition = buffers.pickers.observe(ID_COMBO_THEME, popup_open(&response));
        selection_msgs(transition, changed, Msg::ThemeSelected(theme), msgs);

        columns[2].label(RichText::new("Scale").strong());
        if !buffers.scale_focused {
            buffers.scale_text = settings.scale().to_string();
        }
        let response = columns[2].add(
            egui::TextEdit::singleline(&mut buffers.scale_text)
                .id(egui::Id::new(ID_INPUT_SCALE))
                .desired_width(f32::INFINITY),
        );
        buffers.scale_focused = response.has_focus();
        if response.changed() {
            msgs.push(Msg::ScaleEdited(buffers.scale_text.clone()));
        }
        track_focus(&columns[2], &response, msgs);
    });

    ui.add_space(6.0);
    ui.columns(2, |columns| {
        let settings = &view.settings;

        columns[0].label(RichText::new("Lang").strong());
        let mut language = settings.language.clone();
        let selected = catalog
            .language(&language)
            .map(|entry| entry.label())
            .unwrap_or_else(|| language.clone());
        let response = egui::ComboBox::from_id_salt(ID_COMBO_LANGUAGE)
            .selected_text(selected)
            .height(320.0)
            .show_ui(&mut columns[0], |ui| {
                for entry in &catalog.languages {
                    ui.selectable_value(&mut language, entry.code.clone(), entry.label());
                }
            })
            .response;
        let changed = language != settings.language;
        let transition = buffers.pickers.observe(ID_COMBO_LANGUAGE, popup_open(&response));
        selection_msgs(transition, changed, Msg::LanguageSelected(language), msgs);

        columns[1].label(RichText::new("Timezone").strong());
        let mut minutes = settings.timezone_minutes;
        let selected = catalog
            .timezone(minutes)
            .map(|entry| entry.text.clone())
            .unwrap_or_else(|| format!("UTC {}", card_core::format_offset_hours(minutes)));
        let response = egui::ComboBox::from_id_salt(ID_COMBO_TIMEZONE)
            .selected_text(selected)
            .width(columns[1].available_width())
            .height(320.0)
            .show_ui(&mut columns[1], |ui| {
                for entry in &catalog.timezones {
                    ui.selectable_value(&mut minutes, entry.offset_minutes(), &entry.text);
                }
            })
            .response;
        let changed = minutes != settings.timezone_minutes;
        let transition = buffers.pickers.observe(ID_COMBO_TIMEZONE, popup_open(&response));
        selection_msgs(transition, changed, Msg::TimezoneSelected(minutes), msgs);
    });

    ui.add_space(6.0);
    if ui.button("Preview").clicked() {
        msgs.push(Msg::Submitted);
    }
}

fn render_preview(
    ui: &mut egui::Ui,
    view: &AppViewModel,
    preview_texture: Option<&egui::TextureHandle>,
    msgs: &mut Vec<Msg>,
) {
    match (&view.preview, preview_texture) {
        (Some(_), Some(texture)) => {
            let image = egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture))
                .max_width(ui.available_width())
                .sense(egui::Sense::click());
            let response = ui.add(image).on_hover_text("Open the original post");
            if response.clicked() {
                msgs.push(Msg::PreviewClicked);
            }
        }
        (Some(_), None) => {
            ui.label("The image could not be displayed.");
        }
        (None, _) => {
            let (rect, _) = ui.allocate_exact_size(
                egui::vec2(ui.available_width(), PREVIEW_PLACEHOLDER_HEIGHT),
                egui::Sense::hover(),
            );
            ui.painter()
                .rect_filled(rect, 4.0, ui.visuals().extreme_bg_color);
        }
    }
    if view.loading {
        ui.horizontal(|ui| {
            ui.add(egui::Spinner::new());
            ui.label("Loading…");
        });
    }
}

fn output_row(
    ui: &mut egui::Ui,
    title: &str,
    value: &str,
    target: CopyTarget,
    msgs: &mut Vec<Msg>,
) {
    ui.label(title);
    ui.horizontal(|ui| {
        let mut text = value;
        ui.add(egui::TextEdit::singleline(&mut text).desired_width(ui.available_width() - 64.0));
        if ui.button("Copy").clicked() {
            msgs.push(Msg::CopyClicked(target));
        }
    });
}

/// Toasts in the top-left corner, newest last.
pub fn render_notifications(ctx: &egui::Context, notifications: &[NotificationView]) -> Vec<Msg> {
    let mut msgs = Vec::new();
    if notifications.is_empty() {
        return msgs;
    }
    egui::Area::new(egui::Id::new(ID_NOTIFICATIONS))
        .anchor(egui::Align2::LEFT_TOP, [12.0, 12.0])
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            for notification in notifications {
                let color = match notification.severity {
                    Severity::Info => Color32::from_rgb(0x31, 0x82, 0xce),
                    Severity::Error => Color32::from_rgb(0xe5, 0x3e, 0x3e),
                };
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(NOTIFICATION_WIDTH);
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&notification.text).color(color));
                        if ui.small_button("×").clicked() {
                            msgs.push(Msg::NotificationDismissed(notification.id));
                        }
                    });
                });
            }
        });
    msgs
}

fn track_focus(ui: &egui::Ui, response: &egui::Response, msgs: &mut Vec<Msg>) {
    if response.gained_focus() {
        msgs.push(Msg::FieldFocused);
    }
    if response.lost_focus() {
        msgs.push(Msg::FieldBlurred { at: Instant::now() });
        if ui.input(|input| input.key_pressed(egui::Key::Enter)) {
            msgs.push(Msg::Submitted);
        }
    }
}

fn popup_open(response: &egui::Response) -> bool {
    egui::ComboBox::is_open(&response.ctx, response.id)
}

/// Opening a picker counts as focusing it and closing it as leaving it,
/// whether or not a different value was picked.
fn selection_msgs(
    transition: Option<PickerTransition>,
    changed: bool,
    msg: Msg,
    msgs: &mut Vec<Msg>,
) {
    if transition == Some(PickerTransition::Opened) {
        msgs.push(Msg::FieldFocused);
    }
    if changed {
        msgs.push(msg);
    }
    if transition == Some(PickerTransition::Closed) {
        msgs.push(Msg::FieldBlurred { at: Instant::now() });
    }
}
