use std::time::{Duration, Instant};

use anyhow::Context as _;
use card_core::{update, AppState, Msg, PreviewView};
use card_engine::Catalog;
use card_logging::{card_info, card_warn};
use eframe::egui;

use super::config::{self, AppConfig};
use super::effects::EffectRunner;
use super::logging;
use super::ui;
use super::ui::constants::{WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH};

/// Clock tick driving the settle timer and notification expiry.
const TICK_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<()> {
    let config_path = config::config_path();
    let (app_config, config_error) = config::load_or_default(&config_path);
    logging::initialize(app_config.log_destination, app_config.level_filter());
    if let Some(err) = config_error {
        card_warn!("{}; using defaults", err);
    }
    card_info!(
        "starting with endpoint {} (config {:?})",
        app_config.endpoint_origin,
        config_path
    );

    let catalog = load_catalog(&app_config)?;
    let effects = EffectRunner::new(app_config.fetch_settings(), app_config.output_dir.clone())
        .context("failed to start the fetch engine")?;
    let state = AppState::with_config(app_config.core_config());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT]),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(CardApp::new(state, effects, catalog)))),
    )
    .map_err(|err| anyhow::anyhow!("ui event loop failed: {err}"))
}

fn load_catalog(app_config: &AppConfig) -> anyhow::Result<Catalog> {
    match Catalog::load(
        app_config.languages_path.as_deref(),
        app_config.timezones_path.as_deref(),
    ) {
        Ok(catalog) => Ok(catalog),
        Err(err) => {
            card_warn!("{}; falling back to the built-in tables", err);
            Catalog::embedded().context("built-in catalog is malformed")
        }
    }
}

struct CardApp {
    state: AppState,
    effects: EffectRunner,
    catalog: Catalog,
    buffers: ui::render::UiBuffers,
    preview_texture: Option<(u64, egui::TextureHandle)>,
    undecodable_revision: Option<u64>,
}

impl CardApp {
    fn new(state: AppState, effects: EffectRunner, catalog: Catalog) -> Self {
        Self {
            state,
            effects,
            catalog,
            buffers: ui::render::UiBuffers::default(),
            preview_texture: None,
            undecodable_revision: None,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.effects.run(effects);
    }

    /// Uploads the preview bytes as a texture once per revision.
    fn sync_texture(&mut self, ctx: &egui::Context, preview: Option<&PreviewView>) {
        let Some(preview) = preview else {
            self.preview_texture = None;
            return;
        };
        let current = self.preview_texture.as_ref().map(|(revision, _)| *revision);
        if current == Some(preview.revision) || self.undecodable_revision == Some(preview.revision)
        {
            return;
        }
        match decode_image(&preview.bytes) {
            Ok(image) => {
                let texture = ctx.load_texture("preview", image, egui::TextureOptions::LINEAR);
                self.preview_texture = Some((preview.revision, texture));
            }
            Err(err) => {
                card_warn!("preview revision {} is not a decodable image: {}", preview.revision, err);
                self.preview_texture = None;
                self.undecodable_revision = Some(preview.revision);
            }
        }
    }
}

impl eframe::App for CardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for msg in self.effects.poll() {
            self.dispatch(msg);
        }
        self.dispatch(Msg::Tick {
            now: Instant::now(),
        });

        let view = self.state.view();
        self.sync_texture(ctx, view.preview.as_ref());

        let texture = self.preview_texture.as_ref().map(|(_, texture)| texture);
        let catalog = &self.catalog;
        let buffers = &mut self.buffers;
        let mut msgs = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                msgs.extend(ui::render::render(ui, &view, catalog, buffers, texture));
            });
        });
        msgs.extend(ui::render::render_notifications(ctx, &view.notifications));

        for msg in msgs {
            self.dispatch(msg);
        }
        if self.state.consume_dirty() {
            ctx.request_repaint();
        }
        ctx.request_repaint_after(TICK_INTERVAL);
    }
}

fn decode_image(bytes: &[u8]) -> Result<egui::ColorImage, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let size = [decoded.width() as usize, decoded.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, decoded.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::decode_image;

    #[test]
    fn png_bytes_decode_to_texture_pixels() {
        let mut bytes = Vec::new();
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();

        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.size, [3, 2]);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_image(b"not an image").is_err());
    }
}
