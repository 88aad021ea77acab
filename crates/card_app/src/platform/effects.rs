use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use card_core::{CopyTarget, Effect, FetchFailure, Msg};
use card_engine::{EngineEvent, EngineHandle, FailureKind, FetchError, FetchSettings};
use card_logging::{card_debug, card_info, card_warn};

/// Places text on the system clipboard. Failure is reported, never fatal.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String>;
}

/// Clipboard backed by `arboard`; a fresh handle per copy so a missing
/// clipboard service at startup is not sticky.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text.to_owned()))
            .map_err(|err| err.to_string())
    }
}

pub struct EffectRunner {
    engine: EngineHandle,
    clipboard: Box<dyn Clipboard>,
    /// Messages produced synchronously while running effects.
    local: VecDeque<Msg>,
}

impl EffectRunner {
    pub fn new(settings: FetchSettings, output_dir: PathBuf) -> std::io::Result<Self> {
        Ok(Self {
            engine: EngineHandle::new(settings, output_dir)?,
            clipboard: Box::new(SystemClipboard),
            local: VecDeque::new(),
        })
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchImage { request_id, path } => {
                    card_info!("FetchImage request_id={} path={}", request_id, path);
                    self.engine.fetch(request_id, path);
                }
                Effect::CopyToClipboard { target, text } => {
                    if let Some(msg) = copy(self.clipboard.as_mut(), target, &text) {
                        self.local.push_back(msg);
                    }
                }
                Effect::OpenUrl { url } => {
                    if let Err(err) = webbrowser::open(&url) {
                        card_warn!("could not open {}: {}", url, err);
                    }
                }
                Effect::SaveImage { file_name, bytes } => {
                    card_info!("SaveImage file_name={} bytes={}", file_name, bytes.len());
                    self.engine.save(file_name, bytes);
                }
            }
        }
    }

    /// Drains everything that completed since the last call, as messages.
    pub fn poll(&mut self) -> Vec<Msg> {
        let mut inbox: Vec<Msg> = self.local.drain(..).collect();
        while let Some(event) = self.engine.try_recv() {
            inbox.push(map_event(event));
        }
        inbox
    }
}

fn copy(clipboard: &mut dyn Clipboard, target: CopyTarget, text: &str) -> Option<Msg> {
    match clipboard.set_text(text) {
        Ok(()) => Some(Msg::CopyCompleted(target)),
        Err(err) => {
            card_warn!("clipboard unavailable, {:?} not copied: {}", target, err);
            None
        }
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::FetchCompleted { request_id, result } => match result {
            Ok(output) => Msg::FetchSucceeded {
                request_id,
                bytes: Arc::from(output.bytes),
                content_type: output.metadata.content_type,
            },
            Err(err) => Msg::FetchFailed {
                request_id,
                failure: map_failure(err),
            },
        },
        EngineEvent::SaveCompleted { file_name, result } => match result {
            Ok(path) => Msg::ImageSaved {
                path: path.display().to_string(),
            },
            Err(reason) => {
                card_debug!("save of {} failed: {}", file_name, reason);
                Msg::ImageSaveFailed { reason }
            }
        },
    }
}

fn map_failure(err: FetchError) -> FetchFailure {
    match err.kind {
        FailureKind::HttpStatus { code: 404, .. } => FetchFailure::NotFound,
        FailureKind::HttpStatus { code, reason } => FetchFailure::Status {
            text: if reason.is_empty() {
                code.to_string()
            } else {
                reason
            },
        },
        FailureKind::InvalidUrl
        | FailureKind::Timeout
        | FailureKind::TooLarge { .. }
        | FailureKind::UnsupportedContentType { .. }
        | FailureKind::Network => FetchFailure::Transport {
            message: err.message,
        },
    }
}
