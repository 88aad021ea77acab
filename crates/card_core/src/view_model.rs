use std::sync::Arc;

use crate::{Settings, Severity};

#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub input: String,
    pub settings: Settings,
    /// Fields are disabled while a request is in flight.
    pub loading: bool,
    pub resolved: bool,
    pub preview: Option<PreviewView>,
    pub notifications: Vec<NotificationView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewView {
    /// Changes every time a new image arrives; renderers key textures on it.
    pub revision: u64,
    pub bytes: Arc<[u8]>,
    pub image_url: String,
    pub snippet: String,
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationView {
    pub id: u64,
    pub severity: Severity,
    pub text: String,
}
