use std::sync::Arc;

use crate::{CopyTarget, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// GET `path` (absolute path plus optional query) from the image endpoint.
    FetchImage { request_id: RequestId, path: String },
    CopyToClipboard { target: CopyTarget, text: String },
    OpenUrl { url: String },
    SaveImage { file_name: String, bytes: Arc<[u8]> },
}
