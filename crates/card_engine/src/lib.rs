//! Card engine: image fetching, saving and static catalogs.
mod catalog;
mod engine;
mod fetch;
mod persist;
mod types;

pub use catalog::{parse_languages, parse_timezones, Catalog, CatalogError, Language, TimezoneEntry};
pub use engine::EngineHandle;
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{EngineEvent, FailureKind, FetchError, FetchMetadata, ImageOutput, RequestId};
