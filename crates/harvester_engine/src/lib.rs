//! Harvester engine: job table, background processing and HTTP fetching.
mod decode;
mod engine;
mod fetch;
mod types;

pub use decode::{decode_body, DecodedBody};
pub use engine::{EngineSettings, EvictionPolicy, JobEngine};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use types::{EngineError, FailureKind, FetchError, FetchMetadata, FetchOutput};
