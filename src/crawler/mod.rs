//! Crawler module: transport, politeness throttle, and orchestration
//!
//! The orchestrator ties the politeness gate, fetcher, extractor, and link
//! discoverer together into the per-task state machine and the sequential
//! batch loop.

mod fetcher;
mod orchestrator;
mod throttle;

pub use fetcher::{FetchError, FetchedPage, PageFetcher};
pub use orchestrator::{Crawler, TaskError};
pub use throttle::DomainThrottle;
