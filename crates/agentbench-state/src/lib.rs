//! agentbench-state: history storage contract
//!
//! The pipeline itself persists nothing. The surrounding application owns a
//! durable history store keyed by user and timestamp; this crate defines the
//! narrow interface the pipeline writes through once a dispatch and its
//! evaluation have both succeeded.
//!
//! ## Key Components
//!
//! - `HistoryStore`: async write/read contract implemented by the host app
//! - `HistoryRecord`: one completed pipeline invocation
//! - `MemoryHistoryStore`: in-memory fake for tests and local runs

mod error;
pub mod fakes;
pub mod storage_traits;

pub use error::HistoryError;
pub use fakes::MemoryHistoryStore;
pub use storage_traits::{HistoryRecord, HistoryResult, HistoryStore, RecordId};
