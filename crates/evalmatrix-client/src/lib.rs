//! evalmatrix-client: Backends for the training API.
//!
//! Implements the `EvaluationBackend` and `AttendanceBackend` traits over the
//! REST API (`ApiClient`), plus an in-memory backend that can be persisted to
//! a JSON file for offline grading.

pub mod config;
pub mod http;
pub mod memory;
mod wire;

pub use config::{create_client, load_config, ClientConfig};
pub use http::ApiClient;
pub use memory::MemoryBackend;
