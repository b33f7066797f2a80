//! Test tooling for the Auth.js PocketBase adapter.
//!
//! Provides [`MemoryStore`], an in-memory [`RecordStore`] that evaluates
//! structured filters against JSON records, so the full adapter surface is
//! testable without spawning a PocketBase process.
//!
//! [`RecordStore`]: pocketbase_client::RecordStore

pub mod memory;

pub use memory::MemoryStore;
