//! Key/value persistence
//!
//! Backends:
//! - `MemoryStorage`: in-process map (native builds and tests)
//! - `LocalStorage`: browser LocalStorage (wasm32 only)
//!
//! Callers are expected to recover from every `StorageError`; nothing in the
//! game treats a storage failure as fatal.

pub mod storage;

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{MemoryStorage, Storage, StorageError};
