//! Platform abstraction layer
//!
//! Frame timing shared by the native demo and the web bindings. Storage
//! lives in `crate::persistence`.

pub mod time;

pub use time::FrameClock;
