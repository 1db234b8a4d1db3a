//! Deterministic, pure logic for script rendering and config lookups.
//!
//! Nothing here spawns processes or touches the filesystem; the `io` layer
//! feeds these functions already-captured text.

pub mod key_path;
pub mod sanitize;
pub mod script;
pub mod types;
