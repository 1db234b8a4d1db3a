//! Read-only access to an appliance's configuration through its `php-cgi`
//! interpreter.
//!
//! The crate keeps a strict split:
//!
//! - **[`core`]**: Pure logic (script rendering, output sanitizing, key-path
//!   lookups). No I/O.
//! - **[`io`]**: Settings files and interpreter processes, behind the
//!   [`io::interpreter::Interpreter`] trait so tests can substitute doubles.
//!
//! [`resolver`] ties the two together into `get`-style lookups.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod resolver;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::key_path::KeyPath;
pub use crate::core::script::Script;
pub use crate::core::types::{ConfigTree, ExecutionResult};
pub use crate::error::ConfigError;
pub use crate::resolver::ConfigResolver;
