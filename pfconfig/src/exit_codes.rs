//! Stable exit codes for pfconfig CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed: bad arguments or settings, interpreter or decode errors.
pub const INVALID: i32 = 1;
/// `pfconfig get` key path matched nothing.
pub const NOT_FOUND: i32 = 2;
