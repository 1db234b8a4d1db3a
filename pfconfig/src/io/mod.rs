//! Side-effecting helpers: settings files and interpreter processes.

pub mod interpreter;
pub mod process;
pub mod settings;
