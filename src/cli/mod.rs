//! Scriptable shell that hosts a category field, for manual and scripted use.

mod context;
pub mod output;
mod shell;

pub use shell::run_cli;
