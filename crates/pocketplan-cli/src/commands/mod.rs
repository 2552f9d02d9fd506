//! CLI command implementations
//!
//! - `session` - The interactive budgeting session (prompts, chart, tips)
//! - `check` - Backend connection check (`--check`)

pub mod check;
pub mod session;

pub use check::*;
pub use session::*;
