// Core data models for the procurement ledger

pub mod template;
pub mod program;
pub mod progress;

pub use template::*;
pub use program::*;
pub use progress::*;
