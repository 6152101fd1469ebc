pub mod procurement_type;
pub mod program;
pub mod instance;
pub mod progress;
pub mod ledger;

pub use procurement_type::*;
pub use program::*;
pub use instance::*;
pub use progress::*;
pub use ledger::*;
