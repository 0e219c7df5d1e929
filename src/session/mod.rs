pub mod commands;
pub mod controller;
pub mod state;

pub use commands::{Command, CommandKey};
pub use controller::{Console, GroupSummary, SessionController, SessionView};
pub use state::{ConfigState, SessionStatus};
