//! Command implementations for the CLI.

mod set;
mod status;
mod version;

pub use set::cmd_set;
pub use status::cmd_status;
pub use version::cmd_version;
