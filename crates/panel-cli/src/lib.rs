//! Library side of the panel survey CLI: logging setup and the commands.

pub mod commands;
pub mod logging;
pub mod types;
