//! CLI command implementations

pub mod utils;

pub mod check;
pub mod completions;
pub mod init;
pub mod interactive;
pub mod list;
pub mod lot;
pub mod search;
pub mod show;
pub mod zone;
pub mod zones;
