// Counter-draft assistant: configuration, data loading, room sync and the
// interactive command loop around the counterdraft-core engine.

pub mod app;
pub mod command;
pub mod config;
pub mod loader;
pub mod render;
pub mod sync;
