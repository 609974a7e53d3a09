pub mod config;
pub mod console;
pub mod logging;
pub mod model;
pub mod nav;
pub mod poller;
pub mod registry;
pub mod remote;
pub mod runtime;
pub mod selection;
pub mod session;
pub mod tui;
mod tui_shell;
