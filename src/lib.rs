//! Density-of-states plotting: parsing, range selection, styling and the
//! debounced update loop behind the interactive viewer and the CLI.

pub mod app;
pub mod cli;
pub mod color;
pub mod data;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod state;
pub mod ui;
