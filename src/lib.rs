pub mod cache;
pub mod cli;
pub mod download;
pub mod pipeline;
pub mod reference;
pub mod settings;
pub mod ui;
pub mod writer;

#[cfg(test)]
mod test_helpers;

pub use cli::{Cli, Commands};
pub use ui::{ConsoleUi, Phase, SilentUi, Ui, UiApp};
