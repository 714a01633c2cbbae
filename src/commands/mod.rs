//! CLI command handlers.

mod catalog;
mod config;
mod fetch;
mod find;
mod parse;
mod sample;

pub use config::run_config_show_command;
pub use fetch::run_fetch_command;
pub use find::run_find_command;
pub use parse::run_parse_command;
pub use sample::run_sample_command;
