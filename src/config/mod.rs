// Configuration management module
// TOML settings file, environment overrides and the interactive setup

pub mod interactive;
pub mod settings;


pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    CompletionConfig, Config, ConfigError, OllamaConfig, ScopeConfig, ServerConfig,
};
