pub mod cli;
pub mod load_config;
pub mod mcp;
pub mod openai;
pub mod theneo;

pub use cli::{run, Cli, Commands};
