mod discover;
pub mod env;
mod error;
mod loader;
mod parse;
mod substitute;
pub mod tree;


pub use discover::{discover, expand_include};
pub use env::{EnvMap, load_env_file, parse_env};
pub use error::ConfigError;
pub use loader::{LoaderOptions, load_config, load_config_with_env};
pub use parse::{parse_file, parse_str};
pub use substitute::{substitute_text, substitute_tree};
pub use tree::{ConfigEntry, ConfigTree, ConfigValue, split_args};
