//! Argconf: grouped, persistable configuration on top of clap
//!
//! Declare settings and groups once, get a default configuration for free,
//! parse the command line (or a `--config` file) into overrides, merge partial
//! updates, and save/restore the result as YAML, JSON or TOML.

pub mod error;
pub mod group;
pub mod logging;
pub mod name;
pub mod parser;
pub mod persist;
pub mod presentation;
pub mod store;
pub mod value;

pub use error::{ConfigError, DeclarationError, ErrorKind, PersistenceError, UpdateError};
pub use group::{Group, SettingDeclaration, DEFAULT_GROUP};
pub use name::{ArgSpec, Identifier};
pub use parser::{ArgumentGroup, ConfigParser};
pub use persist::Format;
pub use store::{Configuration, ConfigurationStore, SettingChange, Settings};
pub use value::{TypeTag, Value};
