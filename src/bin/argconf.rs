//! Argconf demo binary
//!
//! Declares a small grouped configuration, parses the command line (or the
//! file named by `--config`) and prints the effective configuration as YAML.
//! Settings that differ from their defaults are listed on stderr.

use argconf::logging::{init_logging, LoggingConfig};
use argconf::presentation::{format_config_yaml, format_diff_table};
use argconf::{ArgSpec, ConfigParser, DeclarationError, TypeTag, Value};
use std::process;
use tracing::{error, info};

fn main() {
    let logging_config = LoggingConfig::load().unwrap_or_else(|e| {
        eprintln!("Ignoring invalid logging settings: {}", e);
        LoggingConfig::default()
    });

    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Argconf demo starting");

    let mut parser = match build_parser() {
        Ok(parser) => parser,
        Err(e) => {
            error!("Invalid declarations: {}", e);
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = parser.parse() {
        error!("Configuration failed: {}", e);
        eprintln!("{}", e);
        process::exit(1);
    }

    match format_config_yaml(&parser.get_config()) {
        Ok(yaml) => print!("{}", yaml),
        Err(e) => {
            error!("Rendering failed: {}", e);
            eprintln!("{}", e);
            process::exit(1);
        }
    }
    eprint!("{}", format_diff_table(&parser.diff_config()));
    info!("Argconf demo finished");
}

fn build_parser() -> Result<ConfigParser, DeclarationError> {
    let mut parser = ConfigParser::new().with_description("Grouped configuration demo");

    parser.add_argument(
        ArgSpec::new(["--optional_DEFAULT"])
            .default(Value::Null)
            .help("Optional argument for default group"),
    )?;
    parser.add_argument(
        ArgSpec::new(["positional_DEFAULT"])
            .default(Value::Null)
            .help("Positional argument for default group"),
    )?;

    let mut group = parser.add_argument_group("GROUP1", Some("This group is used for tuning"))?;
    group.add_argument(
        ArgSpec::new(["--optional1_GROUP1"])
            .default(0.0)
            .value_type(TypeTag::Float)
            .help("Optional argument for GROUP1"),
    )?;
    group.add_argument(
        ArgSpec::new(["--optional2_GROUP1", "-o2g1"])
            .dest("optional_value")
            .default(0)
            .value_type(TypeTag::Int)
            .help("Optional argument for GROUP1 with short option"),
    )?;

    let mut group = parser.add_argument_group("GROUP2", Some("This group is used for naming"))?;
    group.add_argument(
        ArgSpec::new(["positional_GROUP2"])
            .default(Value::Null)
            .value_type(TypeTag::Str)
            .help("Positional argument for GROUP2"),
    )?;

    Ok(parser)
}
