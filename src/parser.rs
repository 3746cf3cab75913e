//! ConfigParser: declares settings, drives clap and feeds parsed values into
//! the configuration store.

use crate::error::{ConfigError, DeclarationError};
use crate::group::{Group, Registry, SettingDeclaration, CONFIG_SETTING, DEFAULT_GROUP};
use crate::name::{ArgSpec, Identifier, Spelling};
use crate::persist::{self, Format};
use crate::store::{Configuration, ConfigurationStore, SettingChange};
use crate::value::{TypeTag, Value};
use clap::builder::ValueParser;
use clap::parser::MatchesError;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CONFIG_HELP: &str =
    "Path to config file. All command line options will be overridden with config file content.";

/// Hierarchical configuration on top of a clap command line.
///
/// ```
/// use argconf::{ArgSpec, ConfigParser, TypeTag, Value};
///
/// let mut parser = ConfigParser::new();
/// parser.add_argument(ArgSpec::new(["--verbose"]).value_type(TypeTag::Bool).default(false))?;
/// let mut group = parser.add_argument_group("TRAIN", Some("Training options"))?;
/// group.add_argument(ArgSpec::new(["--lr"]).value_type(TypeTag::Float).default(0.1))?;
///
/// parser.try_parse_from(["app", "--lr", "0.5"])?;
/// let config = parser.get_config();
/// assert_eq!(config.get("TRAIN", "lr"), Some(&Value::Float(0.5)));
/// assert_eq!(config.get("DEFAULT", "verbose"), Some(&Value::Bool(false)));
/// # Ok::<(), argconf::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigParser {
    name: String,
    description: Option<String>,
    registry: Registry,
    store: ConfigurationStore,
}

impl Default for ConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParser {
    pub fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            description: None,
            registry: Registry::new(),
            store: ConfigurationStore::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Program name shown in usage when argv[0] is unavailable.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declare a setting in the `DEFAULT` group. Returns the resolved name.
    pub fn add_argument(&mut self, spec: ArgSpec) -> Result<String, DeclarationError> {
        self.declare(DEFAULT_GROUP, spec)
    }

    /// Register a new group and return a handle for declaring into it.
    pub fn add_argument_group(
        &mut self,
        id: &str,
        description: Option<&str>,
    ) -> Result<ArgumentGroup<'_>, DeclarationError> {
        self.registry
            .create_group(id, description.map(str::to_string))?;
        debug!(group = id, "Registered argument group");
        Ok(ArgumentGroup {
            parser: self,
            id: id.to_string(),
        })
    }

    /// Handle for an already registered group.
    pub fn group(&mut self, id: &str) -> Option<ArgumentGroup<'_>> {
        self.registry.group(id)?;
        Some(ArgumentGroup {
            parser: self,
            id: id.to_string(),
        })
    }

    pub fn groups(&self) -> &[Group] {
        self.registry.groups()
    }

    fn declare(&mut self, group: &str, spec: ArgSpec) -> Result<String, DeclarationError> {
        let declaration = Registry::resolve(group, spec)?;
        self.registry.check(&declaration)?;
        self.store
            .add_default(group, &declaration.name, declaration.default.clone())?;

        let name = declaration.name.clone();
        debug!(
            group,
            setting = %name,
            default = %declaration.default,
            "Declared setting"
        );
        self.registry.insert(declaration)?;
        Ok(name)
    }

    /// Parse the process arguments. Usage errors and `--help` exit the
    /// process the way clap does.
    pub fn parse(&mut self) -> Result<(), ConfigError> {
        match self.try_parse_from(std::env::args_os()) {
            Err(ConfigError::Cli(err)) => err.exit(),
            other => other,
        }
    }

    /// Parse `tokens` (program name first) into the live configuration.
    ///
    /// `--config PATH` replaces the whole command line: the file is loaded
    /// and every other token is ignored.
    pub fn try_parse_from<I, T>(&mut self, tokens: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let tokens: Vec<OsString> = tokens.into_iter().map(Into::into).collect();

        if let Some(path) = config_override(&tokens) {
            info!(path = %path.display(), "Loading configuration named by --config");
            return self.load_config(&path);
        }

        let tokens = rewrite_short_aliases(&self.registry, tokens);
        let matches = self.build_command().try_get_matches_from(tokens)?;

        let mut overrides = Vec::new();
        for declaration in self.registry.declarations() {
            overrides.push((declaration.name.clone(), parsed_value(&matches, declaration)?));
        }
        self.store.update(overrides)?;
        debug!("Parsed command line into configuration");
        Ok(())
    }

    pub fn update_config<I, K>(&mut self, overrides: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.store.update(overrides)?;
        Ok(())
    }

    pub fn get_config(&self) -> Configuration {
        self.store.get()
    }

    pub fn get_default_config(&self) -> Configuration {
        self.store.get_default()
    }

    /// Drop every override and accept declarations again.
    pub fn reset_config(&mut self) {
        self.store.reset();
    }

    pub fn is_parsed(&self) -> bool {
        self.store.is_parsed()
    }

    pub fn diff_config(&self) -> Vec<SettingChange> {
        self.store.diff()
    }

    pub fn save_config(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        persist::save(self.store.current(), path.as_ref())?;
        Ok(())
    }

    pub fn save_config_as(&self, path: impl AsRef<Path>, format: Format) -> Result<(), ConfigError> {
        persist::save_as(self.store.current(), path.as_ref(), format)?;
        Ok(())
    }

    /// Replace the live configuration with the file's values.
    ///
    /// Group membership comes from the declarations, not from the file. On
    /// failure the live configuration is unchanged.
    pub fn load_config(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let loaded = persist::load(path.as_ref())?;
        self.store.replace(loaded.flatten())?;
        Ok(())
    }

    pub fn render_help(&self) -> String {
        self.build_command().render_help().to_string()
    }

    fn build_command(&self) -> Command {
        let mut command = Command::new(self.name.clone()).arg(
            Arg::new(CONFIG_SETTING)
                .long(CONFIG_SETTING)
                .value_name("CONFIG")
                .action(ArgAction::Set)
                .help(CONFIG_HELP),
        );
        if let Some(description) = &self.description {
            command = command.about(description.clone());
        }

        // Positional indices follow declaration order, not group order.
        for declaration in self.registry.declarations_in_order() {
            let mut arg = clap_arg(declaration);
            if declaration.group != DEFAULT_GROUP {
                arg = arg.help_heading(declaration.group.clone());
            }
            command = command.arg(arg);
        }

        let group_notes: Vec<String> = self
            .registry
            .groups()
            .iter()
            .filter(|group| !group.declarations.is_empty())
            .filter_map(|group| {
                let description = group.description.as_ref()?;
                Some(format!("  {}: {}", group.id, description))
            })
            .collect();
        if !group_notes.is_empty() {
            command = command.after_help(format!("Groups:\n{}", group_notes.join("\n")));
        }
        command
    }
}

/// Declaration handle bound to one group of a [`ConfigParser`].
pub struct ArgumentGroup<'a> {
    parser: &'a mut ConfigParser,
    id: String,
}

impl ArgumentGroup<'_> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn add_argument(&mut self, spec: ArgSpec) -> Result<String, DeclarationError> {
        self.parser.declare(&self.id, spec)
    }
}

/// Path following `--config`, if present before a `--` terminator.
fn config_override(tokens: &[OsString]) -> Option<PathBuf> {
    let flag = format!("--{}", CONFIG_SETTING);
    let inline = format!("{}=", flag);
    let mut rest = tokens.iter().skip(1);
    while let Some(token) = rest.next() {
        let text = token.to_string_lossy();
        if text == "--" {
            return None;
        }
        if text == flag {
            // A trailing `--config` falls through so clap reports the missing value.
            return rest.next().map(PathBuf::from);
        }
        if let Some(path) = text.strip_prefix(&inline) {
            return Some(PathBuf::from(path));
        }
    }
    None
}

/// clap only knows single-character short flags, so `-o2g1` style spellings
/// are registered as long aliases and rewritten before parsing.
fn rewrite_short_aliases(registry: &Registry, tokens: Vec<OsString>) -> Vec<OsString> {
    let rewrites = registry.long_rewrites();
    if rewrites.is_empty() {
        return tokens;
    }

    let mut out = Vec::with_capacity(tokens.len());
    let mut passthrough = false;
    for (i, token) in tokens.into_iter().enumerate() {
        if i == 0 || passthrough {
            out.push(token);
            continue;
        }
        let text = token.to_string_lossy().into_owned();
        if text == "--" {
            passthrough = true;
            out.push(token);
            continue;
        }
        let (flag, value) = match text.split_once('=') {
            Some((flag, value)) => (flag, Some(value)),
            None => (text.as_str(), None),
        };
        match (rewrites.get(flag), value) {
            (Some(long), Some(value)) => out.push(OsString::from(format!("{}={}", long, value))),
            (Some(long), None) => out.push(OsString::from(long)),
            (None, _) => out.push(token),
        }
    }
    out
}

fn clap_arg(declaration: &SettingDeclaration) -> Arg {
    let spec = &declaration.spec;
    let mut arg = Arg::new(declaration.name.clone())
        .action(ArgAction::Set)
        .value_parser(value_parser_for(declaration.value_type));

    match spec.identifier().ok().flatten() {
        None | Some(Identifier::Positional(_)) => {
            arg = arg.required(spec.required.unwrap_or(true));
        }
        Some(identifier) => {
            let mut has_long = false;
            let mut has_short = false;
            if let Some(long) = identifier.long() {
                arg = arg.long(long.to_string());
                has_long = true;
            }
            if let Some(short) = identifier.short() {
                arg = add_short(arg, short, &mut has_long, &mut has_short);
            }
            for alias in &spec.aliases {
                match Spelling::parse(alias) {
                    Some(Spelling::Long(long)) => {
                        arg = arg.visible_alias(long);
                    }
                    Some(Spelling::Short(short)) => {
                        arg = add_short(arg, &short, &mut has_long, &mut has_short);
                    }
                    _ => {}
                }
            }
            arg = arg.required(spec.required.unwrap_or(false));
        }
    }

    if let Some(help) = &spec.help {
        arg = arg.help(help.clone());
    }
    arg
}

fn add_short(arg: Arg, short: &str, has_long: &mut bool, has_short: &mut bool) -> Arg {
    let mut chars = short.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if *has_short => arg.visible_short_alias(c),
        (Some(c), None) => {
            *has_short = true;
            arg.short(c)
        }
        _ if *has_long => arg.visible_alias(short.to_string()),
        _ => {
            *has_long = true;
            arg.long(short.to_string())
        }
    }
}

fn value_parser_for(value_type: Option<TypeTag>) -> ValueParser {
    match value_type {
        Some(TypeTag::Int) => value_parser!(i64).into(),
        Some(TypeTag::Float) => value_parser!(f64).into(),
        Some(TypeTag::Bool) => value_parser!(bool).into(),
        Some(TypeTag::Str) | None => value_parser!(String).into(),
    }
}

/// Typed value clap parsed for `declaration`, or null when absent.
fn parsed_value(matches: &ArgMatches, declaration: &SettingDeclaration) -> Result<Value, MatchesError> {
    let id = declaration.name.as_str();
    let value = match declaration.value_type {
        Some(TypeTag::Int) => matches.try_get_one::<i64>(id)?.copied().map(Value::Int),
        Some(TypeTag::Float) => matches.try_get_one::<f64>(id)?.copied().map(Value::Float),
        Some(TypeTag::Bool) => matches.try_get_one::<bool>(id)?.copied().map(Value::Bool),
        Some(TypeTag::Str) | None => matches.try_get_one::<String>(id)?.cloned().map(Value::Str),
    };
    Ok(value.unwrap_or(Value::Null))
}
