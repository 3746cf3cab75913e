//! Name resolution: turns a declaration's identifiers and options into a
//! canonical setting name and a typed default value.

use crate::error::DeclarationError;
use crate::value::{TypeTag, Value};

/// Options for a single setting declaration.
///
/// Built fluently:
///
/// ```
/// use argconf::{ArgSpec, TypeTag};
///
/// let spec = ArgSpec::new(["--optional2_GROUP1", "-o2g1"])
///     .dest("optional_value")
///     .value_type(TypeTag::Int)
///     .default(0)
///     .help("Optional argument for GROUP1 with short option");
/// assert_eq!(spec.resolve().unwrap().0, "optional_value");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgSpec {
    pub identifiers: Vec<String>,
    pub dest: Option<String>,
    pub value_type: Option<TypeTag>,
    pub default: Option<Value>,
    pub aliases: Vec<String>,
    pub help: Option<String>,
    pub required: Option<bool>,
}

impl ArgSpec {
    pub fn new<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifiers: identifiers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// A positional setting named only by its destination.
    pub fn named(dest: impl Into<String>) -> Self {
        Self::new(Vec::<String>::new()).dest(dest)
    }

    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn value_type(mut self, value_type: TypeTag) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Extra command-line spelling, e.g. `--alt-name` or `-a`.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Override whether clap demands the setting. Positionals are required
    /// and flags optional unless set here.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Parse the identifier list. Zero identifiers yields `Ok(None)`.
    pub fn identifier(&self) -> Result<Option<Identifier>, DeclarationError> {
        Identifier::parse(&self.identifiers)
    }

    /// Resolve `(name, default)`, coercing the default through the declared
    /// value type.
    pub fn resolve(&self) -> Result<(String, Value), DeclarationError> {
        let name = self.resolve_name()?;
        let raw = self
            .default
            .as_ref()
            .ok_or_else(|| DeclarationError::MissingDefault(name.clone()))?;

        let default = match self.value_type {
            Some(tag) => tag.coerce(raw).ok_or_else(|| DeclarationError::Coercion {
                name: name.clone(),
                value: raw.to_string(),
                target: tag.to_string(),
            })?,
            None => raw.clone(),
        };
        Ok((name, default))
    }

    fn resolve_name(&self) -> Result<String, DeclarationError> {
        let identifier = self.identifier()?;
        if let Some(dest) = &self.dest {
            if dest.is_empty() {
                return Err(DeclarationError::NoNameSource);
            }
            return Ok(dest.clone());
        }
        match identifier {
            None => Err(DeclarationError::NoNameSource),
            Some(Identifier::Positional(name))
            | Some(Identifier::Long(name))
            | Some(Identifier::LongWithShortAlias(name, _)) => Ok(name),
            Some(Identifier::Short(_)) => {
                Err(DeclarationError::CannotResolveName(self.identifiers.clone()))
            }
        }
    }
}

/// Parsed identifier syntax of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// `name`
    Positional(String),
    /// `--name`
    Long(String),
    /// `--name` paired with `-n`; the short form is alias-only.
    LongWithShortAlias(String, String),
    /// `-n` on its own; only valid with an explicit destination.
    Short(String),
}

impl Identifier {
    pub fn parse(identifiers: &[String]) -> Result<Option<Self>, DeclarationError> {
        let invalid = || DeclarationError::InvalidIdentifier(identifiers.to_vec());
        match identifiers {
            [] => Ok(None),
            [only] => Ok(Some(match Spelling::parse(only).ok_or_else(invalid)? {
                Spelling::Bare(name) => Identifier::Positional(name),
                Spelling::Long(name) => Identifier::Long(name),
                Spelling::Short(alias) => Identifier::Short(alias),
            })),
            [first, second] => {
                let first = Spelling::parse(first).ok_or_else(invalid)?;
                let second = Spelling::parse(second).ok_or_else(invalid)?;
                match (first, second) {
                    (Spelling::Long(long), Spelling::Short(short))
                    | (Spelling::Short(short), Spelling::Long(long)) => {
                        Ok(Some(Identifier::LongWithShortAlias(long, short)))
                    }
                    _ => Err(invalid()),
                }
            }
            _ => Err(invalid()),
        }
    }

    pub fn is_positional(&self) -> bool {
        matches!(self, Identifier::Positional(_))
    }

    pub fn long(&self) -> Option<&str> {
        match self {
            Identifier::Long(long) | Identifier::LongWithShortAlias(long, _) => Some(long),
            _ => None,
        }
    }

    pub fn short(&self) -> Option<&str> {
        match self {
            Identifier::Short(short) | Identifier::LongWithShortAlias(_, short) => Some(short),
            _ => None,
        }
    }
}

/// One command-line spelling with its prefix stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Spelling {
    Bare(String),
    Long(String),
    Short(String),
}

impl Spelling {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let spelling = if let Some(long) = raw.strip_prefix("--") {
            Spelling::Long(long.to_string())
        } else if let Some(short) = raw.strip_prefix('-') {
            Spelling::Short(short.to_string())
        } else {
            Spelling::Bare(raw.to_string())
        };
        let body = match &spelling {
            Spelling::Bare(s) | Spelling::Long(s) | Spelling::Short(s) => s,
        };
        if body.is_empty() || body.starts_with('-') || body.contains('=') || body.contains(char::is_whitespace) {
            return None;
        }
        Some(spelling)
    }
}
