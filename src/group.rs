//! Groups and the declaration registry.
//!
//! The registry owns every declaration in declaration order and the index of
//! command-line spellings already taken, so collisions surface at declaration
//! time rather than as clap panics at parse time.

use crate::error::DeclarationError;
use crate::name::{ArgSpec, Identifier, Spelling};
use crate::value::{TypeTag, Value};
use std::collections::BTreeMap;

/// Reserved group receiving top-level declarations.
pub const DEFAULT_GROUP: &str = "DEFAULT";

/// Reserved setting name carrying the config file path.
pub const CONFIG_SETTING: &str = "config";

/// Setting names clap or the config override already use as argument ids.
const RESERVED_NAMES: [&str; 2] = [CONFIG_SETTING, "help"];

/// Spellings clap or the config override already own.
const RESERVED_FLAGS: [&str; 3] = ["--help", "-h", "--config"];

/// A single declared setting.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingDeclaration {
    pub name: String,
    pub default: Value,
    pub value_type: Option<TypeTag>,
    pub group: String,
    pub spec: ArgSpec,
}

impl SettingDeclaration {
    /// Command-line spellings (with prefixes) this declaration occupies.
    pub fn flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if let Ok(Some(identifier)) = self.spec.identifier() {
            if let Some(long) = identifier.long() {
                flags.push(format!("--{}", long));
            }
            if let Some(short) = identifier.short() {
                flags.push(format!("-{}", short));
            }
        }
        flags.extend(self.spec.aliases.iter().cloned());
        flags
    }

    pub fn is_positional(&self) -> bool {
        matches!(self.spec.identifier(), Ok(Some(Identifier::Positional(_))) | Ok(None))
    }
}

/// A named collection of declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    pub description: Option<String>,
    pub declarations: Vec<SettingDeclaration>,
}

impl Group {
    fn new(id: String, description: Option<String>) -> Self {
        Self {
            id,
            description,
            declarations: Vec::new(),
        }
    }
}

/// All groups and declarations of one parser.
#[derive(Debug, Clone)]
pub struct Registry {
    groups: Vec<Group>,
    order: Vec<String>,
    owners: BTreeMap<String, String>,
    flags: BTreeMap<String, String>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            groups: vec![Group::new(DEFAULT_GROUP.to_string(), None)],
            order: Vec::new(),
            owners: BTreeMap::new(),
            flags: BTreeMap::new(),
        }
    }

    pub fn create_group(
        &mut self,
        id: &str,
        description: Option<String>,
    ) -> Result<(), DeclarationError> {
        if self.group(id).is_some() {
            return Err(DeclarationError::DuplicateGroup(id.to_string()));
        }
        self.groups.push(Group::new(id.to_string(), description));
        Ok(())
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Declarations across all groups, group by group.
    pub fn declarations(&self) -> impl Iterator<Item = &SettingDeclaration> {
        self.groups.iter().flat_map(|g| g.declarations.iter())
    }

    /// Declarations in the order they were first declared, across groups.
    pub fn declarations_in_order(&self) -> impl Iterator<Item = &SettingDeclaration> {
        self.order.iter().filter_map(|name| self.declaration(name))
    }

    pub fn declaration(&self, name: &str) -> Option<&SettingDeclaration> {
        let group = self.owners.get(name)?;
        self.group(group)?.declarations.iter().find(|d| d.name == name)
    }

    /// Build a declaration from `spec` without registering it.
    pub fn resolve(group: &str, spec: ArgSpec) -> Result<SettingDeclaration, DeclarationError> {
        let (name, default) = spec.resolve()?;
        Ok(SettingDeclaration {
            name,
            default,
            value_type: spec.value_type,
            group: group.to_string(),
            spec,
        })
    }

    /// Check `declaration` against existing names and flags.
    ///
    /// A redeclaration of the same name in the same group is accepted; its
    /// previous spellings are released before the new ones are checked.
    pub fn check(&self, declaration: &SettingDeclaration) -> Result<(), DeclarationError> {
        let name = &declaration.name;
        if RESERVED_NAMES.contains(&name.as_str()) {
            return Err(DeclarationError::ReservedName(name.clone()));
        }
        if self.group(&declaration.group).is_none() {
            return Err(DeclarationError::UnknownGroup(declaration.group.clone()));
        }
        if let Some(owner_group) = self.owners.get(name) {
            if owner_group != &declaration.group {
                return Err(DeclarationError::DuplicateSetting {
                    name: name.clone(),
                    group: owner_group.clone(),
                });
            }
        }

        if declaration.is_positional() && !declaration.spec.aliases.is_empty() {
            return Err(DeclarationError::InvalidIdentifier(declaration.spec.aliases.clone()));
        }

        let mut seen = Vec::new();
        for flag in declaration.flags() {
            let valid = matches!(Spelling::parse(&flag), Some(Spelling::Long(_)) | Some(Spelling::Short(_)));
            if !valid {
                return Err(DeclarationError::InvalidIdentifier(vec![flag]));
            }
            for claim in claims(&flag) {
                if RESERVED_FLAGS.contains(&claim.as_str()) {
                    return Err(DeclarationError::ReservedName(flag));
                }
                if seen.contains(&claim) {
                    return Err(DeclarationError::DuplicateFlag {
                        flag,
                        owner: name.clone(),
                    });
                }
                if let Some(owner) = self.flags.get(&claim) {
                    if owner != name {
                        return Err(DeclarationError::DuplicateFlag {
                            flag,
                            owner: owner.clone(),
                        });
                    }
                }
                seen.push(claim);
            }
        }
        Ok(())
    }

    /// Register a declaration. Call [`Registry::check`] first; only the
    /// group's existence is verified again here.
    pub fn insert(&mut self, declaration: SettingDeclaration) -> Result<(), DeclarationError> {
        let name = declaration.name.clone();
        let group_id = declaration.group.clone();
        let claimed: Vec<String> = declaration.flags().iter().flat_map(|flag| claims(flag)).collect();

        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| DeclarationError::UnknownGroup(group_id.clone()))?;
        match group.declarations.iter_mut().find(|d| d.name == name) {
            Some(existing) => *existing = declaration,
            None => group.declarations.push(declaration),
        }

        self.flags.retain(|_, owner| owner != &name);
        for claim in claimed {
            self.flags.insert(claim, name.clone());
        }
        if self.owners.insert(name.clone(), group_id).is_none() {
            self.order.push(name);
        }
        Ok(())
    }

    /// Multi-character single-dash spellings mapped to the long spelling
    /// clap knows them by, e.g. `-o2g1` → `--o2g1`.
    pub fn long_rewrites(&self) -> BTreeMap<String, String> {
        self.flags
            .keys()
            .filter_map(|flag| match Spelling::parse(flag) {
                Some(Spelling::Short(short)) if short.chars().count() > 1 => {
                    Some((flag.clone(), format!("--{}", short)))
                }
                _ => None,
            })
            .collect()
    }
}

/// Spellings a flag occupies once clap sees it: a multi-character short
/// flag also takes the long spelling it is rewritten to.
fn claims(flag: &str) -> Vec<String> {
    let mut claimed = vec![flag.to_string()];
    if let Some(Spelling::Short(short)) = Spelling::parse(flag) {
        if short.chars().count() > 1 {
            claimed.push(format!("--{}", short));
        }
    }
    claimed
}
