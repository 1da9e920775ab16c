//! Cluster/attribute/command schema types and the name-normalisation
//! rule shared by the loader and every lookup path.

use std::collections::HashMap;

use crate::error::ZclError;
use crate::types::DataType;

/// Maps any XML element name to the lowercase, underscore-separated key
/// every lookup in this crate uses.
///
/// Two input shapes are recognised: space-separated human names
/// (`"Door Lock"`) and CamelCase identifiers (`"ThisIsACamelCaseName"`).
/// Ported from the attribute-name folding rule in the original loader;
/// see `original_source` for the reference behaviour this mirrors.
pub fn normalise_name(raw: &str) -> String {
    if raw.contains(' ') {
        raw.chars()
            .map(|c| if c == ' ' { '_' } else { c })
            .filter(|c| !c.is_ascii_punctuation() || *c == '_')
            .collect::<String>()
            .to_lowercase()
    } else {
        let mut out = String::with_capacity(raw.len() + 4);
        for (i, c) in raw.chars().enumerate() {
            if i > 0 && c.is_uppercase() {
                out.push('_');
            }
            out.push(c);
        }
        out.to_lowercase()
    }
}

/// A ZCL attribute definition: identity, type, and declared size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub cluster_code: u16,
    pub code: u16,
    pub name: String,
    pub r#type: DataType,
    pub type_code: u8,
    /// `None` for variable-length (length-prefixed) types.
    pub size: Option<u8>,
}

/// One positional parameter of a `CommandPrototype`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParam {
    pub name: String,
    pub r#type: DataType,
}

/// A command's shape: identity plus its ordered parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPrototype {
    pub cluster_code: u16,
    pub code: u8,
    pub name: String,
    pub params: Vec<CommandParam>,
}

impl CommandPrototype {
    /// Binds this prototype to a positional tuple of raw values,
    /// producing the `CommandArg` list an `Invocation` carries.
    ///
    /// Defined here rather than in `invocation` because arity checking
    /// is a property of the prototype, not of the caller's value shape;
    /// see `invocation::bind` for the public entry point callers use.
    pub(crate) fn check_arity(&self, given: usize) -> Result<(), ZclError> {
        if given != self.params.len() {
            return Err(ZclError::Arity {
                name: self.name.clone(),
                expected_count: self.params.len(),
                given_count: given,
                expected: self
                    .params
                    .iter()
                    .map(|p| (p.name.clone(), p.r#type))
                    .collect(),
            });
        }
        Ok(())
    }
}

/// A named integer constant set (ZCL `<enum>` definitions, e.g. status
/// codes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enum {
    pub name: String,
    pub items: HashMap<String, i64>,
}

/// A ZCL cluster: its commands and attributes, keyed by normalised
/// name. Clusters are additive across loaded files, matched by `code`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cluster {
    pub name: String,
    pub define: String,
    pub code: u16,
    pub commands: HashMap<String, CommandPrototype>,
    pub attributes: HashMap<String, Attribute>,
}

impl Cluster {
    pub fn command(&self, name: &str) -> Result<&CommandPrototype, ZclError> {
        let key = normalise_name(name);
        self.commands.get(&key).ok_or_else(|| ZclError::NotFound {
            kind: "command",
            name: name.to_string(),
        })
    }

    pub fn attribute(&self, name: &str) -> Result<&Attribute, ZclError> {
        let key = normalise_name(name);
        self.attributes
            .get(&key)
            .ok_or_else(|| ZclError::NotFound {
                kind: "attribute",
                name: name.to_string(),
            })
    }

    /// Adds a command, logging (not failing) on a same-key redefinition.
    /// The loader documents this as last-wins, per the schema contract.
    pub(crate) fn insert_command(&mut self, proto: CommandPrototype) {
        let key = normalise_name(&proto.name);
        if self.commands.contains_key(&key) {
            tracing::warn!(cluster = %self.name, command = %proto.name, "redefining command, last-wins");
        }
        self.commands.insert(key, proto);
    }

    pub(crate) fn insert_attribute(&mut self, attr: Attribute) {
        let key = normalise_name(&attr.name);
        if self.attributes.contains_key(&key) {
            tracing::warn!(cluster = %self.name, attribute = %attr.name, "redefining attribute, last-wins");
        }
        self.attributes.insert(key, attr);
    }
}

/// The full set of clusters and enums loaded from one or more XML
/// schema files. Attributes hold only their `cluster_code`, so no
/// cycle exists between `Schema` and the types it owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub clusters: HashMap<String, Cluster>,
    pub enums: HashMap<String, Enum>,
}

impl Schema {
    pub fn cluster(&self, name: &str) -> Result<&Cluster, ZclError> {
        let key = normalise_name(name);
        self.clusters.get(&key).ok_or_else(|| ZclError::NotFound {
            kind: "cluster",
            name: name.to_string(),
        })
    }

    pub fn cluster_by_code(&self, code: u16) -> Option<&Cluster> {
        self.clusters.values().find(|c| c.code == code)
    }

    pub fn enum_by_name(&self, name: &str) -> Result<&Enum, ZclError> {
        let key = normalise_name(name);
        self.enums.get(&key).ok_or_else(|| ZclError::NotFound {
            kind: "enum",
            name: name.to_string(),
        })
    }

    /// Registers a cluster, merging into an existing entry that shares
    /// the same `code` (the `<clusterExtension>` case) rather than
    /// overwriting it.
    pub(crate) fn register_cluster(&mut self, cluster: Cluster) {
        let key = normalise_name(&cluster.name);
        if let Some(existing_key) = self
            .clusters
            .iter()
            .find(|(_, c)| c.code == cluster.code)
            .map(|(k, _)| k.clone())
        {
            let existing = self.clusters.get_mut(&existing_key).unwrap();
            for (_, cmd) in cluster.commands {
                existing.insert_command(cmd);
            }
            for (_, attr) in cluster.attributes {
                existing.insert_attribute(attr);
            }
        } else {
            self.clusters.insert(key, cluster);
        }
    }

    pub(crate) fn register_enum(&mut self, e: Enum) {
        let key = normalise_name(&e.name);
        self.enums.insert(key, e);
    }
}
