//! Command registries.
//!
//! An [`InCommand`] is one registered command descriptor; a [`UserSpace`] is
//! a named table of base commands plus extension commands. Hosts supply
//! registries at startup (the CLI loads them from JSON, but any source
//! works — everything here derives serde).
//!
//! Lookup never scans: a `(lowercased name, arity)` index is built once at
//! construction, so resolving an overload is a single map probe.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// A registered command descriptor.
///
/// `parameter_count` is the exact arity this overload accepts; registering
/// the same name under several ids with different arities is how overloads
/// are expressed. `feedback_id` points into the dispatcher's feedback table
/// when the command must be confirmed before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InCommand {
    pub command: String,
    pub parameter_count: usize,
    pub description: String,
    #[serde(default)]
    pub feedback_id: Option<usize>,
}

impl InCommand {
    pub fn new(command: impl Into<String>, parameter_count: usize, description: impl Into<String>) -> Self {
        InCommand {
            command: command.into(),
            parameter_count,
            description: description.into(),
            feedback_id: None,
        }
    }

    /// Same descriptor, gated behind the given feedback entry.
    pub fn with_feedback(mut self, feedback_id: usize) -> Self {
        self.feedback_id = Some(feedback_id);
        self
    }
}

impl fmt::Display for InCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.command, self.description)
    }
}

/// A named, independently registered table of commands and extensions.
#[derive(Debug, Clone)]
pub struct UserSpace {
    name: String,
    commands: BTreeMap<usize, InCommand>,
    extensions: BTreeMap<usize, InCommand>,
    command_index: HashMap<(String, usize), usize>,
    extension_index: HashMap<(String, usize), usize>,
    command_names: HashSet<String>,
    extension_names: HashSet<String>,
}

impl UserSpace {
    /// Builds a namespace and its lookup index.
    ///
    /// Panics when two descriptors collide on `(name, arity)` within one
    /// table — that is a conflicting registration, a host contract
    /// violation rather than bad end-user input.
    pub fn new(
        name: impl Into<String>,
        commands: BTreeMap<usize, InCommand>,
        extensions: BTreeMap<usize, InCommand>,
    ) -> Self {
        let name = name.into();
        let (command_index, command_names) = build_index(&name, "command", &commands);
        let (extension_index, extension_names) = build_index(&name, "extension", &extensions);
        UserSpace {
            name,
            commands,
            extensions,
            command_index,
            extension_index,
            command_names,
            extension_names,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commands(&self) -> &BTreeMap<usize, InCommand> {
        &self.commands
    }

    pub fn extensions(&self) -> &BTreeMap<usize, InCommand> {
        &self.extensions
    }

    /// The id registered for this name and exact arity, if any.
    pub fn find_command(&self, name: &str, arity: usize) -> Option<usize> {
        self.command_index
            .get(&(name.to_lowercase(), arity))
            .copied()
    }

    /// Whether any overload of `name` is registered at all.
    pub fn knows_command(&self, name: &str) -> bool {
        self.command_names.contains(&name.to_lowercase())
    }

    pub fn find_extension(&self, name: &str, arity: usize) -> Option<usize> {
        self.extension_index
            .get(&(name.to_lowercase(), arity))
            .copied()
    }

    pub fn knows_extension(&self, name: &str) -> bool {
        self.extension_names.contains(&name.to_lowercase())
    }

    pub fn command_descriptor(&self, id: usize) -> Option<&InCommand> {
        self.commands.get(&id)
    }

    pub fn extension_descriptor(&self, id: usize) -> Option<&InCommand> {
        self.extensions.get(&id)
    }
}

fn build_index(
    space: &str,
    table: &str,
    descriptors: &BTreeMap<usize, InCommand>,
) -> (HashMap<(String, usize), usize>, HashSet<String>) {
    let mut index = HashMap::new();
    let mut names = HashSet::new();

    for (&id, descriptor) in descriptors {
        let key = (descriptor.command.to_lowercase(), descriptor.parameter_count);
        names.insert(key.0.clone());
        if let Some(previous) = index.insert(key, id) {
            panic!(
                "conflicting {table} registration in namespace `{space}`: \
                 `{}` with arity {} registered under both id {previous} and id {id}",
                descriptor.command, descriptor.parameter_count
            );
        }
    }

    (index, names)
}
