use crate::error::DescriptorError;
use crate::plugin::{Plugin, PluginAtom};
use crate::trace::{debug, info, warn};
use hashbrown::{HashMap, HashSet};

/// Registered external atoms, keyed by predicate name.
///
/// Registration is all-or-nothing per plugin: a plugin with any malformed or
/// conflicting atom leaves the registry untouched.
#[derive(Debug, Default)]
pub struct Registry {
    atoms: HashMap<String, Entry>,
    plugins: Vec<String>,
}

#[derive(Debug)]
struct Entry {
    plugin: String,
    atom: PluginAtom,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every atom of `plugin`. Returns the number of atoms added.
    pub fn register(&mut self, plugin: &dyn Plugin) -> Result<usize, DescriptorError> {
        let name = plugin.name();
        let atoms = plugin.create_atoms();
        if let Err(err) = self.check(name, &atoms) {
            warn!(plugin = name, error = %err, "rejecting plugin");
            return Err(err);
        }
        let count = atoms.len();
        for atom in atoms {
            debug!(plugin = name, predicate = atom.predicate(), "registered external atom");
            self.atoms.insert(
                atom.predicate().to_string(),
                Entry {
                    plugin: name.to_string(),
                    atom,
                },
            );
        }
        self.plugins.push(name.to_string());
        info!(plugin = name, atoms = count, "loaded plugin");
        Ok(count)
    }

    fn check(&self, plugin: &str, atoms: &[PluginAtom]) -> Result<(), DescriptorError> {
        if plugin.is_empty() {
            return Err(DescriptorError::EmptyPluginName);
        }
        let mut local: HashSet<&str> = HashSet::with_capacity(atoms.len());
        for atom in atoms {
            atom.descriptor().validate(plugin)?;
            let predicate = atom.predicate();
            if let Some(existing) = self.atoms.get(predicate) {
                return Err(DescriptorError::DuplicatePredicate {
                    predicate: predicate.to_string(),
                    plugin: plugin.to_string(),
                    existing: existing.plugin.clone(),
                });
            }
            if !local.insert(predicate) {
                return Err(DescriptorError::DuplicatePredicate {
                    predicate: predicate.to_string(),
                    plugin: plugin.to_string(),
                    existing: plugin.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, predicate: &str) -> Option<&PluginAtom> {
        self.atoms.get(predicate).map(|entry| &entry.atom)
    }

    /// Name of the plugin that registered `predicate`.
    pub fn plugin_of(&self, predicate: &str) -> Option<&str> {
        self.atoms.get(predicate).map(|entry| entry.plugin.as_str())
    }

    pub fn contains(&self, predicate: &str) -> bool {
        self.atoms.contains_key(predicate)
    }

    /// Names of loaded plugins in load order.
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    pub fn atoms(&self) -> impl Iterator<Item = &PluginAtom> {
        self.atoms.values().map(|entry| &entry.atom)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/registry.rs"]
mod tests;
