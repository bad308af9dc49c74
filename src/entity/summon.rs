//! Character templates: free-text descriptions looked up by name
//!
//! A missing template is never fatal. Summoning an unknown name answers
//! with the built-in default hero instead.

use crate::core::error::{ArenaError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Used whenever a requested template cannot be found
pub const DEFAULT_DESCRIPTION: &str = "An adventurer with eyes as clear and bright as sapphire, known to everyone simply as R. \
A master of both sword and sorcery, he rarely carries an ordinary blade; instead he condenses the moisture in the air into a blade of ice. \
His body has a deep affinity for magic, and his gift for ice lets him draw on the mana and vapor around him to mend his wounds and to weave armor of dense ice crystals. \
He learns quickly and has an iron will, letting him grasp the secrets of his surroundings and his enemies. \
When he must, he can flash-freeze the blood of an enemy he touches, stopping almost any living thing in an instant. \
He always carries the Moonlight Longsword, whose guard is a hollow crescent; more scepter than sword, it is an unrivaled conductor of mana. \
He remembers little of his past, but his heart is as pure as ice crystal.";

/// Keyed lookup of character descriptions
pub trait TemplateSource {
    /// Fails with `ArenaError::NotFound` when the key is absent
    fn template(&self, name: &str) -> Result<String>;
}

/// Templates from a flat TOML table: `name = "description"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TomlTemplates {
    entries: BTreeMap<String, String>,
}

impl TomlTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let entries: BTreeMap<String, String> = toml::from_str(contents)?;
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ArenaError::Config(format!("Failed to read templates file {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn insert(&mut self, name: impl Into<String>, description: impl Into<String>) {
        self.entries.insert(name.into(), description.into());
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TemplateSource for TomlTemplates {
    fn template(&self, name: &str) -> Result<String> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| ArenaError::NotFound(format!("template '{}'", name)))
    }
}

/// Look up a description, falling back to [`DEFAULT_DESCRIPTION`]
pub fn summon<T: TemplateSource + ?Sized>(source: &T, name: &str) -> String {
    match source.template(name) {
        Ok(description) => {
            tracing::info!(name, "Summoned character template");
            description
        }
        Err(e) => {
            tracing::warn!(name, error = %e, "No template found, summoning the default hero");
            DEFAULT_DESCRIPTION.to_string()
        }
    }
}
