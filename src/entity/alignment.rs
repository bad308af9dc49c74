//! Alignment registry
//!
//! A closed catalogue of moral/behavioral categories. The registry is an
//! explicit object built once at startup and only read during battles;
//! lookups are case-insensitive on the abbreviation.

use crate::core::error::{ArenaError, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A single alignment entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alignment {
    /// Canonical key, stored upper-case
    pub abbreviation: String,
    pub name: String,
    pub description: String,
}

impl Alignment {
    pub fn new(
        abbreviation: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            abbreviation: abbreviation.into().to_uppercase(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Abbreviation of the catch-all entry for non-sentient creatures
pub const UNALIGNED: &str = "U";

/// (abbreviation, name, description)
const STANDARD_ALIGNMENTS: [(&str, &str, &str); 10] = [
    (
        "LG",
        "Lawful Good",
        "Acts as a good person is expected or required to act, combining a commitment to oppose evil with the discipline to fight relentlessly.",
    ),
    (
        "NG",
        "Neutral Good",
        "Does the best that a good person can do, devoted to helping others without bias for or against order.",
    ),
    (
        "CG",
        "Chaotic Good",
        "Acts as conscience directs with little regard for what others expect, kind-hearted but free-spirited.",
    ),
    (
        "LN",
        "Lawful Neutral",
        "Acts as law, tradition, or a personal code directs, valuing order above good or evil.",
    ),
    (
        "N",
        "True Neutral",
        "Does what seems to be a good idea, without strong leanings toward good or evil, law or chaos.",
    ),
    (
        "CN",
        "Chaotic Neutral",
        "Follows whims, valuing personal freedom over the wellbeing of others or the rules of society.",
    ),
    (
        "LE",
        "Lawful Evil",
        "Methodically takes what it wants within the limits of a code, caring about tradition and order but not about freedom or life.",
    ),
    (
        "NE",
        "Neutral Evil",
        "Does whatever it can get away with, out for itself, pure and simple, without compassion or loyalty.",
    ),
    (
        "CE",
        "Chaotic Evil",
        "Does whatever greed, hatred, and lust for destruction drive it to do, hot-tempered and unpredictable.",
    ),
    (
        UNALIGNED,
        "Unaligned",
        "Creatures without the capacity for moral choice, such as beasts, constructs and mindless undead.",
    ),
];

/// Registry of known alignments
#[derive(Debug, Clone, Default)]
pub struct AlignmentRegistry {
    /// Registration order, for `all()`
    entries: Vec<Alignment>,
    /// Upper-cased abbreviation -> index into `entries`
    index: AHashMap<String, usize>,
}

impl AlignmentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with the nine classic alignments plus `U`
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for (abbreviation, name, description) in STANDARD_ALIGNMENTS {
            let registered = registry.register(Alignment::new(abbreviation, name, description));
            debug_assert!(
                registered.is_ok(),
                "duplicate abbreviation {} in the standard alignment table",
                abbreviation
            );
        }
        registry
    }

    /// Add an alignment. Duplicate abbreviations (any case) are rejected.
    pub fn register(&mut self, alignment: Alignment) -> Result<()> {
        let key = alignment.abbreviation.to_uppercase();
        if self.index.contains_key(&key) {
            return Err(ArenaError::Validation(format!(
                "Alignment '{}' already registered",
                key
            )));
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(alignment);
        Ok(())
    }

    pub fn lookup(&self, abbreviation: &str) -> Option<&Alignment> {
        self.index
            .get(&abbreviation.trim().to_uppercase())
            .map(|&i| &self.entries[i])
    }

    /// Look up an alignment, falling back to the catch-all entry
    ///
    /// Returns an owned copy so combatants never borrow from the registry.
    pub fn resolve_or_unaligned(&self, abbreviation: &str) -> Alignment {
        self.lookup(abbreviation)
            .or_else(|| self.lookup(UNALIGNED))
            .cloned()
            .unwrap_or_else(|| Alignment::new(UNALIGNED, "Unaligned", ""))
    }

    pub fn all(&self) -> &[Alignment] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One line per entry, for prompts that ask the model to pick one
    pub fn catalogue(&self) -> String {
        self.entries
            .iter()
            .map(|a| format!("- {}: {}", a.abbreviation, a.name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
