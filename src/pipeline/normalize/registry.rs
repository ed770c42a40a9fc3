use crate::config::NormalizeConfig;
use crate::types::CategoryKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Known-equivalent column names plus the column they collapse into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantGroup {
    /// Join order of the collapsed values.
    pub variants: Vec<String>,
    pub canonical: String,
}

impl VariantGroup {
    pub fn new(variants: &[&str], canonical: &str) -> Self {
        Self {
            variants: variants.iter().map(|v| v.to_string()).collect(),
            canonical: canonical.to_string(),
        }
    }
}

// Column labels observed on result pages over the years
const SEMIFINAL_VARIANTS: &[&str] = &[
    "Semi Final",
    "Semi-Final",
    "1/2-Final",
    "1/2 Final",
    "Semi-final",
];
const QUALIFICATION_1_VARIANTS: &[&str] = &[
    "Qualification 1",
    "Qualification-1",
    "Qual. 1",
    "Qualification A",
    "Qualification Group A",
];
const QUALIFICATION_2_VARIANTS: &[&str] = &[
    "Qualification 2",
    "Qualification-2",
    "Qual. 2",
    "Qualification B",
    "Qualification Group B",
];
const EIGHTHFINAL_VARIANTS: &[&str] = &[
    "1/8-Final",
    "1/8 Final",
    "1/8-final",
    "Eighth-Final",
    "Round of 16",
];

pub const SEMIFINAL: &str = "Semifinal";
pub const QUALIFICATION_1: &str = "Qualification1";
pub const QUALIFICATION_2: &str = "Qualification2";
pub const EIGHTHFINAL: &str = "Eighthfinal";

/// Variant groups per category kind
#[derive(Debug, Clone)]
pub struct VariantRegistry {
    groups: HashMap<CategoryKind, Vec<VariantGroup>>,
}

impl Default for VariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl VariantRegistry {
    /// Registry with the built-in groups.
    pub fn new() -> Self {
        let rounds = || {
            vec![
                VariantGroup::new(SEMIFINAL_VARIANTS, SEMIFINAL),
                VariantGroup::new(QUALIFICATION_1_VARIANTS, QUALIFICATION_1),
                VariantGroup::new(QUALIFICATION_2_VARIANTS, QUALIFICATION_2),
            ]
        };

        let mut groups = HashMap::new();
        groups.insert(CategoryKind::Lead, rounds());
        groups.insert(CategoryKind::Boulder, rounds());
        groups.insert(
            CategoryKind::Speed,
            vec![VariantGroup::new(EIGHTHFINAL_VARIANTS, EIGHTHFINAL)],
        );
        groups.insert(CategoryKind::Combined, Vec::new());

        Self { groups }
    }

    /// Built-in groups extended by the configured ones.
    pub fn from_config(config: &NormalizeConfig) -> Self {
        let mut registry = Self::new();
        for kind in CategoryKind::SCRAPED {
            for group in config.groups_for(kind) {
                registry.register(kind, group.clone());
            }
        }
        registry
    }

    /// Adds a group, or extends the group with the same canonical name.
    ///
    /// A variant equal to its canonical name is dropped: collapsing a column
    /// into itself would break idempotence.
    pub fn register(&mut self, kind: CategoryKind, group: VariantGroup) {
        let groups = self.groups.entry(kind).or_default();
        let index = match groups.iter().position(|g| g.canonical == group.canonical) {
            Some(index) => index,
            None => {
                groups.push(VariantGroup {
                    variants: Vec::new(),
                    canonical: group.canonical.clone(),
                });
                groups.len() - 1
            }
        };

        let target = &mut groups[index];
        for variant in group.variants {
            if variant == target.canonical {
                warn!(
                    "Ignoring variant '{}' of {} group: it is the canonical name",
                    variant, kind
                );
                continue;
            }
            if !target.variants.contains(&variant) {
                target.variants.push(variant);
            }
        }
    }

    pub fn groups_for(&self, kind: CategoryKind) -> &[VariantGroup] {
        self.groups.get(&kind).map(|g| g.as_slice()).unwrap_or(&[])
    }
}
