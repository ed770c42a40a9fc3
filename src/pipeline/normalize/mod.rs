//! Column-variant consolidation.
//!
//! Result tables label the same round differently across seasons. Each
//! [`VariantGroup`] names the known labels of one round; normalizing a
//! dataset joins the non-empty values of those columns into the group's
//! canonical column and drops the variants.

pub mod registry;

use crate::types::{CategoryDataset, CategoryKind, ResultRecord};
use indexmap::IndexSet;
use registry::{VariantGroup, VariantRegistry};
use tracing::{debug, info};

const JOIN_SEPARATOR: &str = ",";

pub struct SchemaNormalizer {
    registry: VariantRegistry,
}

impl Default for SchemaNormalizer {
    fn default() -> Self {
        Self::new(VariantRegistry::new())
    }
}

impl SchemaNormalizer {
    pub fn new(registry: VariantRegistry) -> Self {
        Self { registry }
    }

    /// Collapses every configured group of the dataset's kind.
    ///
    /// Returns the canonical names of the groups that changed anything.
    pub fn normalize(&self, dataset: &mut CategoryDataset) -> Vec<String> {
        self.normalize_records(dataset.kind, &mut dataset.records)
    }

    pub fn normalize_records(
        &self,
        kind: CategoryKind,
        records: &mut [ResultRecord],
    ) -> Vec<String> {
        let mut columns = present_columns(records);
        let mut applied = Vec::new();

        for group in self.registry.groups_for(kind) {
            if collapse_group(records, &mut columns, group) {
                applied.push(group.canonical.clone());
            }
        }

        if !applied.is_empty() {
            info!(
                "Normalized {} {} records into columns {:?}",
                records.len(),
                kind,
                applied
            );
        }
        applied
    }
}

fn present_columns(records: &[ResultRecord]) -> IndexSet<String> {
    records
        .iter()
        .flat_map(|r| r.keys().cloned())
        .collect()
}

/// Joins the present variant columns of `group` into its canonical column.
///
/// Returns false when none of the variants is present.
fn collapse_group(
    records: &mut [ResultRecord],
    columns: &mut IndexSet<String>,
    group: &VariantGroup,
) -> bool {
    let present: Vec<&str> = group
        .variants
        .iter()
        .map(String::as_str)
        .filter(|variant| {
            let found = columns.contains(*variant);
            if !found {
                debug!("Variant column '{}' absent, skipping", variant);
            }
            found
        })
        .collect();

    if present.is_empty() {
        return false;
    }

    let canonical_present = columns.contains(&group.canonical);

    for record in records.iter_mut() {
        let mut parts: Vec<String> = Vec::with_capacity(present.len() + 1);
        if canonical_present {
            if let Some(value) = record.get(&group.canonical) {
                if !value.trim().is_empty() {
                    parts.push(value.clone());
                }
            }
        }
        for variant in &present {
            if let Some(value) = record.shift_remove(*variant) {
                if !value.trim().is_empty() {
                    parts.push(value);
                }
            }
        }
        // insert keeps the position of an existing canonical column
        record.insert(group.canonical.clone(), parts.join(JOIN_SEPARATOR));
    }

    for variant in &present {
        columns.shift_remove(*variant);
    }
    columns.insert(group.canonical.clone());
    true
}

#[cfg(test)]
mod tests {
    use super::registry::{EIGHTHFINAL, QUALIFICATION_1, SEMIFINAL};
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> ResultRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn lead_dataset(records: Vec<ResultRecord>) -> CategoryDataset {
        CategoryDataset::with_records(CategoryKind::Lead, records)
    }

    #[test]
    fn joins_non_empty_variants_in_group_order() {
        let mut dataset = lead_dataset(vec![record(&[
            ("Rank", "1"),
            ("Semi Final", "5"),
            ("Semi-Final", ""),
            ("1/2-Final", "3"),
        ])]);

        let applied = SchemaNormalizer::default().normalize(&mut dataset);

        assert_eq!(applied, vec![SEMIFINAL.to_string()]);
        let row = &dataset.records[0];
        assert_eq!(row.get(SEMIFINAL).map(String::as_str), Some("5,3"));
        assert!(!row.contains_key("Semi Final"));
        assert!(!row.contains_key("Semi-Final"));
        assert!(!row.contains_key("1/2-Final"));
    }

    #[test]
    fn single_value_has_no_stray_separator() {
        let mut dataset = lead_dataset(vec![
            record(&[("Semi-Final", ""), ("1/2-Final", "41+")]),
            record(&[("Semi-Final", "  "), ("1/2-Final", "")]),
        ]);

        SchemaNormalizer::default().normalize(&mut dataset);

        assert_eq!(dataset.records[0][SEMIFINAL], "41+");
        assert_eq!(dataset.records[1][SEMIFINAL], "");
    }

    #[test]
    fn rows_missing_a_variant_still_get_canonical_column() {
        let mut dataset = lead_dataset(vec![
            record(&[("Rank", "1"), ("Qualification 1", "TOP")]),
            record(&[("Rank", "2")]),
        ]);

        SchemaNormalizer::default().normalize(&mut dataset);

        assert_eq!(dataset.records[0][QUALIFICATION_1], "TOP");
        assert_eq!(dataset.records[1][QUALIFICATION_1], "");
        assert_eq!(dataset.columns(), vec!["Rank", QUALIFICATION_1]);
    }

    #[test]
    fn normalizing_twice_is_a_no_op() {
        let mut dataset = lead_dataset(vec![
            record(&[("Rank", "1"), ("Semi Final", "5"), ("Qual. 1", "TOP"), ("Final", "40")]),
            record(&[("Rank", "2"), ("1/2-Final", "3"), ("Qualification-2", "38+")]),
        ]);
        let normalizer = SchemaNormalizer::default();

        normalizer.normalize(&mut dataset);
        let once = dataset.clone();
        let applied = normalizer.normalize(&mut dataset);

        assert!(applied.is_empty());
        assert_eq!(dataset, once);
    }

    #[test]
    fn existing_canonical_value_leads_the_join() {
        let mut dataset = lead_dataset(vec![
            record(&[(SEMIFINAL, "7"), ("Semi-final", "")]),
            record(&[(SEMIFINAL, ""), ("Semi-final", "2")]),
        ]);

        SchemaNormalizer::default().normalize(&mut dataset);

        assert_eq!(dataset.records[0][SEMIFINAL], "7");
        assert_eq!(dataset.records[1][SEMIFINAL], "2");
        assert_eq!(dataset.columns(), vec![SEMIFINAL]);
    }

    #[test]
    fn speed_and_combined_use_their_own_groups() {
        let normalizer = SchemaNormalizer::default();

        let mut speed = CategoryDataset::with_records(
            CategoryKind::Speed,
            vec![record(&[("1/8-Final", "6.12"), ("Semi Final", "6.01")])],
        );
        normalizer.normalize(&mut speed);
        assert_eq!(speed.records[0][EIGHTHFINAL], "6.12");
        // semifinal grouping is not configured for speed
        assert_eq!(speed.records[0]["Semi Final"], "6.01");

        let mut combined = CategoryDataset::with_records(
            CategoryKind::Combined,
            vec![record(&[("Semi Final", "4")])],
        );
        let before = combined.clone();
        assert!(normalizer.normalize(&mut combined).is_empty());
        assert_eq!(combined, before);
    }

    #[test]
    fn newly_registered_variant_is_collapsed() {
        let mut registry = VariantRegistry::new();
        registry.register(
            CategoryKind::Boulder,
            VariantGroup::new(&["Demi-finale"], SEMIFINAL),
        );
        let normalizer = SchemaNormalizer::new(registry);

        let mut dataset = CategoryDataset::with_records(
            CategoryKind::Boulder,
            vec![record(&[("Demi-finale", "2T3z"), ("Semi Final", "1T2z")])],
        );
        normalizer.normalize(&mut dataset);

        assert_eq!(dataset.records[0][SEMIFINAL], "1T2z,2T3z");
    }

    #[test]
    fn empty_dataset_is_untouched() {
        let mut dataset = lead_dataset(Vec::new());
        assert!(SchemaNormalizer::default().normalize(&mut dataset).is_empty());
        assert!(dataset.is_empty());
    }
}
