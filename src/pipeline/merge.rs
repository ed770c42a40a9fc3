use crate::types::{CategoryDataset, ResultRecord};
use std::collections::BTreeSet;
use tracing::debug;

/// Prepends this run's records to the persisted dataset.
///
/// Rows are not deduplicated here; competitions were already filtered by
/// name before scraping.
pub fn merge_dataset(fresh: Vec<ResultRecord>, prior: CategoryDataset) -> CategoryDataset {
    let kind = prior.kind;
    let (fresh_len, prior_len) = (fresh.len(), prior.len());

    let mut records = fresh;
    records.extend(prior.records);

    debug!(
        "Merged {} new and {} persisted {} records",
        fresh_len, prior_len, kind
    );
    CategoryDataset::with_records(kind, records)
}

/// Sorted, unique competition titles across all datasets.
pub fn registry_names<'a>(
    datasets: impl IntoIterator<Item = &'a CategoryDataset>,
) -> BTreeSet<String> {
    datasets
        .into_iter()
        .flat_map(|d| d.competition_titles())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FIELD_COMPETITION_TITLE;
    use crate::types::CategoryKind;

    fn titled(title: &str, rank: &str) -> ResultRecord {
        [
            (FIELD_COMPETITION_TITLE.to_string(), title.to_string()),
            ("Rank".to_string(), rank.to_string()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn new_records_come_first() {
        let prior = CategoryDataset::with_records(
            CategoryKind::Lead,
            vec![titled("Old", "1"), titled("Old", "2")],
        );
        let merged = merge_dataset(vec![titled("New", "1")], prior);

        assert_eq!(merged.kind, CategoryKind::Lead);
        let order: Vec<&str> = merged.competition_titles().collect();
        assert_eq!(order, vec!["New", "Old", "Old"]);
    }

    #[test]
    fn merging_nothing_keeps_prior_unchanged() {
        let prior = CategoryDataset::with_records(CategoryKind::Speed, vec![titled("Old", "1")]);
        let merged = merge_dataset(Vec::new(), prior.clone());
        assert_eq!(merged, prior);
    }

    #[test]
    fn registry_is_union_of_all_titles() {
        let lead = CategoryDataset::with_records(
            CategoryKind::Lead,
            vec![titled("Briancon 2019", "1"), titled("Kranj 2019", "1")],
        );
        let speed =
            CategoryDataset::with_records(CategoryKind::Speed, vec![titled("Xiamen 2019", "1")]);
        let boulder =
            CategoryDataset::with_records(CategoryKind::Boulder, vec![titled("Kranj 2019", "2")]);
        let combined = CategoryDataset::new(CategoryKind::Combined);

        let names = registry_names([&lead, &speed, &boulder, &combined]);
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["Briancon 2019", "Kranj 2019", "Xiamen 2019"]);
    }
}
