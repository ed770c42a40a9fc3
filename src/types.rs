use crate::constants::FIELD_COMPETITION_TITLE;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A competition as listed in the site's competition chooser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionRef {
    pub name: String,
    pub date: String,
    pub result_page_url: String,
}

/// One category result page linked from a competition page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryRef {
    pub label: String,
    pub url: String,
}

/// Discipline a subcategory belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Lead,
    Speed,
    Boulder,
    Combined,
    Unknown,
}

impl CategoryKind {
    /// The kinds that have their own dataset, in classifier priority order.
    pub const SCRAPED: [CategoryKind; 4] = [
        CategoryKind::Lead,
        CategoryKind::Speed,
        CategoryKind::Boulder,
        CategoryKind::Combined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Lead => "lead",
            CategoryKind::Speed => "speed",
            CategoryKind::Boulder => "boulder",
            CategoryKind::Combined => "combined",
            CategoryKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a results table, keyed by column name in insertion order
pub type ResultRecord = IndexMap<String, String>;

/// Full historical table for one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDataset {
    pub kind: CategoryKind,
    pub records: Vec<ResultRecord>,
}

impl CategoryDataset {
    pub fn new(kind: CategoryKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
        }
    }

    pub fn with_records(kind: CategoryKind, records: Vec<ResultRecord>) -> Self {
        Self { kind, records }
    }

    /// Ordered union of the fields of every record, first-seen order.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: IndexSet<&str> = IndexSet::new();
        for record in &self.records {
            for key in record.keys() {
                columns.insert(key.as_str());
            }
        }
        columns.into_iter().map(str::to_string).collect()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.records.iter().any(|r| r.contains_key(column))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Non-empty competition titles, in row order and possibly repeated.
    pub fn competition_titles(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter_map(|r| r.get(FIELD_COMPETITION_TITLE))
            .map(|t| t.as_str())
            .filter(|t| !t.trim().is_empty())
    }
}
