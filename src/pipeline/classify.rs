use crate::config::ClassifierConfig;
use crate::constants::LABEL_SUFFIX_LEN;
use crate::types::CategoryKind;
use tracing::warn;

const LEAD_SUFFIXES: &[&str] = &["lead"];
const SPEED_SUFFIXES: &[&str] = &["speed"];
const BOULDER_SUFFIXES: &[&str] = &["boulder", "bouldering"];
const COMBINED_SUFFIXES: &[&str] = &["combined"];

/// Maps subcategory labels to category kinds by suffix
///
/// Labels look like `"IFSC World Cup Men lead 28 - 29 Nov 2019"`: the
/// category word sits right before a fixed-width venue/date suffix.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    // priority order: first kind with a matching suffix wins
    table: Vec<(CategoryKind, Vec<String>)>,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryClassifier {
    pub fn new() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        let table = CategoryKind::SCRAPED
            .iter()
            .map(|&kind| {
                let suffixes = match config.suffixes_for(kind) {
                    Some(custom) => custom.to_vec(),
                    None => built_in_suffixes(kind)
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                };
                (kind, suffixes)
            })
            .collect();
        Self { table }
    }

    /// Classifies a label; unmatched labels are logged and yield `Unknown`.
    pub fn classify(&self, label: &str) -> CategoryKind {
        let text = category_text(label);
        for (kind, suffixes) in &self.table {
            if suffixes.iter().any(|s| ends_with_ignore_case(text, s)) {
                return *kind;
            }
        }

        warn!(
            label = %label,
            unmatched = %text,
            "Unrecognized subcategory label, classifier needs a new suffix"
        );
        CategoryKind::Unknown
    }
}

fn built_in_suffixes(kind: CategoryKind) -> &'static [&'static str] {
    match kind {
        CategoryKind::Lead => LEAD_SUFFIXES,
        CategoryKind::Speed => SPEED_SUFFIXES,
        CategoryKind::Boulder => BOULDER_SUFFIXES,
        CategoryKind::Combined => COMBINED_SUFFIXES,
        CategoryKind::Unknown => &[],
    }
}

/// The label without its venue/date suffix and trailing whitespace.
pub fn category_text(label: &str) -> &str {
    let chars = label.chars().count();
    if chars <= LABEL_SUFFIX_LEN {
        return "";
    }
    let cut = label
        .char_indices()
        .nth(chars - LABEL_SUFFIX_LEN)
        .map(|(i, _)| i)
        .unwrap_or(label.len());
    label[..cut].trim_end()
}

fn ends_with_ignore_case(text: &str, suffix: &str) -> bool {
    if suffix.is_empty() || text.len() < suffix.len() {
        return false;
    }
    let start = text.len() - suffix.len();
    text.is_char_boundary(start) && text[start..].eq_ignore_ascii_case(suffix)
}
