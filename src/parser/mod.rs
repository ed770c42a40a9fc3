use crate::constants::{
    FIELD_CATEGORY, FIELD_COMPETITION_DATE, FIELD_COMPETITION_TITLE, FIELD_FIRST_NAME,
    FIELD_LAST_NAME,
};
use crate::page::RawTable;
use crate::types::{CategoryKind, CompetitionRef, ResultRecord};
use tracing::{debug, warn};

/// Fields prepended to every record scraped for `competition`.
pub fn record_prefix(competition: &CompetitionRef, kind: CategoryKind) -> Vec<(String, String)> {
    vec![
        (FIELD_COMPETITION_TITLE.to_string(), competition.name.clone()),
        (FIELD_COMPETITION_DATE.to_string(), competition.date.clone()),
        (FIELD_CATEGORY.to_string(), kind.as_str().to_string()),
    ]
}

/// Fixes the athlete name headers.
///
/// Result pages put first and last name in two cells under a single header;
/// the second header becomes `LAST` and `FIRST` is inserted after it.
pub fn correct_headers(headers: &[String]) -> Vec<String> {
    let mut corrected = headers.to_vec();
    if corrected.len() < 2 {
        warn!(
            "Header row has {} cells, leaving name columns uncorrected",
            corrected.len()
        );
        return corrected;
    }
    corrected[1] = FIELD_LAST_NAME.to_string();
    corrected.insert(2, FIELD_FIRST_NAME.to_string());
    corrected
}

/// One record per data row: `prefix` then the cells zipped with the headers.
///
/// Short rows give short records; cells past the last header are dropped.
/// Rows without cells are not data rows and are skipped.
pub fn extract_records(table: &RawTable, prefix: &[(String, String)]) -> Vec<ResultRecord> {
    let headers = correct_headers(&table.headers);

    let records: Vec<ResultRecord> = table
        .rows
        .iter()
        .filter(|row| !row.is_empty())
        .map(|row| {
            let mut record: ResultRecord = prefix.iter().cloned().collect();
            for (header, cell) in headers.iter().zip(row) {
                record.insert(header.clone(), cell.clone());
            }
            record
        })
        .collect();

    debug!(
        "Extracted {} records from {} rows",
        records.len(),
        table.rows.len()
    );
    records
}
