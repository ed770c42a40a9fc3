use crate::types::CompetitionRef;
use std::collections::HashSet;
use tracing::info;

/// Competitions whose name is not yet in `scraped`, in discovery order.
///
/// Names are the only identity: a competition reusing an earlier name is
/// treated as already scraped even if its date or URL differ.
pub fn filter_new_competitions(
    competitions: Vec<CompetitionRef>,
    scraped: &HashSet<String>,
) -> Vec<CompetitionRef> {
    let discovered = competitions.len();
    let fresh: Vec<CompetitionRef> = competitions
        .into_iter()
        .filter(|c| !scraped.contains(&c.name))
        .collect();

    info!(
        "{} of {} discovered competitions are new ({} already scraped)",
        fresh.len(),
        discovered,
        discovered - fresh.len()
    );
    fresh
}
