use crate::core::zones::check_contiguous;
use crate::types::{PopulationRecord, PopulationRow, SortKey, ZoneError, ZoneRecord, ZoneResult};
use std::collections::HashMap;

/// Inner-join the identified zones against the population table
///
/// Every population row whose key equals a zone's sort key produces one
/// output row, so duplicate keys surface as repeated identifiers and are
/// rejected by the contiguity check rather than silently collapsed. The
/// result is sorted by zone identifier and renamed to the output schema.
pub fn join_population(
    zones: &[ZoneRecord],
    ids: &[u32],
    population: &[PopulationRecord],
) -> ZoneResult<Vec<PopulationRow>> {
    debug_assert_eq!(zones.len(), ids.len());

    let mut by_key: HashMap<&SortKey, Vec<&PopulationRecord>> = HashMap::new();
    for record in population {
        by_key.entry(&record.key).or_default().push(record);
    }

    let mut rows: Vec<PopulationRow> = Vec::with_capacity(zones.len());
    for (zone, &zone_identity) in zones.iter().zip(ids) {
        if let Some(matches) = by_key.get(&zone.key) {
            for record in matches {
                rows.push(PopulationRow {
                    zone_identity,
                    initial_value: record.initial_population,
                    final_value: record.final_population,
                });
            }
        } else {
            log::warn!("No population row for zone key {}", zone.key);
        }
    }

    rows.sort_by_key(|row| row.zone_identity);

    let sorted_ids: Vec<u32> = rows.iter().map(|row| row.zone_identity).collect();
    check_contiguous(&sorted_ids)?;

    // Contiguity alone cannot see a missing tail zone; the row count can.
    if rows.len() != zones.len() {
        return Err(ZoneError::Contiguity(format!(
            "{} joined rows for {} zones",
            rows.len(),
            zones.len()
        )));
    }

    let matched: usize = rows.len();
    if matched < population.len() {
        log::debug!(
            "{} population rows had no matching zone",
            population.len() - matched
        );
    }

    Ok(rows)
}
