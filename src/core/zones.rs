use crate::types::{IdAssignment, ZoneError, ZoneRecord, ZoneResult};

/// Assign a dense zero-based identifier to each boundary record
///
/// The returned vector is aligned with `records`. Under `Rank` the
/// identifier is the record's position in a stable sort of the sort keys
/// (ties keep file order); under `Positional` it is simply the record's
/// position in file order. Either way the identifiers form the exact set
/// `0..records.len()`.
pub fn assign_identifiers(records: &[ZoneRecord], policy: IdAssignment) -> Vec<u32> {
    match policy {
        IdAssignment::Positional => (0..records.len() as u32).collect(),
        IdAssignment::Rank => {
            let mut order: Vec<usize> = (0..records.len()).collect();
            order.sort_by(|&a, &b| records[a].key.cmp(&records[b].key));

            let mut ids = vec![0u32; records.len()];
            for (rank, &index) in order.iter().enumerate() {
                ids[index] = rank as u32;
            }
            ids
        }
    }
}

/// Verify that a sorted identifier sequence is perfectly contiguous
///
/// The sequence must start at zero and each successive difference must equal
/// one. A gap means a zone lost its population row in the join; a repeat
/// means a key matched more than one row.
pub fn check_contiguous(sorted_ids: &[u32]) -> ZoneResult<()> {
    if let Some(&first) = sorted_ids.first() {
        if first != 0 {
            return Err(ZoneError::Contiguity(format!(
                "Sequence starts at {} instead of 0",
                first
            )));
        }
    }

    for pair in sorted_ids.windows(2) {
        let diff = pair[1] as i64 - pair[0] as i64;
        if diff != 1 {
            return Err(ZoneError::Contiguity(format!(
                "Identifier {} follows {} (difference {})",
                pair[1], pair[0], diff
            )));
        }
    }

    Ok(())
}
