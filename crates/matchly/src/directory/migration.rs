use super::domain::CreatorRecord;

/// Assigns `now` to every record that predates creation timestamps.
///
/// Returns how many records were touched; existing timestamps are never
/// rewritten, so a second pass over the output is a no-op.
pub fn backfill_created_at(records: &mut [CreatorRecord], now: i64) -> usize {
    let mut filled = 0;
    for record in records.iter_mut().filter(|record| record.created_at.is_none()) {
        record.created_at = Some(now);
        filled += 1;
    }
    filled
}
