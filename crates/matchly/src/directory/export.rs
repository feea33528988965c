use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::query::DirectoryView;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    name: &'a str,
    niche: &'a str,
    platform: &'a str,
    followers: u64,
    has_media_kit: bool,
    saved: bool,
    created_at: String,
}

/// Writes the visible creators, in display order, as CSV with a header row.
pub fn write_csv<W: Write>(view: &DirectoryView, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for card in &view.creators {
        let record = &card.record;
        csv_writer.serialize(ExportRow {
            id: record.id.as_str(),
            name: &record.name,
            niche: &record.niche,
            platform: record.platform_label(),
            followers: record.followers,
            has_media_kit: record.has_media_kit(),
            saved: card.saved,
            created_at: record
                .created_at
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_default(),
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}
