//! Date bucketing.
//!
//! Gallery entries are grouped by the calendar day of their source file's
//! modification time and handed to the renderer most-recent-day first.
//! Within a day, insertion order (= discovery order) is preserved; no
//! secondary sort is applied.

use crate::refresh::GalleryEntry;
use std::collections::BTreeMap;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, UtcOffset};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// One calendar day's worth of gallery entries.
#[derive(Debug)]
pub struct DateBucket {
    pub date: Date,
    /// Entries in discovery order.
    pub entries: Vec<GalleryEntry>,
}
impl DateBucket {
    /// The `YYYY-MM-DD` label used as both display text and DOM identifier.
    pub fn label(&self) -> String {
        self.date.format(&DATE_FORMAT).unwrap_or_else(|_| self.date.to_string())
    }
}

/// Bucket entries by calendar day in the given UTC offset, descending by
/// date.
///
/// The offset is resolved once at startup (local offset lookup is fallible
/// in multithreaded processes) and applied uniformly, so a photo taken at
/// 23:30 UTC lands on the viewer's next day when their offset says so.
pub fn by_day(entries: Vec<GalleryEntry>, offset: UtcOffset) -> Vec<DateBucket> {
    let mut buckets: BTreeMap<Date, Vec<GalleryEntry>> = BTreeMap::new();
    for entry in entries {
        let date = entry.file.modified.to_offset(offset).date();
        buckets.entry(date).or_default().push(entry);
    }
    // BTreeMap iterates ascending; the page wants most recent first.
    buckets.into_iter().rev().map(|(date, entries)| DateBucket { date, entries }).collect()
}
