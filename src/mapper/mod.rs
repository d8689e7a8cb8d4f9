//! Record mapper: stored row shape to the `Tree` view shape.
//!
//! `to_tree` is total. Absent optional columns get documented defaults and a
//! malformed timestamp degrades to the best date it can recover.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

use crate::models::{Tree, TreeRow};

/// Substrings marking an image reference as a stand-in rather than a real photo.
pub const PLACEHOLDER_MARKERS: &[&str] = &[
    "images.unsplash.com",
    "placeholder",
    "placehold.co",
    "picsum.photos",
    "pexels.com",
];

/// True when no real photo is attached: empty reference or a known
/// placeholder/stock-photo marker.
pub fn is_pending_image(image_url: &str) -> bool {
    let trimmed = image_url.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lowered = trimmed.to_lowercase();
    PLACEHOLDER_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// Map a stored row to the view shape.
pub fn to_tree(row: TreeRow) -> Tree {
    let image_url = row.image_url.unwrap_or_default();
    let pending_image = is_pending_image(&image_url);
    let added_date = calendar_date(&row.added_date);

    Tree {
        id: row.id,
        name: row.scientific_name.clone(),
        species: row.scientific_name.clone(),
        scientific_name: row.scientific_name,
        family: row.family,
        common_name_english: row.common_name_english.unwrap_or_default(),
        common_name_malayalam: row.common_name_malayalam.filter(|s| !s.is_empty()),
        native_range: row.native_range.filter(|s| !s.is_empty()),
        location: row.location,
        description: row.description.unwrap_or_default(),
        image_url,
        added_date,
        pending_image,
    }
}

/// Convert a stored insertion timestamp to `YYYY-MM-DD` in the local zone.
fn calendar_date(raw: &str) -> String {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Local).format("%Y-%m-%d").to_string();
    }

    // SQLite's datetime('now') shape, always UTC
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return naive
            .and_utc()
            .with_timezone(&Local)
            .format("%Y-%m-%d")
            .to_string();
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }

    tracing::warn!("Unparseable added_date {:?}, leaving blank", raw);
    String::new()
}

/// Today's date in the same format the mapper produces.
pub fn today() -> String {
    Utc::now().with_timezone(&Local).format("%Y-%m-%d").to_string()
}
