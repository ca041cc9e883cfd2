//! Severity ranking and id deduplication.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::GuidanceItem;

/// Order items by severity (most severe first), then id ascending.
fn item_order(a: &GuidanceItem, b: &GuidanceItem) -> Ordering {
    b.severity.cmp(&a.severity).then_with(|| a.id.cmp(&b.id))
}

/// Merge exact id collisions and sort. Of two items sharing an id the more
/// severe one is kept; on equal severity the first one seen stays.
/// Builds a new list; the input is not touched. Idempotent.
pub fn rank(items: &[GuidanceItem]) -> Vec<GuidanceItem> {
    let mut kept: Vec<GuidanceItem> = Vec::with_capacity(items.len());
    let mut index: HashMap<&str, usize> = HashMap::new();

    for item in items {
        match index.get(item.id.as_str()) {
            Some(&at) => {
                if item.severity > kept[at].severity {
                    log::debug!("Duplicate '{}' replaced by higher severity", item.id);
                    kept[at] = item.clone();
                }
            }
            None => {
                index.insert(item.id.as_str(), kept.len());
                kept.push(item.clone());
            }
        }
    }

    kept.sort_by(item_order);
    kept
}
