//! Search and lookup over a published batch

use super::models::CatalogItem;

/// Items whose name contains `query`, ignoring case
///
/// An empty query matches everything. Batch order is preserved.
pub fn filter_by_name<'a>(items: &'a [CatalogItem], query: &str) -> Vec<&'a CatalogItem> {
    if query.is_empty() {
        return items.iter().collect();
    }

    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn find_by_id(items: &[CatalogItem], id: i64) -> Option<&CatalogItem> {
    items.iter().find(|item| item.id == id)
}

/// Capitalize each word for display (e.g., "mr. mime" -> "Mr. Mime")
pub fn display_name(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
