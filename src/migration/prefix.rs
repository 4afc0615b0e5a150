/// Top-level prefix for a table: `order` -> `orders`, `address` -> `address`.
pub fn derive_prefix(table_name: &str) -> String {
    if table_name.ends_with('s') {
        table_name.to_string()
    } else {
        format!("{table_name}s")
    }
}

/// Listing prefix of one identifier. The trailing `/` keeps `orders/1/` from matching `orders/10/`.
pub fn build_listing_prefix(category_prefix: &str, identifier: &str) -> String {
    format!("{category_prefix}/{identifier}/")
}
