//! Client-side catalog filtering.
//!
//! The remote API is asked for the full product list and the storefront
//! narrows it down here. Matching is on exact display names, which is what
//! category and brand links carry in their paths.

use crate::api::Product;

/// Products whose category is named exactly `category`, in input order.
#[must_use]
pub fn filter_by_category(products: Vec<Product>, category: &str) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| p.category.name == category)
        .collect()
}

/// Products whose brand is named exactly `brand`, in input order.
///
/// Products without a brand never match.
#[must_use]
pub fn filter_by_brand(products: Vec<Product>, brand: &str) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| p.brand_name() == Some(brand))
        .collect()
}

/// Other products in the same category as `product`.
#[must_use]
pub fn related_products(products: Vec<Product>, product: &Product) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| p.category.name == product.category.name && p.id != product.id)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product(id: &str, category: &str, brand: Option<&str>) -> Product {
        let mut value = json!({
            "_id": id,
            "title": format!("Product {id}"),
            "price": 100,
            "category": {"_id": format!("cat-{category}"), "name": category, "slug": category},
        });
        if let Some(brand) = brand {
            value["brand"] = json!({"_id": format!("brand-{brand}"), "name": brand, "slug": brand});
        }
        serde_json::from_value(value).unwrap()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("1", "Electronics", Some("Sony")),
            product("2", "Men's Fashion", Some("DeFacto")),
            product("3", "Electronics", Some("Samsung")),
            product("4", "Women's Fashion", None),
            product("5", "Electronics", Some("Sony")),
        ]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_category_filter_keeps_only_matches_in_order() {
        let filtered = filter_by_category(catalog(), "Electronics");
        assert_eq!(ids(&filtered), ["1", "3", "5"]);
        assert!(filtered.iter().all(|p| p.category.name == "Electronics"));
    }

    #[test]
    fn test_category_filter_is_exact() {
        assert!(filter_by_category(catalog(), "electronics").is_empty());
        assert!(filter_by_category(catalog(), "Fashion").is_empty());
        assert_eq!(ids(&filter_by_category(catalog(), "Men's Fashion")), ["2"]);
    }

    #[test]
    fn test_brand_filter_skips_unbranded() {
        assert_eq!(ids(&filter_by_brand(catalog(), "Sony")), ["1", "5"]);
        assert!(filter_by_brand(catalog(), "").is_empty());
    }

    #[test]
    fn test_related_excludes_self() {
        let all = catalog();
        let current = all[2].clone();
        assert_eq!(ids(&related_products(all, &current)), ["1", "5"]);
    }

    #[test]
    fn test_empty_catalog() {
        assert!(filter_by_category(Vec::new(), "Electronics").is_empty());
    }
}
