//! Product title helpers.

/// Shorten a product title to its first two words.
///
/// Product cards, cart rows and notifications all show this short form;
/// the full title only appears on the product detail page.
///
/// ```
/// use fresh_cart_core::short_title;
///
/// assert_eq!(short_title("Woman Shawl Cotton Blend"), "Woman Shawl");
/// assert_eq!(short_title("  Jacket  "), "Jacket");
/// ```
#[must_use]
pub fn short_title(title: &str) -> String {
    title.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}
