pub mod account_service;
pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod coupon_service;
pub mod notification_service;
pub mod order_service;
pub mod product_service;
pub mod shipping_service;

/// `%term%` for `ILIKE`, with the pattern characters in `term` matched literally.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(contains_pattern("body"), "%body%");
        assert_eq!(contains_pattern("Body_1"), "%Body\\_1%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
