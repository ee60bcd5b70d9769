use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Elo,
    Hipercard,
    Diners,
    Discover,
}

impl CardBrand {
    pub fn as_str(self) -> &'static str {
        match self {
            CardBrand::Visa => "visa",
            CardBrand::Mastercard => "mastercard",
            CardBrand::Amex => "amex",
            CardBrand::Elo => "elo",
            CardBrand::Hipercard => "hipercard",
            CardBrand::Diners => "diners",
            CardBrand::Discover => "discover",
        }
    }

    pub fn cvv_len(self) -> usize {
        match self {
            CardBrand::Amex => 4,
            _ => 3,
        }
    }
}

// Elo and Hipercard ranges overlap Visa/Discover, so they are tried first.
static BRAND_PATTERNS: LazyLock<Vec<(CardBrand, Regex)>> = LazyLock::new(|| {
    [
        (
            CardBrand::Elo,
            r"^(4011(78|79)|43(1274|8935)|45(1416|7393|763(1|2))|50(4175|6699|67[0-7][0-9]|9000)|627780|63(6297|6368)|650(03[^4]|04[0-9]|05[01]|4(0[5-9]|3[0-9]|8[5-9]|9[0-9])|5([0-2][0-9]|3[0-8])|9([2-6][0-9]|7[0-8])|541|700|720|901)|651652|655000|655021)",
        ),
        (CardBrand::Hipercard, r"^(606282|3841)"),
        (CardBrand::Amex, r"^3[47]"),
        (CardBrand::Diners, r"^3(0[0-5]|[68])"),
        (CardBrand::Discover, r"^6(011|5)"),
        (
            CardBrand::Mastercard,
            r"^(5[1-5]|2(2(2[1-9]|[3-9][0-9])|[3-6][0-9]{2}|7([01][0-9]|20)))",
        ),
        (CardBrand::Visa, r"^4"),
    ]
    .into_iter()
    .filter_map(|(brand, pattern)| Regex::new(pattern).ok().map(|re| (brand, re)))
    .collect()
});

/// Digits of a card number with spaces and dashes removed.
pub fn card_digits(number: &str) -> String {
    number.chars().filter(char::is_ascii_digit).collect()
}

pub fn detect_brand(number: &str) -> Option<CardBrand> {
    let digits = card_digits(number);
    BRAND_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(&digits))
        .map(|(brand, _)| *brand)
}

pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Whether a card expiring at the end of `month/year` is still usable on `today`.
/// Two-digit years are read as 20xx.
pub fn expiry_valid(month: u32, year: i32, today: NaiveDate) -> bool {
    if !(1..=12).contains(&month) {
        return false;
    }
    let year = if year < 100 { 2000 + year } else { year };
    (year, month) >= (today.year(), today.month())
}

/// Last four digits of the card; the only part of the number that is stored.
pub fn last4(digits: &str) -> String {
    let start = digits.len().saturating_sub(4);
    digits[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_brands() {
        let cases = [
            ("4111 1111 1111 1111", CardBrand::Visa),
            ("5555-5555-5555-4444", CardBrand::Mastercard),
            ("2223000048400011", CardBrand::Mastercard),
            ("378282246310005", CardBrand::Amex),
            ("30569309025904", CardBrand::Diners),
            ("6011111111111117", CardBrand::Discover),
            ("6362970000457013", CardBrand::Elo),
            ("5067224275805500", CardBrand::Elo),
            ("6062825624254001", CardBrand::Hipercard),
        ];
        for (number, brand) in cases {
            assert_eq!(detect_brand(number), Some(brand), "{number}");
        }
        assert_eq!(detect_brand("9999999999999999"), None);
    }

    #[test]
    fn luhn_check() {
        assert!(luhn_valid("4111111111111111"));
        assert!(luhn_valid("6362970000457013"));
        assert!(!luhn_valid("4111111111111112"));
        assert!(!luhn_valid(""));
        assert!(!luhn_valid("4111a11111111111"));
    }

    #[test]
    fn expiry_is_inclusive_of_current_month() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 20).unwrap();
        assert!(expiry_valid(5, 2026, today));
        assert!(expiry_valid(1, 27, today));
        assert!(!expiry_valid(4, 2026, today));
        assert!(!expiry_valid(13, 2030, today));
    }

    #[test]
    fn keeps_only_last_four_digits() {
        assert_eq!(last4("4111111111111111"), "1111");
        assert_eq!(last4("12"), "12");
    }
}
