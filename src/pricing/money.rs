/// Largest amount, in centavos, accepted from clients (R$ 1 bilhão).
pub const MAX_AMOUNT: i64 = 100_000_000_000;

/// Whether `cents` is a non-negative amount no larger than [`MAX_AMOUNT`].
pub fn is_valid_amount(cents: i64) -> bool {
    (0..=MAX_AMOUNT).contains(&cents)
}

/// Format an amount in centavos as Brazilian reais, e.g. `R$ 1.234,56`.
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let reais = abs / 100;
    let centavos = abs % 100;

    let digits = reais.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}R$ {grouped},{centavos:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_thousands_separator() {
        assert_eq!(format_brl(0), "R$ 0,00");
        assert_eq!(format_brl(5), "R$ 0,05");
        assert_eq!(format_brl(10_000), "R$ 100,00");
        assert_eq!(format_brl(123_456), "R$ 1.234,56");
        assert_eq!(format_brl(100_000_000), "R$ 1.000.000,00");
    }

    #[test]
    fn amounts_are_bounded() {
        assert!(is_valid_amount(0));
        assert!(is_valid_amount(MAX_AMOUNT));
        assert!(!is_valid_amount(MAX_AMOUNT + 1));
        assert!(!is_valid_amount(-1));
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_brl(-1_050), "-R$ 10,50");
    }
}
