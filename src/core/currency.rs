//! Display names and symbols for common currency codes.

const CURRENCIES: &[(&str, &str, Option<&str>)] = &[
    ("AED", "UAE Dirham", None),
    ("ARS", "Argentine Peso", None),
    ("AUD", "Australian Dollar", Some("A$")),
    ("BGN", "Bulgarian Lev", None),
    ("BRL", "Brazilian Real", Some("R$")),
    ("CAD", "Canadian Dollar", Some("C$")),
    ("CHF", "Swiss Franc", Some("Fr")),
    ("CLP", "Chilean Peso", None),
    ("CNY", "Chinese Yuan", Some("CN¥")),
    ("COP", "Colombian Peso", None),
    ("CZK", "Czech Koruna", None),
    ("DKK", "Danish Krone", None),
    ("EGP", "Egyptian Pound", None),
    ("EUR", "Euro", Some("€")),
    ("GBP", "British Pound", Some("£")),
    ("HKD", "Hong Kong Dollar", Some("HK$")),
    ("HUF", "Hungarian Forint", None),
    ("IDR", "Indonesian Rupiah", Some("Rp")),
    ("ILS", "Israeli New Shekel", None),
    ("INR", "Indian Rupee", Some("₹")),
    ("ISK", "Icelandic Króna", Some("kr")),
    ("JPY", "Japanese Yen", Some("¥")),
    ("KRW", "South Korean Won", Some("₩")),
    ("KWD", "Kuwaiti Dinar", None),
    ("MXN", "Mexican Peso", None),
    ("MYR", "Malaysian Ringgit", Some("RM")),
    ("NOK", "Norwegian Krone", None),
    ("NZD", "New Zealand Dollar", Some("NZ$")),
    ("PHP", "Philippine Peso", Some("₱")),
    ("PLN", "Polish Zloty", None),
    ("QAR", "Qatari Riyal", None),
    ("RON", "Romanian Leu", None),
    ("SAR", "Saudi Riyal", None),
    ("SEK", "Swedish Krona", None),
    ("SGD", "Singapore Dollar", Some("S$")),
    ("THB", "Thai Baht", Some("฿")),
    ("TRY", "Turkish Lira", None),
    ("TWD", "New Taiwan Dollar", Some("NT$")),
    ("USD", "US Dollar", Some("$")),
    ("VND", "Vietnamese Dong", Some("₫")),
    ("ZAR", "South African Rand", None),
];

fn lookup(code: &str) -> Option<&'static (&'static str, &'static str, Option<&'static str>)> {
    CURRENCIES.iter().find(|(c, _, _)| *c == code)
}

pub fn currency_name(code: &str) -> Option<&'static str> {
    lookup(code).map(|(_, name, _)| *name)
}

pub fn currency_symbol(code: &str) -> Option<&'static str> {
    lookup(code).and_then(|(_, _, symbol)| *symbol)
}

/// Trims and upper-cases `input`, accepting only three ASCII letters.
pub fn normalize_code(input: &str) -> Option<String> {
    let code = input.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_ascii_uppercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_codes() {
        assert_eq!(currency_name("EUR"), Some("Euro"));
        assert_eq!(currency_symbol("TWD"), Some("NT$"));
        assert_eq!(currency_symbol("SEK"), None);
        assert_eq!(currency_name("XYZ"), None);
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" usd "), Some("USD".to_string()));
        assert_eq!(normalize_code("Jpy"), Some("JPY".to_string()));
        assert_eq!(normalize_code("US"), None);
        assert_eq!(normalize_code("US1"), None);
        assert_eq!(normalize_code("EURO"), None);
    }
}
