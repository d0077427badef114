//! Number coercion, rupee formatting and amount-in-words.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

// ==========================================
// Coercion
// ==========================================

// Longest numeric prefix, the way a lenient float parser reads "12.5kg" as 12.5.
static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("numeric prefix regex")
});

/// Anything a form field can hand us as a number.
pub trait Numeric {
    fn to_number(&self) -> f64;
}

impl Numeric for f64 {
    fn to_number(&self) -> f64 {
        if self.is_finite() { *self } else { 0.0 }
    }
}

impl Numeric for str {
    fn to_number(&self) -> f64 {
        let cleaned = self.replace(',', "");
        NUMERIC_PREFIX
            .find(cleaned.trim_start())
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map_or(0.0, |n| n.to_number())
    }
}

impl Numeric for String {
    fn to_number(&self) -> f64 {
        self.as_str().to_number()
    }
}

impl<T: Numeric + ?Sized> Numeric for &T {
    fn to_number(&self) -> f64 {
        (**self).to_number()
    }
}

/// Coerces any numeric input to a finite number; unparseable input is 0.
pub fn to_number<N: Numeric + ?Sized>(input: &N) -> f64 {
    input.to_number()
}

// ==========================================
// Currency
// ==========================================

/// Formats an amount as Indian rupees: `₹12,34,567.50`.
///
/// Grouping follows `en-IN`: the last three digits, then pairs.
pub fn format_currency<N: Numeric + ?Sized>(amount: &N) -> String {
    let value = amount.to_number();
    let paise = to_paise(value.abs());
    let rupees = paise / 100;
    let fraction = paise % 100;
    let sign = if value < 0.0 && paise > 0 { "-" } else { "" };
    format!("{sign}₹{}.{fraction:02}", group_indian(rupees))
}

// Rounds the shortest decimal form of the value, so 34.425 is 3443 paise
// even though its binary product with 100 lands just below.
fn to_paise(value: f64) -> u64 {
    Decimal::from_str(&value.to_string())
        .ok()
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| (d * Decimal::ONE_HUNDRED).to_u64())
        .unwrap_or_else(|| (value * 100.0).round() as u64)
}

fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = head
        .as_bytes()
        .rchunks(2)
        .rev()
        .map(|c| std::str::from_utf8(c).unwrap_or_default())
        .collect();
    groups.push(tail);
    groups.join(",")
}

/// Formats a quantity without trailing zeros (`5`, `1.5`).
pub fn format_quantity<N: Numeric + ?Sized>(qty: &N) -> String {
    format!("{}", qty.to_number())
}

// ==========================================
// Amount in words
// ==========================================

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;
const THOUSAND: u64 = 1_000;
const HUNDRED: u64 = 100;

/// Spells out the rounded amount in the crore/lakh system.
///
/// `1234567` reads "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven
/// Rupees Only". Zero and negative amounts read "Zero Rupees Only".
pub fn amount_in_words<N: Numeric + ?Sized>(amount: &N) -> String {
    let rounded = amount.to_number().round();
    if rounded <= 0.0 {
        return "Zero Rupees Only".to_string();
    }
    // Saturates above u64::MAX, far beyond any quotation.
    let n = rounded as u64;
    let words = segments(n).join(" ");
    format!("{words} Rupees Only")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn segments(n: u64) -> Vec<String> {
    let crore = n / CRORE;
    let lakh = (n % CRORE) / LAKH;
    let thousand = (n % LAKH) / THOUSAND;
    let hundred = (n % THOUSAND) / HUNDRED;
    let rest = n % HUNDRED;

    let mut segs = Vec::new();
    if crore > 0 {
        let count = if crore < 100 {
            two_digits(crore)
        } else {
            segments(crore).join(" ")
        };
        segs.push(format!("{count} Crore"));
    }
    if lakh > 0 {
        segs.push(format!("{} Lakh", two_digits(lakh)));
    }
    if thousand > 0 {
        segs.push(format!("{} Thousand", two_digits(thousand)));
    }
    if hundred > 0 {
        segs.push(format!("{} Hundred", ONES[hundred as usize]));
    }
    if rest > 0 {
        segs.push(two_digits(rest));
    }
    segs
}

fn two_digits(n: u64) -> String {
    let n = n as usize;
    if n < 20 {
        ONES[n].to_string()
    } else if n % 10 == 0 {
        TENS[n / 10].to_string()
    } else {
        format!("{} {}", TENS[n / 10], ONES[n % 10])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn to_number_is_lenient() {
        assert_eq!(to_number("abc"), 0.0);
        assert_eq!(to_number("1,200.50"), 1200.5);
        assert_eq!(to_number(""), 0.0);
        assert_eq!(to_number("  42"), 42.0);
        assert_eq!(to_number("12abc"), 12.0);
        assert_eq!(to_number(".5"), 0.5);
        assert_eq!(to_number("-3"), -3.0);
        assert_eq!(to_number("1e3"), 1000.0);
        assert_eq!(to_number("1e999"), 0.0);
        assert_eq!(to_number("Infinity"), 0.0);
        assert_eq!(to_number(&f64::NAN), 0.0);
        assert_eq!(to_number(&f64::INFINITY), 0.0);
        assert_eq!(to_number(&7.25), 7.25);
    }

    #[test]
    fn currency_uses_indian_grouping() {
        assert_eq!(format_currency(&0.0), "₹0.00");
        assert_eq!(format_currency(&999.0), "₹999.00");
        assert_eq!(format_currency(&1000.0), "₹1,000.00");
        assert_eq!(format_currency(&100000.0), "₹1,00,000.00");
        assert_eq!(format_currency(&1234567.5), "₹12,34,567.50");
        assert_eq!(format_currency(&123456789.125), "₹12,34,56,789.13");
        assert_eq!(format_currency(&-1500.0), "-₹1,500.00");
        assert_eq!(format_currency("2,500"), "₹2,500.00");
        assert_eq!(format_currency("garbage"), "₹0.00");
    }

    #[test]
    fn half_paise_round_away_from_zero() {
        assert_eq!(format_currency(&34.425), "₹34.43");
        assert_eq!(format_currency(&1.005), "₹1.01");
        assert_eq!(format_currency(&1.035), "₹1.04");
        assert_eq!(format_currency(&-1.005), "-₹1.01");
        assert_eq!(format_currency(&0.004), "₹0.00");
    }

    #[test]
    fn quantity_drops_trailing_zeros() {
        assert_eq!(format_quantity(&5.0), "5");
        assert_eq!(format_quantity(&1.5), "1.5");
    }

    #[test]
    fn words_for_known_values() {
        assert_eq!(amount_in_words(&0.0), "Zero Rupees Only");
        assert_eq!(amount_in_words(&100.0), "One Hundred Rupees Only");
        assert_eq!(
            amount_in_words(&1234567.0),
            "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven Rupees Only"
        );
        assert_eq!(
            amount_in_words(&123456789.0),
            "Twelve Crore Thirty Four Lakh Fifty Six Thousand Seven Hundred Eighty Nine Rupees Only"
        );
        assert_eq!(amount_in_words(&20.0), "Twenty Rupees Only");
        assert_eq!(amount_in_words(&19.0), "Nineteen Rupees Only");
        assert_eq!(amount_in_words(&100001.0), "One Lakh One Rupees Only");
        assert_eq!(
            amount_in_words(&999999999.0),
            "Ninety Nine Crore Ninety Nine Lakh Ninety Nine Thousand Nine Hundred Ninety Nine Rupees Only"
        );
    }

    #[test]
    fn words_round_to_nearest_rupee() {
        assert_eq!(amount_in_words(&99.5), "One Hundred Rupees Only");
        assert_eq!(amount_in_words(&0.4), "Zero Rupees Only");
        assert_eq!(amount_in_words("1,000.2"), "One Thousand Rupees Only");
    }

    #[test]
    fn negative_amounts_read_as_zero() {
        assert_eq!(amount_in_words(&-250.0), "Zero Rupees Only");
    }

    #[test]
    fn large_crore_counts_are_spelled_out() {
        assert_eq!(
            amount_in_words(&1_500_000_000.0),
            "One Hundred Fifty Crore Rupees Only"
        );
    }

    // Reads the words back into a number so the property below can check
    // every grouping decision, not just the shape of the string.
    fn words_to_number(words: &str) -> u64 {
        let body = words.strip_suffix(" Rupees Only").expect("suffix");
        if body == "Zero" {
            return 0;
        }
        let small = |w: &str| -> Option<u64> {
            ONES.iter()
                .position(|o| !o.is_empty() && *o == w)
                .or_else(|| TENS.iter().position(|t| !t.is_empty() && *t == w).map(|p| p * 10))
                .map(|v| v as u64)
        };
        let mut total = 0u64;
        let mut current = 0u64;
        for word in body.split(' ') {
            match word {
                "Crore" => {
                    total += current * CRORE;
                    current = 0;
                }
                "Lakh" => {
                    total += current * LAKH;
                    current = 0;
                }
                "Thousand" => {
                    total += current * THOUSAND;
                    current = 0;
                }
                "Hundred" => current *= HUNDRED,
                other => current += small(other).expect("known word"),
            }
        }
        total + current
    }

    proptest! {
        #[test]
        fn words_read_back_to_the_same_amount(n in 0u64..1_000_000_000) {
            let words = amount_in_words(&(n as f64));
            prop_assert!(words.ends_with("Rupees Only"));
            prop_assert!(!words.contains("  "));
            prop_assert_eq!(words_to_number(&words), n);
        }

        #[test]
        fn to_number_is_always_finite(s in ".*") {
            prop_assert!(to_number(s.as_str()).is_finite());
        }
    }
}
