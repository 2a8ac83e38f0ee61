//! Layout of numeric literals: rounding, repeating digits, digit grouping
//! and scientific notation.
use crate::ast::Numeral;
use crate::error::Error;
use std::fs::File;
use std::io::Read;

/// Longest block of digits considered when looking for a repetition
const MAX_REPEAT_BLOCK: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    Auto,
    Engineering,
    On,
}

impl Default for Notation {
    fn default() -> Notation {
        Notation::Auto
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FormatOptions {
    /// Significant digits
    pub precision: usize,
    pub decimal_marker: String,
    /// Inserted between groups of three digits. Empty disables grouping.
    pub group_separator: String,
    pub product: String,
    pub exponent_product: String,
    /// Empty renders `10^{e}`, otherwise the compact `<marker>e` form
    pub exponent_marker: String,
    pub scientific_notation: Notation,
    pub begin_repeating_digits: String,
    pub end_repeating_digits: String,
    pub ellipsis: String,
}

impl Default for FormatOptions {
    fn default() -> FormatOptions {
        FormatOptions {
            precision: 14,
            decimal_marker: ".".to_string(),
            group_separator: "\\, ".to_string(),
            product: "\\cdot ".to_string(),
            exponent_product: "\\cdot ".to_string(),
            exponent_marker: "".to_string(),
            scientific_notation: Notation::Auto,
            begin_repeating_digits: "\\overline{".to_string(),
            end_repeating_digits: "}".to_string(),
            ellipsis: "\\ldots".to_string(),
        }
    }
}

impl FormatOptions {
    pub fn load(filename: &str) -> Result<FormatOptions, Error> {
        let file = File::open(filename)?;
        FormatOptions::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<FormatOptions, Error> {
        Ok(serde_yaml::from_reader(reader)?)
    }
}

/// Formats a literal, keeping exact fractions as fractions.
pub fn format_numeral(num: &Numeral, options: &FormatOptions) -> String {
    match num {
        Numeral::Float(value) => format(*value, options),
        Numeral::Exact(text) => match format_fraction(text) {
            Some(fraction) => fraction,
            None => format(num.value(), options),
        },
    }
}

pub fn format(value: f64, options: &FormatOptions) -> String {
    if value.is_nan() {
        return "\\mathrm{NaN}".to_string();
    }
    if value.is_infinite() {
        let infinity = if value < 0.0 { "-\\infty" } else { "\\infty" };
        return infinity.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let precision = options.precision.max(1);
    let (digits, exponent, truncated) = round(value.abs(), precision);

    let shift = match options.scientific_notation {
        Notation::Auto if exponent > -7 && exponent < precision as i32 => 0,
        Notation::Auto | Notation::On => exponent,
        Notation::Engineering => exponent.div_euclid(3) * 3,
    };
    let (integer, fraction) = split_at_point(&digits, exponent - shift + 1);

    let mut text = String::from(sign);
    text.push_str(&group_integer(&integer, &options.group_separator));
    if !fraction.is_empty() {
        text.push_str(&options.decimal_marker);
        text.push_str(&format_fraction_digits(&fraction, truncated, options));
    } else if truncated {
        text.push_str(&options.ellipsis);
    }
    if shift != 0 {
        if options.exponent_marker.is_empty() {
            text.push_str(&format!("{}10^{{{}}}", options.exponent_product, shift));
        } else {
            text.push_str(&format!("{}{}", options.exponent_marker, shift));
        }
    }
    text
}

/// Significant digits without trailing zeros, decimal exponent and whether rounding lost information
fn round(value: f64, precision: usize) -> (String, i32, bool) {
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };
    let mut digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }
    // Binary noise below the last digit vanishes with the trailing zeros
    let truncated = digits.len() >= precision
        && scientific.parse::<f64>().map_or(false, |rounded| rounded != value);
    (digits, exponent, truncated)
}

/// Places the decimal point after `point` digits, padding with zeros where needed
fn split_at_point(digits: &str, point: i32) -> (String, String) {
    if point <= 0 {
        let zeros = "0".repeat((-point) as usize);
        ("0".to_string(), zeros + digits)
    } else if point as usize >= digits.len() {
        let zeros = "0".repeat(point as usize - digits.len());
        (digits.to_string() + &zeros, String::new())
    } else {
        let (integer, fraction) = digits.split_at(point as usize);
        (integer.to_string(), fraction.to_string())
    }
}

fn format_fraction_digits(fraction: &str, truncated: bool, options: &FormatOptions) -> String {
    let separator = &options.group_separator;
    if truncated {
        // The last digit is rounded and does not take part in the period
        if let Some((offset, block)) = find_repetition(&fraction[..fraction.len() - 1]) {
            return format!(
                "{}{}{}{}",
                group_fraction(offset, separator),
                options.begin_repeating_digits,
                group_fraction(block, separator),
                options.end_repeating_digits
            );
        }
        return group_fraction(fraction, separator) + &options.ellipsis;
    }
    group_fraction(fraction, separator)
}

/// Earliest offset and shortest block whose periodic extension reproduces the digits.
/// The block has to appear at least twice and the periodic tail must span three digits.
pub fn find_repetition(digits: &str) -> Option<(&str, &str)> {
    let len = digits.len();
    for offset in 0..len {
        let tail = &digits[offset..];
        if tail.len() < 3 {
            break;
        }
        for block_len in 1..=MAX_REPEAT_BLOCK.min(tail.len() / 2) {
            let block = &tail[..block_len];
            let periodic = tail
                .as_bytes()
                .iter()
                .enumerate()
                .all(|(i, digit)| *digit == block.as_bytes()[i % block_len]);
            if periodic {
                return Some((&digits[..offset], block));
            }
        }
    }
    None
}

/// Separates groups of three digits counted from the decimal point leftwards
pub fn group_integer(digits: &str, separator: &str) -> String {
    if separator.is_empty() {
        return digits.to_string();
    }
    let mut grouped = String::new();
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(digit);
    }
    grouped
}

/// Separates groups of three digits counted from the decimal point rightwards
pub fn group_fraction(digits: &str, separator: &str) -> String {
    if separator.is_empty() {
        return digits.to_string();
    }
    let mut grouped = String::new();
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(digit);
    }
    grouped
}

/// Renders `a/b` reduced to lowest terms, `None` if the text is not a fraction
pub fn format_fraction(text: &str) -> Option<String> {
    let (numerator, denominator) = text.split_once('/')?;
    let numerator = numerator.trim();
    let (sign, numerator) = match numerator.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", numerator.strip_prefix('+').unwrap_or(numerator)),
    };
    let numerator: u64 = numerator.trim().parse().ok()?;
    let denominator: u64 = denominator.trim().parse().ok()?;
    if denominator == 0 {
        return Some(format!("{}\\frac{{{}}}{{0}}", sign, numerator));
    }
    if numerator == 0 {
        return Some("0".to_string());
    }
    let divisor = gcd(numerator, denominator);
    let (numerator, denominator) = (numerator / divisor, denominator / divisor);
    if denominator == 1 {
        Some(format!("{}{}", sign, numerator))
    } else {
        Some(format!("{}\\frac{{{}}}{{{}}}", sign, numerator, denominator))
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[cfg(test)]
mod specs {
    use super::*;
    use stringreader::StringReader;

    fn plain() -> FormatOptions {
        FormatOptions {
            group_separator: "".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn one_third_repeats() {
        assert_eq!(
            format(1.0 / 3.0, &FormatOptions::default()),
            "0.\\overline{3}"
        );
    }

    #[test]
    fn repetition_after_offset() {
        assert_eq!(format(1.0 / 6.0, &plain()), "0.1\\overline{6}");
        assert_eq!(format(1.0 / 7.0, &plain()), "0.\\overline{142857}");
        assert_eq!(format(-2.0 / 3.0, &plain()), "-0.\\overline{6}");
    }

    #[test]
    fn grouping() {
        let options = FormatOptions {
            group_separator: ",".to_string(),
            ..Default::default()
        };
        assert_eq!(format(1234567.0, &options), "1,234,567");
        assert_eq!(format(123.0, &options), "123");
        assert_eq!(format(0.123456, &options), "0.123,456");
    }

    #[test]
    fn exact_values() {
        assert_eq!(format(0.5, &plain()), "0.5");
        assert_eq!(format(-42.0, &plain()), "-42");
        assert_eq!(format(0.0, &plain()), "0");
        assert_eq!(format(0.001, &plain()), "0.001");
    }

    #[test]
    fn truncated_without_repetition() {
        assert_eq!(
            format(std::f64::consts::PI, &plain()),
            "3.1415926535898\\ldots"
        );
    }

    #[test]
    fn float_noise_is_not_truncation() {
        assert_eq!(format(0.1 + 0.2, &FormatOptions::default()), "0.3");
        assert_eq!(format(0.1 + 0.7, &plain()), "0.8");
        assert_eq!(format(1.1 * 1.1, &plain()), "1.21");
    }

    #[test]
    fn truncated_integer_part() {
        assert_eq!(format(12345678901234.7, &plain()), "12345678901235\\ldots");
        assert_eq!(
            format(12345678901234.7, &FormatOptions::default()),
            "12\\, 345\\, 678\\, 901\\, 235\\ldots"
        );
        assert_eq!(format(12345678901234.0, &plain()), "12345678901234");
    }

    #[test]
    fn scientific_auto() {
        assert_eq!(format(1e20, &plain()), "1\\cdot 10^{20}");
        assert_eq!(format(1.5e-8, &plain()), "1.5\\cdot 10^{-8}");
        let options = FormatOptions {
            exponent_marker: "\\mathrm{e}".to_string(),
            ..plain()
        };
        assert_eq!(format(2.5e30, &options), "2.5\\mathrm{e}30");
    }

    #[test]
    fn scientific_on() {
        let options = FormatOptions {
            scientific_notation: Notation::On,
            ..plain()
        };
        assert_eq!(format(1234.5, &options), "1.2345\\cdot 10^{3}");
        assert_eq!(format(5.0, &options), "5");
    }

    #[test]
    fn engineering() {
        let options = FormatOptions {
            scientific_notation: Notation::Engineering,
            ..plain()
        };
        assert_eq!(format(12345.0, &options), "12.345\\cdot 10^{3}");
        assert_eq!(format(0.001234, &options), "1.234\\cdot 10^{-3}");
        assert_eq!(format(42.0, &options), "42");
    }

    #[test]
    fn non_finite() {
        assert_eq!(format(f64::NAN, &plain()), "\\mathrm{NaN}");
        assert_eq!(format(f64::INFINITY, &plain()), "\\infty");
        assert_eq!(format(f64::NEG_INFINITY, &plain()), "-\\infty");
    }

    #[test]
    fn fractions() {
        assert_eq!(format_fraction("6/8"), Some("\\frac{3}{4}".to_string()));
        assert_eq!(format_fraction("-4/2"), Some("-2".to_string()));
        assert_eq!(format_fraction("0/5"), Some("0".to_string()));
        assert_eq!(format_fraction("3/0"), Some("\\frac{3}{0}".to_string()));
        assert_eq!(format_fraction("0.5"), None);
        assert_eq!(
            format_numeral(&Numeral::Exact("0.25".to_string()), &plain()),
            "0.25"
        );
    }

    #[test]
    fn repetition_search() {
        assert_eq!(find_repetition("1666666"), Some(("1", "6")));
        assert_eq!(find_repetition("123123123"), Some(("", "123")));
        assert_eq!(find_repetition("1244"), None);
        assert_eq!(find_repetition("12345"), None);
    }

    #[test]
    fn load_from_yaml() {
        let reader = StringReader::new(
            r#"
            precision: 6
            group-separator: ","
            scientific-notation: engineering
            "#,
        );
        let options = FormatOptions::from_reader(reader).unwrap();
        assert_eq!(options.precision, 6);
        assert_eq!(options.group_separator, ",");
        assert_eq!(options.scientific_notation, Notation::Engineering);
        assert_eq!(options.decimal_marker, ".");
    }
}
