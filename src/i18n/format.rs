// SPDX-License-Identifier: MPL-2.0
//! Locale-aware number formatting for dashboard figures.
//!
//! Both supported locales share the same conventions: `,` groups thousands,
//! `.` separates fractions, plain decimals keep at most two fraction digits
//! and percentages always show exactly two.

use super::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NumberFormat {
    group_separator: char,
    decimal_separator: char,
    max_fraction_digits: usize,
    percent_fraction_digits: usize,
}

const STANDARD: NumberFormat = NumberFormat {
    group_separator: ',',
    decimal_separator: '.',
    max_fraction_digits: 2,
    percent_fraction_digits: 2,
};

fn number_format(locale: Locale) -> NumberFormat {
    match locale {
        Locale::ZhCn | Locale::EnUs => STANDARD,
    }
}

/// Formats `value` with grouping and up to two fraction digits.
pub fn format_decimal(locale: Locale, value: f64) -> String {
    let format = number_format(locale);
    render(&format, value, 0, format.max_fraction_digits)
}

/// Formats a ratio (`0.1234`) as a percentage (`12.34%`).
pub fn format_percent(locale: Locale, ratio: f64) -> String {
    let format = number_format(locale);
    let digits = format.percent_fraction_digits;
    let mut rendered = render(&format, ratio * 100.0, digits, digits);
    rendered.push('%');
    rendered
}

fn render(format: &NumberFormat, value: f64, min_fraction: usize, max_fraction: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-∞" } else { "∞" }.to_string();
    }

    let fixed = format!("{:.*}", max_fraction, value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut fraction = fraction.to_string();
    while fraction.len() > min_fraction && fraction.ends_with('0') {
        fraction.pop();
    }

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 2);
    let rounds_to_zero = integer.chars().all(|c| c == '0') && fraction.chars().all(|c| c == '0');
    if value < 0.0 && !rounds_to_zero {
        out.push('-');
    }
    push_grouped(&mut out, integer, format.group_separator);
    if !fraction.is_empty() {
        out.push(format.decimal_separator);
        out.push_str(&fraction);
    }
    out
}

fn push_grouped(out: &mut String, digits: &str, separator: char) {
    let len = digits.len();
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(digit);
    }
}
