//! Fixed-width display formatting.
//!
//! Field widths are part of the report contract. `format_number` renders a
//! value right-justified
//! in exactly `len` characters with a sign gutter: the magnitude of a
//! negative number gets one character less, so `-x` and `x` always occupy
//! the same field width. `format_varname` abbreviates long names with a
//! middle ellipsis (`displacem~t`).

/// Render `x` right-justified in exactly `len` characters (missing is `.`).
pub fn format_number(x: f64, len: usize) -> String {
    format!("{:>len$}", render(x, len))
}

fn render(x: f64, len: usize) -> String {
    if x.is_nan() {
        return ".".to_string();
    }
    let negative = x < 0.0;
    let magnitude = x.abs();
    let budget = if negative { len.saturating_sub(1) } else { len };
    let body = if magnitude != 0.0 && (magnitude < 1e-4 || int_digits(magnitude) > budget) {
        scientific(magnitude, budget)
    } else {
        let s = fixed(magnitude, budget);
        // Rounding can carry into one more integer digit than the budget
        // holds (99999999.5 at budget 8 renders as 100000000).
        if s.len() > budget {
            scientific(magnitude, budget)
        } else {
            s
        }
    };
    if negative { format!("-{body}") } else { body }
}

fn int_digits(magnitude: f64) -> usize {
    if magnitude < 1.0 {
        1
    } else {
        magnitude.log10().floor() as usize + 1
    }
}

// Decimals fill whatever budget is left after the integer digits and the
// point; trailing zeros and a dangling point are trimmed afterwards.
fn fixed(magnitude: f64, budget: usize) -> String {
    let decimals = budget.saturating_sub(int_digits(magnitude) + 1);
    let mut s = format!("{magnitude:.decimals$}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

fn scientific(magnitude: f64, budget: usize) -> String {
    let mut exp = magnitude.log10().floor() as i32;
    // Leading digit, point, and `e±XX` leave budget − 6 mantissa decimals.
    let precision = budget.saturating_sub(6);
    let mut mantissa = format!("{:.precision$}", magnitude / 10f64.powi(exp));
    if mantissa.starts_with("10") {
        // Rounding carried into a second integer digit.
        exp += 1;
        mantissa = format!("{:.precision$}", magnitude / 10f64.powi(exp));
    }
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exp.abs())
}

/// Left-justify a variable name in `len` characters, abbreviating longer
/// names as `head~last`.
pub fn format_varname(name: &str, len: usize) -> String {
    format!("{:<len$}", abbreviate(name, len))
}

/// Right-justified variant used by the summarize table.
pub fn format_varname_right(name: &str, len: usize) -> String {
    format!("{:>len$}", abbreviate(name, len))
}

fn abbreviate(name: &str, len: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= len || len < 2 {
        return name.to_string();
    }
    let head: String = chars[..len - 2].iter().collect();
    format!("{head}~{}", chars[chars.len() - 1])
}

/// Thousands-separated integer for the describe header.
pub fn format_int_comma(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Center `text` in `width` columns (extra space goes to the right).
pub fn center(text: &str, width: usize) -> String {
    if text.len() >= width {
        return text.to_string();
    }
    let left = (width - text.len()) / 2;
    let right = width - text.len() - left;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_fill_eight_columns() {
        assert_eq!(format_number(3.5807, 8), "  3.5807");
        assert_eq!(format_number(4099.0, 8), "    4099");
        assert_eq!(format_number(0.0, 8), "       0");
        assert_eq!(format_number(0.5, 8), "     0.5");
    }

    #[test]
    fn sign_gutter_keeps_field_width() {
        let pos = format_number(3.5807, 8);
        let neg = format_number(-3.5807, 8);
        assert_eq!(pos.len(), 8);
        assert_eq!(neg.len(), 8);
        assert_eq!(neg, " -3.5807");
    }

    #[test]
    fn missing_renders_as_dot() {
        assert_eq!(format_number(f64::NAN, 8), "       .");
        assert_eq!(format_number(f64::NAN, 6), "     .");
    }

    #[test]
    fn long_fractions_are_truncated_to_the_budget() {
        assert_eq!(format_number(2.0 / 3.0, 8), "0.666667");
        assert_eq!(format_number(-2.0 / 3.0, 8), "-0.66667");
    }

    #[test]
    fn wide_magnitudes_switch_to_scientific() {
        assert_eq!(format_number(123456789.0, 8), "1.23e+08");
        assert_eq!(format_number(-123456789.0, 8), "-1.2e+08");
    }

    #[test]
    fn tiny_magnitudes_switch_to_scientific() {
        assert_eq!(format_number(0.0000123, 8), "1.23e-05");
        assert_eq!(format_number(0.0001, 8), "  0.0001");
    }

    #[test]
    fn fixed_rounding_carry_falls_back_to_scientific() {
        assert_eq!(format_number(99999999.5, 8), "1.00e+08");
        assert_eq!(format_number(-9999999.5, 8), "-1.0e+07");
        assert_eq!(format_number(99999999.4, 8), "99999999");
        for &x in &[99999999.5, -9999999.5, 99999999.4] {
            assert_eq!(format_number(x, 8).len(), 8);
        }
    }

    #[test]
    fn scientific_rounding_carry() {
        // 9.996e7 rounds to 10.00e+07 without the carry fixup.
        assert_eq!(format_number(99_960_000_000.0, 8), "1.00e+11");
    }

    #[test]
    fn round_trip_within_significant_digits() {
        for &x in &[3.5807, -3.5807, 4099.0, 0.0000123, 123456789.0, 2.0 / 3.0] {
            let parsed: f64 = format_number(x, 8).trim().parse().unwrap();
            let tolerance = (x.abs() * 1e-2).max(1e-9);
            assert!((parsed - x).abs() < tolerance, "{x} -> {parsed}");
        }
    }

    #[test]
    fn alternate_lengths() {
        assert_eq!(format_number(74.0, 9), "       74");
        assert_eq!(format_number(1.9, 6), "   1.9");
    }

    #[test]
    fn short_names_left_justified() {
        assert_eq!(format_varname("mpg", 12), "mpg         ");
        assert_eq!(format_varname("mpg", 12).len(), 12);
    }

    #[test]
    fn long_names_get_middle_ellipsis() {
        assert_eq!(format_varname("displacement", 8), "displa~t");
        assert_eq!(format_varname("gear_ratio_long", 12), "gear_ratio~g");
    }

    #[test]
    fn right_justified_variant() {
        assert_eq!(format_varname_right("mpg", 12), "         mpg");
        assert_eq!(format_varname_right("displacement", 8), "displa~t");
    }

    #[test]
    fn comma_grouping() {
        assert_eq!(format_int_comma(0), "0");
        assert_eq!(format_int_comma(74), "74");
        assert_eq!(format_int_comma(1000), "1,000");
        assert_eq!(format_int_comma(3182), "3,182");
        assert_eq!(format_int_comma(1234567), "1,234,567");
    }

    #[test]
    fn centering() {
        assert_eq!(center("ab", 6), "  ab  ");
        assert_eq!(center("abc", 6), " abc  ");
        assert_eq!(center("too wide", 4), "too wide");
    }
}
