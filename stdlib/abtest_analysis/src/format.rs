//! Display formatting for report values. Raw numbers stay canonical; these
//! only produce the strings shown to people.

/// `0.123` -> `"12.3%"` with `decimals` digits after the point.
pub fn percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

pub fn fixed(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

/// Integer with comma thousands separators: `12345` -> `"12,345"`.
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages() {
        assert_eq!(percent(0.1, 1), "10.0%");
        assert_eq!(percent(0.2, 1), "20.0%");
        assert_eq!(percent(-0.5, 1), "-50.0%");
        assert_eq!(percent(0.80169, 1), "80.2%");
    }

    #[test]
    fn fixed_decimals() {
        assert_eq!(fixed(0.04321, 4), "0.0432");
        assert_eq!(fixed(0.063982, 3), "0.064");
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }
}
