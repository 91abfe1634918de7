/// Render an amount with thousands separators, e.g. `-1,000`
pub fn to_comma_separated<T: Into<i128>>(amount: T) -> String {
    let amount = amount.into();
    let digits = amount.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_amounts() {
        assert_eq!(to_comma_separated(0i64), "0");
        assert_eq!(to_comma_separated(999i64), "999");
        assert_eq!(to_comma_separated(1000i64), "1,000");
        assert_eq!(to_comma_separated(-1000i64), "-1,000");
        assert_eq!(to_comma_separated(-123i64), "-123");
        assert_eq!(to_comma_separated(-123_456i64), "-123,456");
        assert_eq!(to_comma_separated(1_000_000_000i64), "1,000,000,000");
        assert_eq!(to_comma_separated(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn test_unsigned_amounts() {
        assert_eq!(to_comma_separated(100u64), "100");
        assert_eq!(to_comma_separated(12_345u64), "12,345");
        assert_eq!(to_comma_separated(u64::MAX), "18,446,744,073,709,551,615");
    }
}
