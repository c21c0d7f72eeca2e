pub mod overview;
pub mod panels;
pub mod prediction;

/// Round to a whole number and group thousands with commas: `1234567.8` → `1,234,568`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// Currency label used by the metric cards.
pub fn format_rupiah(value: f64) -> String {
    format!("Rp {}", format_thousands(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1234567.8), "1,234,568");
        assert_eq!(format_thousands(-45210.0), "-45,210");
        assert_eq!(format_rupiah(175.0), "Rp 175");
    }
}
