use std::fmt;

/// An amount in rupiah, displayed as `Rp 12,000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rupiah(pub u64);

impl fmt::Display for Rupiah {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        write!(fmt, "Rp {}", grouped)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(Rupiah(0).to_string(), "Rp 0");
        assert_eq!(Rupiah(999).to_string(), "Rp 999");
        assert_eq!(Rupiah(5000).to_string(), "Rp 5,000");
        assert_eq!(Rupiah(24000).to_string(), "Rp 24,000");
        assert_eq!(Rupiah(1234567).to_string(), "Rp 1,234,567");
    }
}
