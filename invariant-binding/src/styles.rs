//! Number style flags

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Elements permitted in a numeric string
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NumberStyles(u32);

impl NumberStyles {
    /// Digits only
    pub const NONE: Self = Self(0);
    /// Leading white space (U+0009 to U+000D, U+0020)
    pub const ALLOW_LEADING_WHITE: Self = Self(0x0001);
    /// Trailing white space
    pub const ALLOW_TRAILING_WHITE: Self = Self(0x0002);
    /// Leading `+` or `-`
    pub const ALLOW_LEADING_SIGN: Self = Self(0x0004);
    /// Trailing `+` or `-`
    pub const ALLOW_TRAILING_SIGN: Self = Self(0x0008);
    /// Surrounding parentheses for a negative number
    pub const ALLOW_PARENTHESES: Self = Self(0x0010);
    /// Decimal point `.`
    pub const ALLOW_DECIMAL_POINT: Self = Self(0x0020);
    /// Group separators `,` in the integral part
    pub const ALLOW_THOUSANDS: Self = Self(0x0040);
    /// Exponent notation (`e` or `E`, optional sign, digits)
    pub const ALLOW_EXPONENT: Self = Self(0x0080);

    /// Integral numbers
    pub const INTEGER: Self = Self(
        Self::ALLOW_LEADING_WHITE.0 | Self::ALLOW_TRAILING_WHITE.0 | Self::ALLOW_LEADING_SIGN.0,
    );
    /// Numbers with sign, decimal point and group separators
    pub const NUMBER: Self = Self(
        Self::INTEGER.0
            | Self::ALLOW_TRAILING_SIGN.0
            | Self::ALLOW_DECIMAL_POINT.0
            | Self::ALLOW_THOUSANDS.0,
    );
    /// Floating-point numbers
    pub const FLOAT: Self =
        Self(Self::INTEGER.0 | Self::ALLOW_DECIMAL_POINT.0 | Self::ALLOW_EXPONENT.0);
    /// Every style
    pub const ANY: Self = Self(
        Self::NUMBER.0 | Self::ALLOW_PARENTHESES.0 | Self::ALLOW_EXPONENT.0,
    );

    /// Raw flag bits
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every flag of `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Flags of both, usable in constants
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for NumberStyles {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for NumberStyles {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for NumberStyles {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for NumberStyles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(NumberStyles, &str); 8] = [
            (NumberStyles::ALLOW_LEADING_WHITE, "ALLOW_LEADING_WHITE"),
            (NumberStyles::ALLOW_TRAILING_WHITE, "ALLOW_TRAILING_WHITE"),
            (NumberStyles::ALLOW_LEADING_SIGN, "ALLOW_LEADING_SIGN"),
            (NumberStyles::ALLOW_TRAILING_SIGN, "ALLOW_TRAILING_SIGN"),
            (NumberStyles::ALLOW_PARENTHESES, "ALLOW_PARENTHESES"),
            (NumberStyles::ALLOW_DECIMAL_POINT, "ALLOW_DECIMAL_POINT"),
            (NumberStyles::ALLOW_THOUSANDS, "ALLOW_THOUSANDS"),
            (NumberStyles::ALLOW_EXPONENT, "ALLOW_EXPONENT"),
        ];

        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();

        if names.is_empty() {
            f.write_str("NumberStyles(NONE)")
        } else {
            write!(f, "NumberStyles({})", names.join(" | "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composites() {
        assert!(NumberStyles::FLOAT.contains(NumberStyles::ALLOW_EXPONENT));
        assert!(!NumberStyles::FLOAT.contains(NumberStyles::ALLOW_THOUSANDS));
        assert!(NumberStyles::NUMBER.contains(NumberStyles::ALLOW_THOUSANDS));
        assert!(NumberStyles::ANY.contains(NumberStyles::FLOAT | NumberStyles::NUMBER));
        assert!(NumberStyles::NONE.contains(NumberStyles::NONE));
    }

    #[test]
    fn test_debug_lists_flags() {
        let styles = NumberStyles::ALLOW_LEADING_SIGN | NumberStyles::ALLOW_DECIMAL_POINT;
        assert_eq!(
            format!("{:?}", styles),
            "NumberStyles(ALLOW_LEADING_SIGN | ALLOW_DECIMAL_POINT)"
        );
        assert_eq!(format!("{:?}", NumberStyles::NONE), "NumberStyles(NONE)");
    }
}
