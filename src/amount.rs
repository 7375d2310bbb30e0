use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A signed monetary value. Stored as a `Decimal` so repeated sums never drift;
/// always displayed with two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(Decimal);

impl Amount {
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `None` when the result falls outside `Decimal`'s range.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sum<'a, I>(amounts: I) -> Option<Amount>
    where
        I: IntoIterator<Item = &'a Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::zero(), |acc, a| acc.checked_add(*a))
    }

    /// Recognize an amount as written in a ledger posting.
    ///
    /// Accepts `123.45`, `-123.45`, `+123.45`, `$123.45`, `$ 123.45`,
    /// `-$ 123.45`, `$-123.45` and `$ -123.45`. Whitespace is only allowed
    /// between the `$` and the number; anything else (`$- 123.45`,
    /// `$12 3.45`, a second decimal point) is not an amount.
    pub fn parse_ledger(raw: &str) -> Option<Amount> {
        let s = raw.trim();
        let mut chars = s.char_indices().peekable();
        let mut negative = false;
        let mut signed = false;

        if let Some(&(_, c)) = chars.peek() {
            if c == '-' || c == '+' {
                negative = c == '-';
                signed = true;
                chars.next();
            }
        }

        if let Some(&(_, '$')) = chars.peek() {
            chars.next();
            while let Some(&(_, ' ')) = chars.peek() {
                chars.next();
            }
        }

        if !signed {
            if let Some(&(_, c)) = chars.peek() {
                if c == '-' || c == '+' {
                    negative = c == '-';
                    chars.next();
                }
            }
        }

        let start = chars.peek().map(|&(i, _)| i)?;
        let number = &s[start..];
        let mut seen_point = false;
        let mut seen_digit = false;
        for c in number.chars() {
            match c {
                '0'..='9' => seen_digit = true,
                '.' if !seen_point => seen_point = true,
                _ => return None,
            }
        }
        if !seen_digit {
            return None;
        }

        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
        let int_part = if int_part.is_empty() { "0" } else { int_part };
        let normalized = if frac_part.is_empty() {
            int_part.to_string()
        } else {
            format!("{int_part}.{frac_part}")
        };
        let value = Decimal::from_str(&normalized).ok()?;
        Some(Amount(if negative { -value } else { value }))
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Amount)
    }
}

impl TryFrom<String> for Amount {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .map_err(|e| format!("invalid amount '{value}': {e}"))
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}
