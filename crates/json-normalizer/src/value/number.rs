use std::fmt;

/// A JSON number.
///
/// Wraps [`serde_json::Number`], so with the `arbitrary-precision` feature enabled numbers keep the
/// exact textual form they were decoded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number(serde_json::Number);

impl Number {
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.0.as_u64()
    }
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.0.as_i64()
    }
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.0.as_f64()
    }
    /// Whether the number is representable as `u64` or `i64`.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.0.is_u64() || self.0.is_i64()
    }
    #[must_use]
    pub fn as_serde(&self) -> &serde_json::Number {
        &self.0
    }
}

impl From<serde_json::Number> for Number {
    fn from(value: serde_json::Number) -> Self {
        Number(value)
    }
}

impl From<Number> for serde_json::Number {
    fn from(value: Number) -> Self {
        value.0
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number(value.into())
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number(value.into())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::Number;

    #[test]
    fn integers() {
        let positive = Number::from(9000_u64);
        assert!(positive.is_integer());
        assert_eq!(positive.as_u64(), Some(9000));

        let negative = Number::from(-5_i64);
        assert!(negative.is_integer());
        assert_eq!(negative.as_i64(), Some(-5));
        assert_eq!(negative.as_u64(), None);
    }

    #[test]
    fn floats_are_not_integers() {
        let number: Number = serde_json::Number::from_f64(2.5)
            .expect("Finite float")
            .into();
        assert!(!number.is_integer());
        assert_eq!(number.to_string(), "2.5");
    }
}
