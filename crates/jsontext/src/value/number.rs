use core::fmt;
use std::hash::{Hash, Hasher};

/// A JSON number, classified by its literal form.
///
/// Literals without a fraction or exponent become [`Number::Int`]; everything
/// else becomes [`Number::Float`]. Equality compares numeric value, not
/// representation, so `Number::Int(1) == Number::Float(1.0)` holds by
/// contract.
#[derive(Debug, Copy, Clone)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Numeric value as an integer; floats truncate toward zero.
    pub fn as_i64(self) -> i64 {
        match self {
            Number::Int(i) => i,
            Number::Float(f) => f as i64,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::ser::write_number(f, *self)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Int(a), Number::Float(b)) | (Number::Float(b), Number::Int(a)) => {
                *a as f64 == *b
            }
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, h: &mut H) {
        // Hash through f64 so that equal values of different variants agree;
        // 0.0 and -0.0 compare equal and must hash alike.
        let f = self.as_f64();
        if f == 0.0f64 {
            0.0f64.to_bits().hash(h);
        } else {
            f.to_bits().hash(h);
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Int(i64::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Number::Int(1), Number::Float(1.0); "int equals float")]
    #[test_case(Number::Float(0.0), Number::Float(-0.0); "zero equals negative zero")]
    #[test_case(Number::Int(-5), Number::Float(-5.0); "negative int equals float")]
    fn cross_variant_equality(a: Number, b: Number) {
        assert_eq!(a, b);
        assert_eq!(b, a);
    }

    #[test_case(Number::Int(1), Number::Int(2); "different ints")]
    #[test_case(Number::Int(1), Number::Float(1.5); "int vs fraction")]
    #[test_case(Number::Float(f64::NAN), Number::Float(f64::NAN); "nan is never equal")]
    fn inequality(a: Number, b: Number) {
        assert_ne!(a, b);
    }

    #[test]
    fn equal_numbers_hash_alike() {
        fn hash_of(n: Number) -> u64 {
            use std::hash::{BuildHasher, Hasher};
            let mut hasher = ahash::RandomState::with_seeds(1, 2, 3, 4).build_hasher();
            n.hash(&mut hasher);
            hasher.finish()
        }
        assert_eq!(hash_of(Number::Int(7)), hash_of(Number::Float(7.0)));
        assert_eq!(
            hash_of(Number::Float(0.0)),
            hash_of(Number::Float(-0.0))
        );
    }

    #[test]
    fn truncating_narrowing() {
        assert_eq!(Number::Float(2.9).as_i64(), 2);
        assert_eq!(Number::Float(-2.9).as_i64(), -2);
        assert_eq!(Number::Int(41).as_f64(), 41.0);
    }
}
