//! The numeric tower: classification and promotion rules shared by the
//! reader (literal parsing) and the runtime (arithmetic primitives).
//!
//! Promotion order is integer -> rational -> real -> complex; the
//! arbitrary-precision variants (`BigInt`/`BigRat`/`BigFloat`) absorb
//! their machine-sized counterparts the same way. Exactness is
//! preserved only when every operand is exact.

use num_bigint::BigInt;
use num_complex::Complex64;
use num_rational::{BigRational, Rational64};
use num_traits::{ToPrimitive, Zero};
use std::fmt;

/// A single numeric-tower value. This is the payload carried by the
/// `Cell::Integer`/`Rational`/`Real`/`Complex`/`BigInt`/`BigRat`/`BigFloat`
/// variants, factored out so arithmetic code has one place to classify
/// and promote operands instead of matching on `Cell` directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Integer(i64),
    Rational(Rational64),
    Real(f64),
    Complex(Complex64),
    BigInt(BigInt),
    BigRat(BigRational),
    /// Arbitrary-precision float. This runtime does not ship a software
    /// bigfloat implementation (spec.md delegates bignum/bigfloat
    /// algorithms to "a standard arbitrary-precision library"); `BigFloat`
    /// is represented with `f64` storage and infinite-looking precision
    /// is simply not available. Kept as a distinct tag so `exact?`/
    /// `inexact?` and printing can tell it apart from `Real`.
    BigFloat(f64),
}

/// Rank in the promotion lattice: higher ranks absorb lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Integer,
    BigInt,
    Rational,
    BigRat,
    Real,
    BigFloat,
    Complex,
}

impl Number {
    fn rank(&self) -> Rank {
        match self {
            Number::Integer(_) => Rank::Integer,
            Number::BigInt(_) => Rank::BigInt,
            Number::Rational(_) => Rank::Rational,
            Number::BigRat(_) => Rank::BigRat,
            Number::Real(_) => Rank::Real,
            Number::BigFloat(_) => Rank::BigFloat,
            Number::Complex(_) => Rank::Complex,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(
            self,
            Number::Integer(_) | Number::Rational(_) | Number::BigInt(_) | Number::BigRat(_)
        )
    }

    pub fn is_inexact(&self) -> bool {
        !self.is_exact()
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Integer(n) => *n == 0,
            Number::Rational(r) => r.is_zero(),
            Number::Real(f) => *f == 0.0,
            Number::BigFloat(f) => *f == 0.0,
            Number::Complex(c) => c.re == 0.0 && c.im == 0.0,
            Number::BigInt(b) => b.is_zero(),
            Number::BigRat(b) => b.is_zero(),
        }
    }

    /// `complex?`/`real?` inspect the imaginary component, not the tag:
    /// a `Complex` with a zero imaginary part still classifies as both.
    pub fn is_real(&self) -> bool {
        match self {
            Number::Complex(c) => c.im == 0.0,
            _ => true,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Integer(n) => *n as f64,
            Number::Rational(r) => *r.numer() as f64 / *r.denom() as f64,
            Number::Real(f) | Number::BigFloat(f) => *f,
            Number::Complex(c) => c.re,
            Number::BigInt(b) => b.to_f64().unwrap_or(f64::NAN),
            Number::BigRat(b) => b.to_f64().unwrap_or(f64::NAN),
        }
    }

    /// Reduce a `Rational`/`BigRat` whose denominator is 1 back down to
    /// an `Integer`/`BigInt`, per spec §3's invariant.
    pub fn normalize(self) -> Number {
        match self {
            Number::Rational(r) if *r.denom() == 1 => Number::Integer(*r.numer()),
            Number::BigRat(r) if r.denom() == &BigInt::from(1) => Number::BigInt(r.numer().clone()),
            other => other,
        }
    }

    /// Promote a pair of operands to a common representation, returning
    /// the promoted pair and whether the result is exact.
    fn promote(a: Number, b: Number) -> (Number, Number) {
        let rank = a.rank().max(b.rank());
        (a.coerce_to(rank), b.coerce_to(rank))
    }

    fn coerce_to(self, rank: Rank) -> Number {
        if self.rank() >= rank {
            return self;
        }
        match rank {
            Rank::Integer => self,
            Rank::BigInt => match self {
                Number::Integer(n) => Number::BigInt(BigInt::from(n)),
                other => other,
            },
            Rank::Rational => match self {
                Number::Integer(n) => Number::Rational(Rational64::new(n, 1)),
                Number::BigInt(b) => Number::BigRat(BigRational::new(b, BigInt::from(1))),
                other => other,
            },
            Rank::BigRat => match self {
                Number::Integer(n) => Number::BigRat(BigRational::new(BigInt::from(n), BigInt::from(1))),
                Number::BigInt(b) => Number::BigRat(BigRational::new(b, BigInt::from(1))),
                Number::Rational(r) => {
                    Number::BigRat(BigRational::new(BigInt::from(*r.numer()), BigInt::from(*r.denom())))
                }
                other => other,
            },
            Rank::Real => Number::Real(self.to_f64()),
            Rank::BigFloat => Number::BigFloat(self.to_f64()),
            Rank::Complex => Number::Complex(Complex64::new(self.to_f64(), 0.0)),
        }
    }

    pub fn add(self, other: Number) -> Number {
        let (a, b) = Number::promote(self, other);
        match (a, b) {
            (Number::Integer(a), Number::Integer(b)) => match a.checked_add(b) {
                Some(sum) => Number::Integer(sum),
                None => Number::BigInt(BigInt::from(a) + BigInt::from(b)),
            },
            (Number::BigInt(a), Number::BigInt(b)) => Number::BigInt(a + b),
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a + b).normalize(),
            (Number::BigRat(a), Number::BigRat(b)) => Number::BigRat(a + b).normalize(),
            (Number::Real(a), Number::Real(b)) => Number::Real(a + b),
            (Number::BigFloat(a), Number::BigFloat(b)) => Number::BigFloat(a + b),
            (Number::Complex(a), Number::Complex(b)) => Number::Complex(a + b),
            _ => unreachable!("promote() guarantees matching ranks"),
        }
    }

    pub fn sub(self, other: Number) -> Number {
        let (a, b) = Number::promote(self, other);
        match (a, b) {
            (Number::Integer(a), Number::Integer(b)) => match a.checked_sub(b) {
                Some(diff) => Number::Integer(diff),
                None => Number::BigInt(BigInt::from(a) - BigInt::from(b)),
            },
            (Number::BigInt(a), Number::BigInt(b)) => Number::BigInt(a - b),
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a - b).normalize(),
            (Number::BigRat(a), Number::BigRat(b)) => Number::BigRat(a - b).normalize(),
            (Number::Real(a), Number::Real(b)) => Number::Real(a - b),
            (Number::BigFloat(a), Number::BigFloat(b)) => Number::BigFloat(a - b),
            (Number::Complex(a), Number::Complex(b)) => Number::Complex(a - b),
            _ => unreachable!("promote() guarantees matching ranks"),
        }
    }

    pub fn mul(self, other: Number) -> Number {
        let (a, b) = Number::promote(self, other);
        match (a, b) {
            (Number::Integer(a), Number::Integer(b)) => match a.checked_mul(b) {
                Some(prod) => Number::Integer(prod),
                None => Number::BigInt(BigInt::from(a) * BigInt::from(b)),
            },
            (Number::BigInt(a), Number::BigInt(b)) => Number::BigInt(a * b),
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a * b).normalize(),
            (Number::BigRat(a), Number::BigRat(b)) => Number::BigRat(a * b).normalize(),
            (Number::Real(a), Number::Real(b)) => Number::Real(a * b),
            (Number::BigFloat(a), Number::BigFloat(b)) => Number::BigFloat(a * b),
            (Number::Complex(a), Number::Complex(b)) => Number::Complex(a * b),
            _ => unreachable!("promote() guarantees matching ranks"),
        }
    }

    /// Returns `None` on division by zero so the caller can raise a
    /// `General`/`Value` scheme error with a primitive-specific message.
    pub fn div(self, other: Number) -> Option<Number> {
        if other.is_zero() && other.is_exact() {
            return None;
        }
        let (a, b) = Number::promote(self, other);
        Some(match (a, b) {
            (Number::Integer(a), Number::Integer(b)) => Number::Rational(Rational64::new(a, b)).normalize(),
            (Number::BigInt(a), Number::BigInt(b)) => {
                Number::BigRat(BigRational::new(a, b)).normalize()
            }
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a / b).normalize(),
            (Number::BigRat(a), Number::BigRat(b)) => Number::BigRat(a / b).normalize(),
            (Number::Real(a), Number::Real(b)) => Number::Real(a / b),
            (Number::BigFloat(a), Number::BigFloat(b)) => Number::BigFloat(a / b),
            (Number::Complex(a), Number::Complex(b)) => Number::Complex(a / b),
            _ => unreachable!("promote() guarantees matching ranks"),
        })
    }

    pub fn neg(self) -> Number {
        match self {
            Number::Integer(n) => n
                .checked_neg()
                .map(Number::Integer)
                .unwrap_or_else(|| Number::BigInt(-BigInt::from(n))),
            Number::BigInt(b) => Number::BigInt(-b),
            Number::Rational(r) => Number::Rational(-r),
            Number::BigRat(r) => Number::BigRat(-r),
            Number::Real(f) => Number::Real(-f),
            Number::BigFloat(f) => Number::BigFloat(-f),
            Number::Complex(c) => Number::Complex(-c),
        }
    }

    /// `(= a b)`: numeric equality across exactness (`(= 2 2.0)` is `#t`).
    pub fn num_eq(&self, other: &Number) -> bool {
        if matches!(self, Number::Complex(_)) || matches!(other, Number::Complex(_)) {
            return self.to_complex() == other.to_complex();
        }
        let (a, b) = Number::promote(self.clone(), other.clone());
        match (a, b) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (Number::BigInt(a), Number::BigInt(b)) => a == b,
            (Number::Rational(a), Number::Rational(b)) => a == b,
            (Number::BigRat(a), Number::BigRat(b)) => a == b,
            (Number::Real(a), Number::Real(b)) => a == b,
            (Number::BigFloat(a), Number::BigFloat(b)) => a == b,
            (Number::Complex(a), Number::Complex(b)) => a == b,
            _ => unreachable!("promote() guarantees matching ranks"),
        }
    }

    fn to_complex(&self) -> Complex64 {
        match self {
            Number::Complex(c) => *c,
            other => Complex64::new(other.to_f64(), 0.0),
        }
    }

    /// Total order for `<`/`<=`/`>`/`>=`; undefined (returns `None`) for
    /// non-real complex numbers, matching R7RS which only defines these
    /// comparisons over the reals.
    pub fn partial_cmp_num(&self, other: &Number) -> Option<std::cmp::Ordering> {
        if !self.is_real() || !other.is_real() {
            return None;
        }
        let (a, b) = Number::promote(self.clone(), other.clone());
        match (a, b) {
            (Number::Integer(a), Number::Integer(b)) => a.partial_cmp(&b),
            (Number::BigInt(a), Number::BigInt(b)) => a.partial_cmp(&b),
            (Number::Rational(a), Number::Rational(b)) => a.partial_cmp(&b),
            (Number::BigRat(a), Number::BigRat(b)) => a.partial_cmp(&b),
            (Number::Real(a), Number::Real(b)) => a.partial_cmp(&b),
            (Number::BigFloat(a), Number::BigFloat(b)) => a.partial_cmp(&b),
            (Number::Complex(a), Number::Complex(b)) => a.re.partial_cmp(&b.re),
            _ => unreachable!("promote() guarantees matching ranks"),
        }
    }

    /// `eqv?` on numbers additionally distinguishes exactness:
    /// `(eqv? 2 2.0)` is `#f` even though `(= 2 2.0)` is `#t`.
    pub fn eqv(&self, other: &Number) -> bool {
        self.is_exact() == other.is_exact() && self.num_eq(other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(n) => write!(f, "{n}"),
            Number::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Number::Real(n) | Number::BigFloat(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{n:.1}")
                } else {
                    write!(f, "{n}")
                }
            }
            Number::Complex(c) => {
                if c.im >= 0.0 {
                    write!(f, "{}+{}i", c.re, c.im)
                } else {
                    write!(f, "{}{}i", c.re, c.im)
                }
            }
            Number::BigInt(b) => write!(f, "{b}"),
            Number::BigRat(r) => write!(f, "{}/{}", r.numer(), r.denom()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_rational_addition_reduces() {
        let a = Number::Rational(Rational64::new(1, 2));
        let b = Number::Rational(Rational64::new(1, 3));
        let sum = a.add(b);
        assert_eq!(sum.to_string(), "5/6");
        assert!(sum.is_exact());
    }

    #[test]
    fn mixed_exactness_promotes_to_inexact() {
        let a = Number::Integer(1);
        let b = Number::Real(2.0);
        let sum = a.add(b);
        assert_eq!(sum, Number::Real(3.0));
    }

    #[test]
    fn complex_multiplication() {
        let a = Number::Integer(2);
        let b = Number::Complex(Complex64::new(1.0, 3.0));
        let prod = a.mul(b);
        assert_eq!(prod, Number::Complex(Complex64::new(2.0, 6.0)));
    }

    #[test]
    fn num_eq_ignores_exactness_but_eqv_does_not() {
        let a = Number::Integer(2);
        let b = Number::Real(2.0);
        assert!(a.num_eq(&b));
        assert!(!a.eqv(&b));
    }

    #[test]
    fn zero_imaginary_complex_is_real() {
        let c = Number::Complex(Complex64::new(3.0, 0.0));
        assert!(c.is_real());
    }

    #[test]
    fn integer_overflow_promotes_to_bigint() {
        let a = Number::Integer(i64::MAX);
        let b = Number::Integer(1);
        let sum = a.add(b);
        assert!(matches!(sum, Number::BigInt(_)));
        assert_eq!(sum.to_string(), (i64::MAX as i128 + 1).to_string());
    }

    #[test]
    fn division_by_exact_zero_is_none() {
        let a = Number::Integer(1);
        let b = Number::Integer(0);
        assert!(a.div(b).is_none());
    }

    #[test]
    fn rational_with_denominator_one_normalizes_to_integer() {
        let r = Number::Rational(Rational64::new(4, 2));
        assert_eq!(r.normalize(), Number::Integer(2));
    }
}
