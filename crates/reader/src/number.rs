//! Numeric-literal classification: turns a lexed `Number` token's text
//! into a `cozenage_core::Number`, honoring the `#e`/`#i` exactness and
//! `#b`/`#o`/`#d`/`#x` radix prefixes (spec §4.1/§4.2).

use cozenage_core::Number;
use num_bigint::BigInt;
use num_complex::Complex64;
use num_rational::Rational64;
use num_traits::Num;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exactness {
    Unspecified,
    Exact,
    Inexact,
}

pub fn parse_number(text: &str) -> Option<Number> {
    let (radix, exactness, rest) = strip_prefixes(text)?;
    if matches!(rest, "+inf.0" | "-inf.0" | "+nan.0" | "-nan.0") {
        let value = match rest {
            "+inf.0" => f64::INFINITY,
            "-inf.0" => f64::NEG_INFINITY,
            _ => f64::NAN,
        };
        return Some(Number::Real(value));
    }
    if let Some(stripped) = rest.strip_suffix('i') {
        return parse_complex(stripped, radix, exactness);
    }
    let parsed = parse_real(rest, radix)?;
    Some(apply_exactness(parsed, exactness))
}

fn strip_prefixes(text: &str) -> Option<(u32, Exactness, &str)> {
    let mut radix = 10;
    let mut exactness = Exactness::Unspecified;
    let mut rest = text;
    while rest.starts_with('#') {
        let mut chars = rest.chars();
        chars.next();
        let marker = chars.next()?;
        rest = &rest[2..];
        match marker.to_ascii_lowercase() {
            'b' => radix = 2,
            'o' => radix = 8,
            'd' => radix = 10,
            'x' => radix = 16,
            'e' => exactness = Exactness::Exact,
            'i' => exactness = Exactness::Inexact,
            _ => return None,
        }
    }
    Some((radix, exactness, rest))
}

fn parse_real(text: &str, radix: u32) -> Option<Number> {
    if let Some((numer, denom)) = text.split_once('/') {
        let numer = BigInt::from_str_radix(numer, radix).ok()?;
        let denom = BigInt::from_str_radix(denom, radix).ok()?;
        return Some(Number::BigRat(num_rational::BigRational::new(numer, denom)).normalize());
    }
    if radix == 10 && (text.contains('.') || text.contains(['e', 'E']) && !text.starts_with("0x")) {
        if let Ok(f) = text.parse::<f64>() {
            return Some(Number::Real(f));
        }
    }
    if let Ok(n) = i64::from_str_radix(text, radix) {
        return Some(Number::Integer(n));
    }
    if let Ok(big) = BigInt::from_str_radix(text, radix) {
        return Some(Number::BigInt(big));
    }
    None
}

fn parse_complex(text: &str, radix: u32, exactness: Exactness) -> Option<Number> {
    // Find the split between the real part and the imaginary part: the
    // last '+' or '-' not at position 0 and not part of an exponent.
    let bytes = text.as_bytes();
    let mut split = None;
    for i in (1..bytes.len()).rev() {
        let c = bytes[i] as char;
        if (c == '+' || c == '-') && !matches!(bytes[i - 1] as char, 'e' | 'E') {
            split = Some(i);
            break;
        }
    }
    let (re_text, im_text) = match split {
        Some(i) => (&text[..i], &text[i..]),
        None => ("0", text),
    };
    let im_text = if im_text == "+" {
        "1"
    } else if im_text == "-" {
        "-1"
    } else {
        im_text
    };
    let re = if re_text.is_empty() {
        0.0
    } else {
        parse_real(re_text, radix)?.to_f64()
    };
    let im = parse_real(im_text, radix)?.to_f64();
    let complex = Number::Complex(Complex64::new(re, im));
    Some(apply_exactness(complex, exactness))
}

fn apply_exactness(n: Number, exactness: Exactness) -> Number {
    match exactness {
        Exactness::Unspecified => n,
        Exactness::Inexact => match n {
            Number::Complex(_) => n,
            other => Number::Real(other.to_f64()),
        },
        Exactness::Exact => match n {
            Number::Real(f) => Rational64::approximate_float(f)
                .map(Number::Rational)
                .unwrap_or(Number::Real(f))
                .normalize(),
            other => other,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_integer() {
        assert_eq!(parse_number("42"), Some(Number::Integer(42)));
        assert_eq!(parse_number("-7"), Some(Number::Integer(-7)));
    }

    #[test]
    fn parses_rational() {
        match parse_number("1/2") {
            Some(Number::Rational(r)) => assert_eq!((*r.numer(), *r.denom()), (1, 2)),
            other => panic!("expected rational, got {other:?}"),
        }
    }

    #[test]
    fn parses_real() {
        assert_eq!(parse_number("3.14"), Some(Number::Real(3.14)));
    }

    #[test]
    fn parses_hex_radix_prefix() {
        assert_eq!(parse_number("#xFF"), Some(Number::Integer(255)));
    }

    #[test]
    fn parses_exact_prefix_converts_float_to_rational() {
        match parse_number("#e1.5") {
            Some(Number::Rational(r)) => assert_eq!((*r.numer(), *r.denom()), (3, 2)),
            other => panic!("expected exact rational, got {other:?}"),
        }
    }

    #[test]
    fn parses_inexact_prefix_converts_integer_to_real() {
        assert_eq!(parse_number("#i4"), Some(Number::Real(4.0)));
    }

    #[test]
    fn parses_infinities_and_nan() {
        assert!(matches!(parse_number("+inf.0"), Some(Number::Real(f)) if f.is_infinite() && f > 0.0));
        assert!(matches!(parse_number("+nan.0"), Some(Number::Real(f)) if f.is_nan()));
    }

    #[test]
    fn parses_complex_literal() {
        match parse_number("3+4i") {
            Some(Number::Complex(c)) => {
                assert_eq!(c.re, 3.0);
                assert_eq!(c.im, 4.0);
            }
            other => panic!("expected complex, got {other:?}"),
        }
    }

    #[test]
    fn parses_pure_imaginary() {
        match parse_number("+i") {
            Some(Number::Complex(c)) => {
                assert_eq!(c.re, 0.0);
                assert_eq!(c.im, 1.0);
            }
            other => panic!("expected complex, got {other:?}"),
        }
    }
}
