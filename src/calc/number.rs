// number.rs

use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

use super::error::EvalError;

/// Integer results wider than this are refused instead of computed.
pub const MAX_INT_BITS: u64 = 1 << 20;

/// A calculator value. Integers are unbounded and stay exact until an
/// operation (true division, a float function) produces a float.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(BigInt),
    Float(f64),
}

impl Number {
    /// The value as a float. An integer past the `f64` range is an error
    /// rather than infinity.
    pub fn as_f64(&self) -> Result<f64, EvalError> {
        match self {
            Number::Int(i) => match i.to_f64() {
                Some(f) if f.is_finite() => Ok(f),
                _ => Err(EvalError::int_too_large()),
            },
            Number::Float(f) => Ok(*f),
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Number::Int(_) => true,
            Number::Float(f) => f.is_finite(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Int(i) => i.is_zero(),
            Number::Float(f) => *f == 0.0,
        }
    }

    /// Exact ordering, also between an integer and a float. `None` only
    /// when NaN is involved.
    pub fn compare(&self, other: &Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(b)),
            (Number::Int(a), Number::Float(b)) => compare_mixed(a, *b),
            (Number::Float(a), Number::Int(b)) => compare_mixed(b, *a).map(Ordering::reverse),
            (Number::Float(a), Number::Float(b)) => a.partial_cmp(b),
        }
    }

    /// Converts an integral float to `Int`, the way `floor`/`ceil`/`round`
    /// hand back integers.
    pub fn integral(value: f64) -> Result<Number, EvalError> {
        if value.is_nan() {
            return Err(EvalError::evaluation("cannot convert float NaN to integer"));
        }
        if value.is_infinite() {
            return Err(EvalError::evaluation("cannot convert float infinity to integer"));
        }
        BigInt::from_f64(value)
            .map(Number::Int)
            .ok_or_else(EvalError::overflow)
    }

    pub fn neg(&self) -> Number {
        match self {
            Number::Int(a) => Number::Int(-a),
            Number::Float(a) => Number::Float(-a),
        }
    }

    pub fn add(&self, rhs: &Number) -> Result<Number, EvalError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => Ok(Number::Int(a + b)),
            (a, b) => Ok(Number::Float(a.as_f64()? + b.as_f64()?)),
        }
    }

    pub fn sub(&self, rhs: &Number) -> Result<Number, EvalError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => Ok(Number::Int(a - b)),
            (a, b) => Ok(Number::Float(a.as_f64()? - b.as_f64()?)),
        }
    }

    pub fn mul(&self, rhs: &Number) -> Result<Number, EvalError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                if a.bits() + b.bits() > MAX_INT_BITS + 1 {
                    return Err(EvalError::overflow());
                }
                Ok(Number::Int(a * b))
            }
            (a, b) => Ok(Number::Float(a.as_f64()? * b.as_f64()?)),
        }
    }

    /// True division always yields a float.
    pub fn div(&self, rhs: &Number) -> Result<Number, EvalError> {
        if rhs.is_zero() {
            return Err(EvalError::division_by_zero());
        }
        Ok(Number::Float(self.as_f64()? / rhs.as_f64()?))
    }

    /// Floored division: the quotient rounds toward negative infinity.
    pub fn floor_div(&self, rhs: &Number) -> Result<Number, EvalError> {
        if rhs.is_zero() {
            return Err(EvalError::division_by_zero());
        }
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => Ok(Number::Int(a.div_floor(b))),
            (a, b) => Ok(Number::Float((a.as_f64()? / b.as_f64()?).floor())),
        }
    }

    /// Modulo whose result takes the sign of the divisor.
    pub fn rem(&self, rhs: &Number) -> Result<Number, EvalError> {
        if rhs.is_zero() {
            return Err(EvalError::division_by_zero());
        }
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => Ok(Number::Int(a.mod_floor(b))),
            (a, b) => {
                let (a, b) = (a.as_f64()?, b.as_f64()?);
                let mut r = a % b;
                if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                    r += b;
                }
                Ok(Number::Float(r))
            }
        }
    }

    pub fn pow(&self, rhs: &Number) -> Result<Number, EvalError> {
        if let (Number::Int(base), Number::Int(exp)) = (self, rhs) {
            if !exp.is_negative() {
                return int_pow(base, exp);
            }
        }
        let (base, exp) = (self.as_f64()?, rhs.as_f64()?);
        if base == 0.0 && exp < 0.0 {
            return Err(EvalError::evaluation(
                "0.0 cannot be raised to a negative power",
            ));
        }
        if base < 0.0 && exp.is_finite() && exp.fract() != 0.0 {
            return Err(EvalError::evaluation(
                "negative number cannot be raised to a fractional power",
            ));
        }
        let out = base.powf(exp);
        if out.is_infinite() && base.is_finite() && exp.is_finite() {
            return Err(EvalError::evaluation("numerical result out of range"));
        }
        Ok(Number::Float(out))
    }
}

fn int_pow(base: &BigInt, exp: &BigInt) -> Result<Number, EvalError> {
    // 0, 1 and -1 never grow, whatever the exponent
    if base.bits() <= 1 {
        let value: i64 = match base.sign() {
            Sign::NoSign if exp.is_zero() => 1,
            Sign::NoSign => 0,
            Sign::Minus if exp.is_odd() => -1,
            _ => 1,
        };
        return Ok(Number::from(value));
    }
    let exp = exp
        .to_u32()
        .filter(|&e| base.bits().saturating_mul(u64::from(e)) <= MAX_INT_BITS)
        .ok_or_else(EvalError::overflow)?;
    Ok(Number::Int(base.pow(exp)))
}

fn compare_mixed(int: &BigInt, float: f64) -> Option<Ordering> {
    if float.is_nan() {
        return None;
    }
    if float.is_infinite() {
        return Some(if float > 0.0 { Ordering::Less } else { Ordering::Greater });
    }
    let floor = float.floor();
    match int.cmp(&BigInt::from_f64(floor)?) {
        Ordering::Equal if float > floor => Some(Ordering::Less),
        ord => Some(ord),
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(BigInt::from(value))
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Number::Int(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => f.write_str(&float_repr(*x)),
        }
    }
}

/// Shortest round-trip digits. Decimal exponents from -4 to 15 print
/// positionally with a trailing `.0` when integral; anything else prints
/// as `1e+16` or `1.5e-07`.
fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    let sci = format!("{:e}", x);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    if (-4..16).contains(&exp) {
        let plain = x.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.unsigned_abs())
    }
}

// On disk a number is a plain JSON number. Integers beyond 64 bits have no
// exact JSON form in serde_json and are written as the nearest float.
impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Number::Int(i) => {
                if let Some(v) = i.to_i64() {
                    serializer.serialize_i64(v)
                } else if let Some(v) = i.to_u64() {
                    serializer.serialize_u64(v)
                } else {
                    serializer.serialize_f64(i.to_f64().unwrap_or(f64::NAN))
                }
            }
            Number::Float(x) => serializer.serialize_f64(*x),
        }
    }
}

struct NumberVisitor;

impl<'de> Visitor<'de> for NumberVisitor {
    type Value = Number;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Number, E> {
        Ok(Number::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Number, E> {
        Ok(Number::Int(BigInt::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Number, E> {
        Ok(Number::Float(v))
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumberVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> Number {
        Number::from(i)
    }

    fn big(digits: &str) -> Number {
        Number::Int(digits.parse().unwrap())
    }

    #[test]
    fn integer_ops_stay_integral() {
        assert_eq!(int(2).add(&int(3)).unwrap(), int(5));
        assert_eq!(int(2).pow(&int(10)).unwrap(), int(1024));
        assert_eq!(int(7).div(&int(2)).unwrap(), Number::Float(3.5));
    }

    #[test]
    fn floored_division_and_modulo_follow_divisor_sign() {
        assert_eq!(int(-7).floor_div(&int(2)).unwrap(), int(-4));
        assert_eq!(int(-7).rem(&int(2)).unwrap(), int(1));
        assert_eq!(int(7).rem(&int(-2)).unwrap(), int(-1));
        assert_eq!(Number::Float(-7.5).rem(&int(2)).unwrap(), Number::Float(0.5));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        for result in [
            int(1).div(&int(0)),
            int(1).floor_div(&int(0)),
            Number::Float(1.0).rem(&Number::Float(0.0)),
        ] {
            assert!(matches!(result, Err(EvalError::Evaluation(_))));
        }
    }

    #[test]
    fn integers_grow_past_64_bits() {
        assert_eq!(int(i64::MAX).add(&int(1)).unwrap(), big("9223372036854775808"));
        assert_eq!(int(2).pow(&int(64)).unwrap(), big("18446744073709551616"));
        assert_eq!(int(10).pow(&int(20)).unwrap(), big("100000000000000000000"));
        assert_eq!(
            int(i64::MIN).floor_div(&int(-1)).unwrap(),
            big("9223372036854775808")
        );
        assert_eq!(int(i64::MIN).neg(), big("9223372036854775808"));
    }

    #[test]
    fn unit_bases_ignore_huge_exponents() {
        let huge = big("100000000000000000000");
        assert_eq!(int(1).pow(&huge).unwrap(), int(1));
        assert_eq!(int(-1).pow(&huge).unwrap(), int(1));
        assert_eq!(int(0).pow(&huge).unwrap(), int(0));
        assert_eq!(int(0).pow(&int(0)).unwrap(), int(1));
    }

    #[test]
    fn oversized_integer_results_are_refused() {
        assert_eq!(int(2).pow(&int(10_000_000)), Err(EvalError::overflow()));
        assert_eq!(int(10).pow(&big("100000000000000000000")), Err(EvalError::overflow()));
    }

    #[test]
    fn integers_beyond_float_range_fail_to_convert() {
        let huge = int(10).pow(&int(400)).unwrap();
        assert_eq!(huge.as_f64(), Err(EvalError::int_too_large()));
        assert_eq!(huge.add(&Number::Float(1.0)), Err(EvalError::int_too_large()));
        assert!(huge.add(&int(1)).is_ok());
    }

    #[test]
    fn mixed_comparison_is_exact() {
        let above = int(2).pow(&int(53)).unwrap().add(&int(1)).unwrap();
        assert_eq!(above.compare(&Number::Float(2f64.powi(53))), Some(Ordering::Greater));
        assert_eq!(int(3).compare(&Number::Float(3.5)), Some(Ordering::Less));
        assert_eq!(Number::Float(3.0).compare(&int(3)), Some(Ordering::Equal));
        assert_eq!(int(1).compare(&Number::Float(f64::NAN)), None);
    }

    #[test]
    fn negative_integer_exponent_gives_float() {
        assert_eq!(int(2).pow(&int(-1)).unwrap(), Number::Float(0.5));
        assert!(int(0).pow(&int(-1)).is_err());
    }

    #[test]
    fn display_keeps_float_marker() {
        assert_eq!(Number::Float(4.0).to_string(), "4.0");
        assert_eq!(Number::Float(0.25).to_string(), "0.25");
        assert_eq!(int(4).to_string(), "4");
        assert_eq!(Number::Float(f64::INFINITY).to_string(), "inf");
        assert_eq!(Number::Float(-0.0).to_string(), "-0.0");
    }

    #[test]
    fn display_switches_to_exponent_form_at_the_edges() {
        assert_eq!(Number::Float(1e16).to_string(), "1e+16");
        assert_eq!(Number::Float(1e15).to_string(), "1000000000000000.0");
        assert_eq!(Number::Float(1e-7).to_string(), "1e-07");
        assert_eq!(Number::Float(0.0001).to_string(), "0.0001");
        assert_eq!(Number::Float(1.5e-5).to_string(), "1.5e-05");
        assert_eq!(Number::Float(-2.5e20).to_string(), "-2.5e+20");
        assert_eq!(Number::Float(1e300).to_string(), "1e+300");
        assert_eq!(Number::Float(123456.789).to_string(), "123456.789");
    }

    #[test]
    fn json_form_is_a_plain_number() {
        assert_eq!(serde_json::to_string(&int(5)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&Number::Float(2.5)).unwrap(), "2.5");
        assert_eq!(
            serde_json::to_string(&big("18446744073709551615")).unwrap(),
            "18446744073709551615"
        );
        assert_eq!(serde_json::from_str::<Number>("-7").unwrap(), int(-7));
        assert_eq!(serde_json::from_str::<Number>("7.0").unwrap(), Number::Float(7.0));
        assert!(serde_json::from_str::<Number>("\"7\"").is_err());
    }
}
