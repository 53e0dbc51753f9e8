// allowlist.rs
//
// The closed set of names an expression may reference. Built once per
// process and only ever read afterwards.

use itertools::Itertools;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};
use std::collections::HashMap;
use std::f64::consts::{E, LN_2, PI, TAU};
use std::fmt;
use std::sync::LazyLock;

use super::error::EvalError;
use super::number::{Number, MAX_INT_BITS};

type NativeFn = Box<dyn Fn(&[Number]) -> Result<Number, EvalError> + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Between(usize, usize),
    AtLeast(usize),
}

impl Arity {
    fn check(self, name: &str, given: usize) -> Result<(), EvalError> {
        let (ok, expected) = match self {
            Arity::Exact(n) => (given == n, format!("exactly {}", n)),
            Arity::Between(lo, hi) => (
                (lo..=hi).contains(&given),
                format!("from {} to {}", lo, hi),
            ),
            Arity::AtLeast(n) => (given >= n, format!("at least {}", n)),
        };
        if ok {
            return Ok(());
        }
        let plural = if expected.ends_with(" 1") { "" } else { "s" };
        Err(EvalError::evaluation(format!(
            "{}() takes {} argument{} ({} given)",
            name, expected, plural, given
        )))
    }
}

pub struct Function {
    name: &'static str,
    arity: Arity,
    call: NativeFn,
}

impl Function {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, args: &[Number]) -> Result<Number, EvalError> {
        self.arity.check(self.name, args.len())?;
        (self.call)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name)
    }
}

#[derive(Debug)]
pub enum Symbol {
    Const(Number),
    Func(Function),
}

#[derive(Debug)]
pub struct AllowList {
    symbols: HashMap<&'static str, Symbol>,
}

static STANDARD: LazyLock<AllowList> = LazyLock::new(AllowList::standard);

/// The process-wide allow-list.
pub fn global() -> &'static AllowList {
    &STANDARD
}

impl AllowList {
    /// Math constants and functions plus `abs`, `round`, `min`, `max`.
    pub fn standard() -> Self {
        let mut list = AllowList {
            symbols: HashMap::new(),
        };

        list.constant("pi", PI);
        list.constant("e", E);
        list.constant("tau", TAU);
        list.constant("inf", f64::INFINITY);
        list.constant("nan", f64::NAN);
        list.int_constant("True", 1);
        list.int_constant("False", 0);

        list.unary("acos", f64::acos, EvalError::domain);
        list.unary("acosh", f64::acosh, EvalError::domain);
        list.unary("asin", f64::asin, EvalError::domain);
        list.unary("asinh", f64::asinh, EvalError::domain);
        list.unary("atan", f64::atan, EvalError::domain);
        list.unary("atanh", f64::atanh, EvalError::domain);
        list.unary("cbrt", f64::cbrt, EvalError::range);
        list.unary("cos", f64::cos, EvalError::domain);
        list.unary("cosh", f64::cosh, EvalError::range);
        list.unary("degrees", f64::to_degrees, EvalError::range);
        list.unary("erf", libm::erf, EvalError::range);
        list.unary("erfc", libm::erfc, EvalError::range);
        list.unary("exp", f64::exp, EvalError::range);
        list.unary("exp2", f64::exp2, EvalError::range);
        list.unary("expm1", f64::exp_m1, EvalError::range);
        list.unary("fabs", f64::abs, EvalError::range);
        list.unary("log10", f64::log10, EvalError::domain);
        list.unary("log1p", f64::ln_1p, EvalError::domain);
        list.unary("log2", f64::log2, EvalError::domain);
        list.unary("radians", f64::to_radians, EvalError::range);
        list.unary("sin", f64::sin, EvalError::domain);
        list.unary("sinh", f64::sinh, EvalError::range);
        list.unary("sqrt", f64::sqrt, EvalError::domain);
        list.unary("tan", f64::tan, EvalError::domain);
        list.unary("tanh", f64::tanh, EvalError::domain);
        list.unary("ulp", ulp, EvalError::range);

        list.predicate("isfinite", f64::is_finite);
        list.predicate("isinf", f64::is_infinite);
        list.predicate("isnan", f64::is_nan);

        list.binary("atan2", f64::atan2);
        list.binary("copysign", f64::copysign);
        list.binary("fmod", |x, y| x % y);
        list.binary("nextafter", next_after);

        list.function("ceil", Arity::Exact(1), |args| to_integral(&args[0], f64::ceil));
        list.function("floor", Arity::Exact(1), |args| to_integral(&args[0], f64::floor));
        list.function("trunc", Arity::Exact(1), |args| to_integral(&args[0], f64::trunc));
        list.function("gamma", Arity::Exact(1), |args| gamma(args[0].as_f64()?));
        list.function("lgamma", Arity::Exact(1), |args| lgamma(args[0].as_f64()?));
        list.function("log", Arity::Between(1, 2), log);
        list.function("pow", Arity::Exact(2), math_pow);
        list.function("remainder", Arity::Exact(2), remainder);
        list.function("ldexp", Arity::Exact(2), ldexp);
        list.function("hypot", Arity::AtLeast(0), |args| {
            let out = args
                .iter()
                .try_fold(0.0, |acc: f64, x| x.as_f64().map(|x| acc.hypot(x)))?;
            Ok(Number::Float(out))
        });
        list.function("factorial", Arity::Exact(1), factorial);
        list.function("gcd", Arity::AtLeast(0), gcd);
        list.function("lcm", Arity::AtLeast(0), lcm);
        list.function("comb", Arity::Exact(2), comb);
        list.function("perm", Arity::Between(1, 2), perm);
        list.function("isqrt", Arity::Exact(1), isqrt);

        list.function("abs", Arity::Exact(1), |args| match &args[0] {
            Number::Int(i) => Ok(Number::Int(i.abs())),
            Number::Float(f) => Ok(Number::Float(f.abs())),
        });
        list.function("round", Arity::Between(1, 2), round);
        list.function("min", Arity::AtLeast(2), |args| {
            Ok(pick(args, std::cmp::Ordering::Less))
        });
        list.function("max", Arity::AtLeast(2), |args| {
            Ok(pick(args, std::cmp::Ordering::Greater))
        });

        list
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Allowed names in alphabetical order.
    pub fn names(&self) -> Vec<&'static str> {
        self.symbols.keys().copied().sorted().collect()
    }

    fn constant(&mut self, name: &'static str, value: f64) {
        self.symbols.insert(name, Symbol::Const(Number::Float(value)));
    }

    fn int_constant(&mut self, name: &'static str, value: i64) {
        self.symbols.insert(name, Symbol::Const(Number::from(value)));
    }

    fn function<F>(&mut self, name: &'static str, arity: Arity, call: F)
    where
        F: Fn(&[Number]) -> Result<Number, EvalError> + Send + Sync + 'static,
    {
        self.symbols.insert(
            name,
            Symbol::Func(Function {
                name,
                arity,
                call: Box::new(call),
            }),
        );
    }

    fn unary(&mut self, name: &'static str, f: fn(f64) -> f64, on_overflow: fn() -> EvalError) {
        self.function(name, Arity::Exact(1), move |args| {
            let x = args[0].as_f64()?;
            checked(f(x), &[x], on_overflow)
        });
    }

    /// Float tests answer with the integers 1 and 0.
    fn predicate(&mut self, name: &'static str, f: fn(f64) -> bool) {
        self.function(name, Arity::Exact(1), move |args| {
            Ok(Number::from(i64::from(f(args[0].as_f64()?))))
        });
    }

    fn binary(&mut self, name: &'static str, f: fn(f64, f64) -> f64) {
        self.function(name, Arity::Exact(2), move |args| {
            let (x, y) = (args[0].as_f64()?, args[1].as_f64()?);
            checked(f(x, y), &[x, y], EvalError::range)
        });
    }
}

/// NaN out of non-NaN input is a domain error; infinity out of finite
/// input is reported through `on_overflow`.
fn checked(out: f64, inputs: &[f64], on_overflow: fn() -> EvalError) -> Result<Number, EvalError> {
    if out.is_nan() && !inputs.iter().any(|x| x.is_nan()) {
        return Err(EvalError::domain());
    }
    if out.is_infinite() && inputs.iter().all(|x| x.is_finite()) {
        return Err(on_overflow());
    }
    Ok(Number::Float(out))
}

fn int_arg<'a>(name: &str, value: &'a Number) -> Result<&'a BigInt, EvalError> {
    match value {
        Number::Int(i) => Ok(i),
        Number::Float(_) => Err(EvalError::evaluation(format!(
            "{}() requires integer arguments, got float",
            name
        ))),
    }
}

fn non_negative<'a>(name: &str, value: &'a Number) -> Result<&'a BigInt, EvalError> {
    let n = int_arg(name, value)?;
    if n.is_negative() {
        return Err(EvalError::evaluation(format!(
            "{}() not defined for negative values",
            name
        )));
    }
    Ok(n)
}

/// Clamps to the `i64` range; callers only need to know "very large".
fn saturate(value: &BigInt) -> i64 {
    value
        .to_i64()
        .unwrap_or(if value.is_negative() { i64::MIN } else { i64::MAX })
}

/// Fails once a running product passes [`MAX_INT_BITS`].
fn grow(acc: &BigInt) -> Result<(), EvalError> {
    if acc.bits() > MAX_INT_BITS {
        return Err(EvalError::overflow());
    }
    Ok(())
}

/// Rough bit width of n!/(n-k)!, divided by k! when `choose` is set. Only
/// used to refuse products far past [`MAX_INT_BITS`] before computing them.
fn product_bits(n: &BigInt, k: u64, choose: bool) -> f64 {
    let k = k as f64;
    let ln = match n.to_f64().filter(|&n| n <= 2f64.powi(53)) {
        Some(n) => lgamma_raw(n + 1.0) - lgamma_raw(n - k + 1.0),
        None if k > MAX_INT_BITS as f64 => f64::INFINITY,
        // every factor is at least 2^(bits - 2) here
        None => k * n.bits().saturating_sub(2) as f64 * LN_2,
    };
    let ln = if choose { ln - lgamma_raw(k + 1.0) } else { ln };
    ln / LN_2
}

fn refuse_wide(bits: f64) -> Result<(), EvalError> {
    if bits > MAX_INT_BITS as f64 + 128.0 {
        return Err(EvalError::overflow());
    }
    Ok(())
}

fn to_integral(value: &Number, f: fn(f64) -> f64) -> Result<Number, EvalError> {
    match value {
        Number::Int(_) => Ok(value.clone()),
        Number::Float(x) => Number::integral(f(*x)),
    }
}

fn pick(args: &[Number], wanted: std::cmp::Ordering) -> Number {
    let mut best = &args[0];
    for candidate in &args[1..] {
        if candidate.compare(best) == Some(wanted) {
            best = candidate;
        }
    }
    best.clone()
}

fn round(args: &[Number]) -> Result<Number, EvalError> {
    let Some(ndigits) = args.get(1) else {
        return match &args[0] {
            Number::Int(_) => Ok(args[0].clone()),
            Number::Float(x) => Number::integral(x.round_ties_even()),
        };
    };
    let ndigits = int_arg("round", ndigits)?;
    match &args[0] {
        Number::Int(i) if !ndigits.is_negative() => Ok(Number::Int(i.clone())),
        Number::Int(i) => {
            // once 10^k exceeds 2|i| the result is always 0
            let Some(k) = ndigits
                .magnitude()
                .to_u32()
                .filter(|&k| u64::from(k) <= i.bits() / 3 + 1)
            else {
                return Ok(Number::from(0_i64));
            };
            let p = BigInt::from(10).pow(k);
            let (q, r) = i.div_mod_floor(&p);
            let twice = &r + &r;
            let q = if twice > p || (twice == p && q.is_odd()) {
                q + BigInt::from(1)
            } else {
                q
            };
            Ok(Number::Int(q * p))
        }
        Number::Float(x) => {
            let (x, ndigits) = (*x, saturate(ndigits));
            if !x.is_finite() || ndigits > 308 {
                return Ok(Number::Float(x));
            }
            if ndigits < -308 {
                return Ok(Number::Float(0.0_f64.copysign(x)));
            }
            let p = 10f64.powi(ndigits as i32);
            let scaled = x * p;
            if !scaled.is_finite() {
                return Ok(Number::Float(x));
            }
            Ok(Number::Float(scaled.round_ties_even() / p))
        }
    }
}

fn log(args: &[Number]) -> Result<Number, EvalError> {
    let x = args[0].as_f64()?;
    if x <= 0.0 {
        return Err(EvalError::domain());
    }
    let Some(base) = args.get(1).map(Number::as_f64).transpose()? else {
        return Ok(Number::Float(x.ln()));
    };
    if base <= 0.0 {
        return Err(EvalError::domain());
    }
    if base == 1.0 {
        return Err(EvalError::division_by_zero());
    }
    Ok(Number::Float(x.ln() / base.ln()))
}

fn math_pow(args: &[Number]) -> Result<Number, EvalError> {
    let (x, y) = (args[0].as_f64()?, args[1].as_f64()?);
    if x == 0.0 && y < 0.0 {
        return Err(EvalError::domain());
    }
    if x < 0.0 && x.is_finite() && y.is_finite() && y.fract() != 0.0 {
        return Err(EvalError::domain());
    }
    checked(x.powf(y), &[x, y], EvalError::range)
}

fn remainder(args: &[Number]) -> Result<Number, EvalError> {
    let (x, y) = (args[0].as_f64()?, args[1].as_f64()?);
    if x.is_nan() || y.is_nan() {
        return Ok(Number::Float(f64::NAN));
    }
    if x.is_infinite() || y == 0.0 {
        return Err(EvalError::domain());
    }
    if y.is_infinite() {
        return Ok(Number::Float(x));
    }
    let n = (x / y).round_ties_even();
    Ok(Number::Float(x - n * y))
}

fn ldexp(args: &[Number]) -> Result<Number, EvalError> {
    let x = args[0].as_f64()?;
    let exp = saturate(int_arg("ldexp", &args[1])?).clamp(-2200, 2200) as i32;
    // split the scale so 2^exp itself never overflows before the product does
    let half = exp / 2;
    checked(x * 2f64.powi(half) * 2f64.powi(exp - half), &[x], EvalError::range)
}

fn next_after(x: f64, toward: f64) -> f64 {
    if x.is_nan() || toward.is_nan() {
        return f64::NAN;
    }
    if x == toward {
        return toward;
    }
    if x == 0.0 {
        return f64::from_bits(1).copysign(toward);
    }
    let bits = x.to_bits();
    if (toward > x) == (x > 0.0) {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

fn ulp(x: f64) -> f64 {
    if x.is_nan() || x.is_infinite() {
        return x.abs();
    }
    let x = x.abs();
    if x == f64::MAX {
        return x - next_after(x, 0.0);
    }
    next_after(x, f64::INFINITY) - x
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

fn lanczos_sum(x: f64) -> f64 {
    LANCZOS[1..]
        .iter()
        .enumerate()
        .fold(LANCZOS[0], |acc, (i, c)| acc + c / (x + i as f64 + 1.0))
}

fn is_pole(x: f64) -> bool {
    x <= 0.0 && x.fract() == 0.0
}

fn gamma(x: f64) -> Result<Number, EvalError> {
    if x.is_nan() {
        return Ok(Number::Float(x));
    }
    if is_pole(x) {
        return Err(EvalError::domain());
    }
    if x == f64::INFINITY {
        return Ok(Number::Float(x));
    }
    checked(gamma_raw(x), &[x], EvalError::range)
}

fn gamma_raw(x: f64) -> f64 {
    if x < 0.5 {
        return PI / ((PI * x).sin() * gamma_raw(1.0 - x));
    }
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    // t^(x+0.5) split in halves to survive large x
    let half = t.powf((x + 0.5) / 2.0);
    (2.0 * PI).sqrt() * half * (-t).exp() * half * lanczos_sum(x)
}

fn lgamma(x: f64) -> Result<Number, EvalError> {
    if x.is_nan() || x.is_infinite() {
        return Ok(Number::Float(x.abs()));
    }
    if is_pole(x) {
        return Err(EvalError::domain());
    }
    Ok(Number::Float(lgamma_raw(x)))
}

fn lgamma_raw(x: f64) -> f64 {
    if x < 0.5 {
        return (PI / (PI * x).sin().abs()).ln() - lgamma_raw(1.0 - x);
    }
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + lanczos_sum(x).ln()
}

fn factorial(args: &[Number]) -> Result<Number, EvalError> {
    let n = non_negative("factorial", &args[0])?;
    let k = n.to_u64().ok_or_else(EvalError::overflow)?;
    refuse_wide(product_bits(n, k, false))?;
    let mut acc = BigInt::from(1);
    for f in 2..=k {
        acc *= BigInt::from(f);
        grow(&acc)?;
    }
    Ok(Number::Int(acc))
}

fn gcd(args: &[Number]) -> Result<Number, EvalError> {
    let mut acc = BigInt::zero();
    for arg in args {
        acc = acc.gcd(int_arg("gcd", arg)?);
    }
    Ok(Number::Int(acc))
}

fn lcm(args: &[Number]) -> Result<Number, EvalError> {
    let mut acc = BigInt::from(1);
    for arg in args {
        acc = acc.lcm(int_arg("lcm", arg)?);
        grow(&acc)?;
    }
    Ok(Number::Int(acc))
}

fn comb(args: &[Number]) -> Result<Number, EvalError> {
    let n = non_negative("comb", &args[0])?;
    let k = non_negative("comb", &args[1])?;
    if k > n {
        return Ok(Number::from(0_i64));
    }
    let k = std::cmp::min(k.clone(), n - k)
        .to_u64()
        .ok_or_else(EvalError::overflow)?;
    refuse_wide(product_bits(n, k, true))?;
    let mut acc = BigInt::from(1);
    for i in 0..k {
        acc = acc * (n - BigInt::from(i)) / BigInt::from(i + 1);
        grow(&acc)?;
    }
    Ok(Number::Int(acc))
}

fn perm(args: &[Number]) -> Result<Number, EvalError> {
    let n = non_negative("perm", &args[0])?;
    let k = match args.get(1) {
        Some(k) => non_negative("perm", k)?,
        None => n,
    };
    if k > n {
        return Ok(Number::from(0_i64));
    }
    let k = k.to_u64().ok_or_else(EvalError::overflow)?;
    refuse_wide(product_bits(n, k, false))?;
    let mut acc = BigInt::from(1);
    for i in 0..k {
        acc *= n - BigInt::from(i);
        grow(&acc)?;
    }
    Ok(Number::Int(acc))
}

fn isqrt(args: &[Number]) -> Result<Number, EvalError> {
    Ok(Number::Int(non_negative("isqrt", &args[0])?.sqrt()))
}
