// eval.rs

use super::allowlist::{self, AllowList, Function, Symbol};
use super::ast::{parse, BinOp, Expr, UnaryOp};
use super::error::EvalError;
use super::number::Number;

/// Evaluates expressions against one allow-list and nothing else.
#[derive(Clone, Copy, Debug)]
pub struct Evaluator<'a> {
    symbols: &'a AllowList,
}

/// Intermediate values. Only numbers may leave the evaluator.
enum Value<'a> {
    Num(Number),
    Func(&'a Function),
}

impl Default for Evaluator<'static> {
    fn default() -> Self {
        Evaluator::new(allowlist::global())
    }
}

impl<'a> Evaluator<'a> {
    pub fn new(symbols: &'a AllowList) -> Self {
        Self { symbols }
    }

    /// Parses, checks every referenced name, then computes. Nothing is
    /// computed unless the name check passes.
    pub fn evaluate(&self, expression: &str) -> Result<Number, EvalError> {
        let expr = parse(expression)?;
        self.check_names(&expr)?;
        match self.eval(&expr)? {
            Value::Num(n) => Ok(n),
            Value::Func(f) => Err(EvalError::evaluation(format!(
                "result is the function {}(), not a number",
                f.name()
            ))),
        }
    }

    pub fn check_names(&self, expr: &Expr) -> Result<(), EvalError> {
        match expr.identifiers().into_iter().find(|name| !self.symbols.contains(name)) {
            Some(name) => Err(EvalError::UnsafeName {
                name: name.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn eval(&self, expr: &Expr) -> Result<Value<'a>, EvalError> {
        match expr {
            Expr::Int(i) => Ok(Value::Num(Number::Int(i.clone()))),
            Expr::Float(f) => Ok(Value::Num(Number::Float(*f))),
            Expr::Str(_) => Err(EvalError::evaluation("strings are not supported")),
            Expr::Name(name) => match self.symbols.get(name) {
                Some(Symbol::Const(n)) => Ok(Value::Num(n.clone())),
                Some(Symbol::Func(f)) => Ok(Value::Func(f)),
                None => Err(EvalError::UnsafeName { name: name.clone() }),
            },
            Expr::Attribute { attr, .. } => Err(EvalError::evaluation(format!(
                "attribute access is not allowed: .{}",
                attr
            ))),
            Expr::Call { func, args } => {
                let Value::Func(function) = self.eval(func)? else {
                    return Err(EvalError::evaluation("number is not callable"));
                };
                let args = args
                    .iter()
                    .map(|arg| self.number(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                function.call(&args).map(Value::Num)
            }
            Expr::Unary { op, operand } => {
                let n = self.number(operand)?;
                match op {
                    UnaryOp::Plus => Ok(Value::Num(n)),
                    UnaryOp::Minus => Ok(Value::Num(n.neg())),
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let (a, b) = (self.number(lhs)?, self.number(rhs)?);
                let out = match op {
                    BinOp::Add => a.add(&b),
                    BinOp::Sub => a.sub(&b),
                    BinOp::Mul => a.mul(&b),
                    BinOp::Div => a.div(&b),
                    BinOp::FloorDiv => a.floor_div(&b),
                    BinOp::Mod => a.rem(&b),
                    BinOp::Pow => a.pow(&b),
                };
                out.map(Value::Num)
            }
        }
    }

    fn number(&self, expr: &Expr) -> Result<Number, EvalError> {
        match self.eval(expr)? {
            Value::Num(n) => Ok(n),
            Value::Func(f) => Err(EvalError::evaluation(format!(
                "unsupported operand: function {}()",
                f.name()
            ))),
        }
    }
}

/// Evaluates against the process-wide allow-list.
pub fn evaluate(expression: &str) -> Result<Number, EvalError> {
    Evaluator::default().evaluate(expression)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(expr: &str, expected: f64) {
        let got = evaluate(expr).unwrap().as_f64().unwrap();
        assert!((got - expected).abs() < 1e-9, "{expr} = {got}, expected {expected}");
    }

    #[test]
    fn arithmetic() {
        assert_eq!(evaluate("2+3").unwrap(), Number::from(5_i64));
        assert_eq!(evaluate("min(10, round(3.6))").unwrap(), Number::from(4_i64));
        assert_eq!(evaluate("abs(-10)").unwrap(), Number::from(10_i64));
        assert_eq!(evaluate("-2**2").unwrap(), Number::from(-4_i64));
        assert_eq!(evaluate("2**3**2").unwrap(), Number::from(512_i64));
        assert_eq!(evaluate("7 // 2 + 7 % 3").unwrap(), Number::from(4_i64));
        assert_eq!(evaluate("(1 + 2) * 3").unwrap(), Number::from(9_i64));
        assert_eq!(evaluate("1 / 4").unwrap(), Number::Float(0.25));
        approx("sin(pi/2)", 1.0);
        approx("sqrt(16) + log(e)", 5.0);
        approx("log(8, 2)", 3.0);
    }

    #[test]
    fn big_integers_are_exact() {
        let big = |digits: &str| Number::Int(digits.parse().unwrap());
        assert_eq!(evaluate("2**64").unwrap(), big("18446744073709551616"));
        assert_eq!(evaluate("10**20").unwrap(), big("100000000000000000000"));
        assert_eq!(evaluate("2**63 - 1 + 1").unwrap(), big("9223372036854775808"));
        assert_eq!(evaluate("factorial(25)").unwrap(), big("15511210043330985984000000"));
        assert_eq!(evaluate("2**64 // 2**32").unwrap(), Number::from(4_294_967_296_i64));
        assert_eq!(evaluate("99999999999999999999 + 1").unwrap(), big("100000000000000000000"));
        assert_eq!(evaluate("2**64 / 2").unwrap(), Number::Float(9_223_372_036_854_775_808.0));
    }

    #[test]
    fn literal_forms_and_boolean_constants() {
        assert_eq!(evaluate("0xff + 0o17 + 0b11").unwrap(), Number::from(273_i64));
        assert_eq!(evaluate("True + True").unwrap(), Number::from(2_i64));
        assert_eq!(evaluate("False * 5").unwrap(), Number::from(0_i64));
        assert_eq!(evaluate("isnan(nan) + isinf(1e308 * 10)").unwrap(), Number::from(2_i64));
        assert!(matches!(evaluate("007"), Err(EvalError::Syntax { .. })));
    }

    #[test]
    fn unknown_names_fail_before_evaluation() {
        for (expr, name) in [
            ("foobar + 1", "foobar"),
            ("open('file')", "open"),
            ("__import__('os').system('ls')", "__import__"),
            ("pi.real", "real"),
            ("1 / 0 + x", "x"),
        ] {
            assert_eq!(
                evaluate(expr),
                Err(EvalError::UnsafeName { name: name.into() }),
                "{expr}"
            );
        }
    }

    #[test]
    fn allowed_but_failing_is_an_evaluation_error() {
        for expr in ["1 / 0", "sqrt(-1)", "abs('x')", "pi(2)", "sin + 1", "sin", "abs(1, 2)"] {
            let result = evaluate(expr);
            assert!(matches!(result, Err(EvalError::Evaluation(_))), "{expr}: {result:?}");
        }
    }

    #[test]
    fn malformed_text_is_a_syntax_error() {
        for expr in ["2 +", "import os", "x = 1", "lambda: 1", "[1]"] {
            assert!(
                matches!(evaluate(expr), Err(EvalError::Syntax { .. })),
                "{expr}"
            );
        }
    }

    #[test]
    fn custom_allow_list_is_the_only_environment() {
        let list = AllowList::standard();
        let evaluator = Evaluator::new(&list);
        assert_eq!(evaluator.evaluate("max(1, 2)").unwrap(), Number::from(2_i64));
        assert!(evaluator.evaluate("print(1)").is_err());
    }
}
