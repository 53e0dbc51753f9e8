// ast.rs
//
// Recursive-descent parser for the arithmetic subset. Precedence, lowest
// first: `+ -`, `* / // %`, unary `+ -`, `**` (right-associative), then
// calls and attribute access.

use num_bigint::BigInt;

use super::error::EvalError;
use super::lexer::{tokenize, Spanned, Token};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Int(BigInt),
    Float(f64),
    Str(String),
    Name(String),
    Attribute { value: Box<Expr>, attr: String },
    Call { func: Box<Expr>, args: Vec<Expr> },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
}

impl Expr {
    /// Every identifier in the tree in source order: plain names, call
    /// targets and attribute names alike.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_identifiers(&mut out);
        out
    }

    fn collect_identifiers<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Int(_) | Expr::Float(_) | Expr::Str(_) => {}
            Expr::Name(name) => out.push(name),
            Expr::Attribute { value, attr } => {
                value.collect_identifiers(out);
                out.push(attr);
            }
            Expr::Call { func, args } => {
                func.collect_identifiers(out);
                for arg in args {
                    arg.collect_identifiers(out);
                }
            }
            Expr::Unary { operand, .. } => operand.collect_identifiers(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_identifiers(out);
                rhs.collect_identifiers(out);
            }
        }
    }
}

pub fn parse(input: &str) -> Result<Expr, EvalError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
    };
    if parser.tokens.is_empty() {
        return Err(EvalError::syntax("empty expression", 0));
    }
    let expr = parser.expr()?;
    if let Some(extra) = parser.tokens.get(parser.pos) {
        return Err(EvalError::syntax(
            format!("unexpected {}", describe(&extra.token)),
            extra.offset,
        ));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|s| s.offset).unwrap_or(self.end)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> EvalError {
        match self.tokens.get(self.pos) {
            Some(s) => EvalError::syntax(format!("unexpected {}", describe(&s.token)), s.offset),
            None => EvalError::syntax("unexpected end of expression", self.end),
        }
    }

    fn expr(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
    }

    fn term(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::DoubleSlash) => BinOp::FloorDiv,
                Some(Token::Percent) => BinOp::Mod,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.factor()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
    }

    fn factor(&mut self) -> Result<Expr, EvalError> {
        let op = match self.peek() {
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Minus) => UnaryOp::Minus,
            _ => return self.power(),
        };
        self.pos += 1;
        let operand = self.factor()?;
        Ok(Expr::Unary { op, operand: Box::new(operand) })
    }

    fn power(&mut self) -> Result<Expr, EvalError> {
        let base = self.primary()?;
        if self.eat(&Token::DoubleStar) {
            // the exponent may itself carry a sign: 2 ** -1
            let exponent = self.factor()?;
            return Ok(Expr::Binary {
                op: BinOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.atom()?;
        loop {
            if self.eat(&Token::LParen) {
                let args = self.arguments()?;
                expr = Expr::Call { func: Box::new(expr), args };
            } else if self.eat(&Token::Dot) {
                let Some(Token::Ident(attr)) = self.peek().cloned() else {
                    return Err(self.unexpected());
                };
                self.pos += 1;
                expr = Expr::Attribute { value: Box::new(expr), attr };
            } else {
                return Ok(expr);
            }
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, EvalError> {
        let mut args = Vec::new();
        loop {
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            args.push(self.expr()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            return Err(self.unexpected());
        }
    }

    fn atom(&mut self) -> Result<Expr, EvalError> {
        let offset = self.offset();
        match self.bump() {
            Some(Token::Int(i)) => Ok(Expr::Int(i)),
            Some(Token::Float(f)) => Ok(Expr::Float(f)),
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::Ident(name)) => Ok(Expr::Name(name)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                if self.eat(&Token::RParen) {
                    Ok(inner)
                } else {
                    Err(self.unexpected())
                }
            }
            Some(other) => Err(EvalError::syntax(
                format!("unexpected {}", describe(&other)),
                offset,
            )),
            None => Err(EvalError::syntax("unexpected end of expression", offset)),
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Int(i) => format!("number {}", i),
        Token::Float(f) => format!("number {}", f),
        Token::Str(_) => "string".to_string(),
        Token::Ident(name) => format!("name '{}'", name),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::DoubleStar => "'**'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::DoubleSlash => "'//'".to_string(),
        Token::Percent => "'%'".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Dot => "'.'".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> Expr {
        Expr::Int(i.into())
    }

    fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(
            parse("1 + 2 * 3").unwrap(),
            bin(BinOp::Add, int(1), bin(BinOp::Mul, int(2), int(3)))
        );
    }

    #[test]
    fn power_is_right_associative_and_beats_unary_minus() {
        assert_eq!(
            parse("-2 ** 3 ** 2").unwrap(),
            Expr::Unary {
                op: UnaryOp::Minus,
                operand: Box::new(bin(
                    BinOp::Pow,
                    int(2),
                    bin(BinOp::Pow, int(3), int(2)),
                )),
            }
        );
    }

    #[test]
    fn calls_take_positional_arguments() {
        let expr = parse("max(1, 2,)").unwrap();
        assert_eq!(
            expr,
            Expr::Call {
                func: Box::new(Expr::Name("max".into())),
                args: vec![int(1), int(2)],
            }
        );
    }

    #[test]
    fn identifiers_include_calls_and_attributes() {
        let expr = parse("__import__('os').system(x) + sin(pi)").unwrap();
        assert_eq!(expr.identifiers(), vec!["__import__", "system", "x", "sin", "pi"]);
    }

    #[test]
    fn rejects_non_expressions() {
        for bad in ["", "1 +", "(1", "1 2", "f(1 2)", "x.", "a = 1", ")"] {
            assert!(
                matches!(parse(bad), Err(EvalError::Syntax { .. })),
                "{bad:?} should be a syntax error"
            );
        }
    }

    #[test]
    fn syntax_errors_report_the_column() {
        match parse("1 + )") {
            Err(EvalError::Syntax { column, .. }) => assert_eq!(column, 5),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
