// lexer.rs

use num_bigint::BigInt;

use super::error::EvalError;

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Int(BigInt),
    Float(f64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LParen,
    RParen,
    Comma,
    Dot,
}

/// A token and the byte offset where it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

pub fn tokenize(input: &str) -> Result<Vec<Spanned>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(offset, ch)) = chars.peek() {
        let token = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            c if c.is_ascii_digit() => lex_number(input, &mut chars)?,
            '.' => {
                let next_is_digit = input[offset + 1..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_digit());
                if next_is_digit {
                    lex_number(input, &mut chars)?
                } else {
                    chars.next();
                    Token::Dot
                }
            }
            c if c == '_' || c.is_alphabetic() => {
                let mut ident = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c == '_' || c.is_alphanumeric() {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                Token::Ident(ident)
            }
            '\'' | '"' => lex_string(&mut chars)?,
            '*' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '*'))) {
                    chars.next();
                    Token::DoubleStar
                } else {
                    Token::Star
                }
            }
            '/' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '/'))) {
                    chars.next();
                    Token::DoubleSlash
                } else {
                    Token::Slash
                }
            }
            '+' | '-' | '%' | '(' | ')' | ',' => {
                chars.next();
                match ch {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '%' => Token::Percent,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    _ => Token::Comma,
                }
            }
            other => {
                return Err(EvalError::syntax(
                    format!("unexpected character '{}'", other),
                    offset,
                ))
            }
        };
        tokens.push(Spanned { token, offset });
    }
    Ok(tokens)
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn lex_number(input: &str, chars: &mut Chars<'_>) -> Result<Token, EvalError> {
    let start = chars.peek().map(|&(i, _)| i).unwrap_or(input.len());
    if let Some(radix) = radix_prefix(&input[start..]) {
        return lex_radix(radix, start, chars);
    }
    let mut text = String::new();
    let mut is_float = false;
    let mut seen_exponent = false;
    let mut prev = '\0';
    while let Some(&(offset, ch)) = chars.peek() {
        match ch {
            c if c.is_ascii_digit() => text.push(c),
            '_' if prev.is_ascii_digit() => {
                let next_is_digit = input[offset + 1..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_digit());
                if !next_is_digit {
                    return Err(EvalError::syntax("invalid decimal literal", offset));
                }
            }
            '.' if !is_float && !seen_exponent => {
                is_float = true;
                text.push('.');
            }
            'e' | 'E' if !seen_exponent && (prev.is_ascii_digit() || prev == '.') => {
                seen_exponent = true;
                is_float = true;
                text.push('e');
                chars.next();
                prev = ch;
                if let Some(&(_, sign @ ('+' | '-'))) = chars.peek() {
                    text.push(sign);
                    chars.next();
                }
                match chars.peek() {
                    Some(&(_, d)) if d.is_ascii_digit() => continue,
                    _ => return Err(EvalError::syntax("invalid decimal literal", offset)),
                }
            }
            c if c == '_' || c.is_alphabetic() => {
                return Err(EvalError::syntax("invalid decimal literal", offset));
            }
            _ => break,
        }
        prev = ch;
        chars.next();
    }
    if is_float {
        text.parse::<f64>()
            .map(Token::Float)
            .map_err(|_| EvalError::syntax("invalid decimal literal", start))
    } else if text.len() > 1 && text.starts_with('0') && text.bytes().any(|b| b != b'0') {
        Err(EvalError::syntax(
            "leading zeros in decimal integer literals are not permitted",
            start,
        ))
    } else {
        text.parse::<BigInt>()
            .map(Token::Int)
            .map_err(|_| EvalError::syntax("invalid decimal literal", start))
    }
}

fn radix_prefix(text: &str) -> Option<u32> {
    let mut it = text.chars();
    if it.next() != Some('0') {
        return None;
    }
    match it.next()? {
        'x' | 'X' => Some(16),
        'o' | 'O' => Some(8),
        'b' | 'B' => Some(2),
        _ => None,
    }
}

/// `0x`, `0o` and `0b` literals. A single `_` may follow the prefix or sit
/// between digits.
fn lex_radix(radix: u32, start: usize, chars: &mut Chars<'_>) -> Result<Token, EvalError> {
    let kind = match radix {
        16 => "hexadecimal",
        8 => "octal",
        _ => "binary",
    };
    let invalid = |offset| EvalError::syntax(format!("invalid {} literal", kind), offset);
    chars.next();
    chars.next();
    let mut digits = String::new();
    let mut prev = 'x';
    let mut end = start + 2;
    while let Some(&(offset, ch)) = chars.peek() {
        if ch == '_' {
            if prev == '_' {
                return Err(invalid(offset));
            }
        } else if ch.is_digit(radix) {
            digits.push(ch);
        } else if ch.is_alphanumeric() {
            return Err(invalid(offset));
        } else {
            break;
        }
        prev = ch;
        end = offset + 1;
        chars.next();
    }
    if digits.is_empty() || prev == '_' {
        return Err(invalid(end));
    }
    BigInt::parse_bytes(digits.as_bytes(), radix)
        .map(Token::Int)
        .ok_or_else(|| invalid(start))
}

fn lex_string(chars: &mut Chars<'_>) -> Result<Token, EvalError> {
    let Some((start, quote)) = chars.next() else {
        return Err(EvalError::syntax("unterminated string literal", 0));
    };
    let mut cur = String::new();
    while let Some((_, ch)) = chars.next() {
        match ch {
            c if c == quote => return Ok(Token::Str(cur)),
            '\\' => match chars.next() {
                Some((_, 'n')) => cur.push('\n'),
                Some((_, 't')) => cur.push('\t'),
                Some((_, next @ ('\\' | '\'' | '"'))) => cur.push(next),
                Some((_, next)) => {
                    cur.push('\\');
                    cur.push(next);
                }
                None => break,
            },
            _ => cur.push(ch),
        }
    }
    Err(EvalError::syntax("unterminated string literal", start))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> Token {
        Token::Int(i.into())
    }

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn operators_and_numbers() {
        assert_eq!(
            kinds("2**-1 // 3 % .5"),
            vec![
                int(2),
                Token::DoubleStar,
                Token::Minus,
                int(1),
                Token::DoubleSlash,
                int(3),
                Token::Percent,
                Token::Float(0.5),
            ]
        );
    }

    #[test]
    fn float_forms() {
        assert_eq!(kinds("1e3"), vec![Token::Float(1000.0)]);
        assert_eq!(kinds("2.5E-1"), vec![Token::Float(0.25)]);
        assert_eq!(kinds("1."), vec![Token::Float(1.0)]);
        assert_eq!(kinds("1_000"), vec![int(1000)]);
    }

    #[test]
    fn integer_forms() {
        assert_eq!(kinds("0x1F 0o17 0b1010 0X_ff"), vec![int(31), int(15), int(10), int(255)]);
        assert_eq!(kinds("0 00 0_0"), vec![int(0), int(0), int(0)]);
        assert_eq!(kinds("007.5 0e3"), vec![Token::Float(7.5), Token::Float(0.0)]);
        assert_eq!(
            kinds("99999999999999999999"),
            vec![Token::Int("99999999999999999999".parse().unwrap())]
        );
    }

    #[test]
    fn leading_zeros_and_bad_radix_digits_are_rejected() {
        for bad in ["007", "0_7", "0x", "0b2", "0xg", "0o8", "0x__1", "0b1_"] {
            assert!(
                matches!(tokenize(bad), Err(EvalError::Syntax { .. })),
                "{bad:?} should not tokenize"
            );
        }
    }

    #[test]
    fn identifiers_strings_and_attributes() {
        assert_eq!(
            kinds("open('a\\'b').read"),
            vec![
                Token::Ident("open".into()),
                Token::LParen,
                Token::Str("a'b".into()),
                Token::RParen,
                Token::Dot,
                Token::Ident("read".into()),
            ]
        );
    }

    #[test]
    fn offsets_point_at_token_start() {
        let spans = tokenize("  sin (x)").unwrap();
        assert_eq!(spans[0].offset, 2);
        assert_eq!(spans[1].offset, 6);
    }

    #[test]
    fn malformed_input_is_a_syntax_error() {
        for bad in ["1e", "12abc", "3 $ 4", "'open", "1__0"] {
            assert!(
                matches!(tokenize(bad), Err(EvalError::Syntax { .. })),
                "{bad:?} should not tokenize"
            );
        }
    }
}
