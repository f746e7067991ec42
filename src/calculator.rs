//! Restricted arithmetic evaluator
//!
//! Accepts numbers, parentheses and the operators `+ - * / ^` and nothing
//! else. Expressions are validated, tokenized and evaluated by a small
//! recursive-descent parser; user text is never handed to anything that
//! could execute it.

#[cfg(test)]
mod proptests;

use std::fmt;
use thiserror::Error;

const OPERATORS: &[char] = &['+', '-', '*', '/', '^'];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("the expression is empty")]
    Empty,
    #[error("unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("consecutive operators are not allowed")]
    ConsecutiveOperators,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected '{0}'")]
    UnexpectedToken(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("the result is not a finite number")]
    NonFinite,
}

/// Whether a result is a whole number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Decimal,
}

/// A successfully evaluated expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calculation {
    pub value: f64,
}

impl Calculation {
    pub fn kind(&self) -> NumberKind {
        if self.value.fract() == 0.0 {
            NumberKind::Integer
        } else {
            NumberKind::Decimal
        }
    }
}

impl fmt::Display for Calculation {
    /// Whole numbers render without a fractional part, everything else with
    /// the shortest representation that round-trips.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `+ 0.0` folds negative zero into zero
        let value = self.value + 0.0;
        match self.kind() {
            NumberKind::Integer => write!(f, "{value:.0}"),
            NumberKind::Decimal => write!(f, "{value}"),
        }
    }
}

/// Clean, validate and evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<Calculation, EvaluationError> {
    let cleaned = clean_expression(expression);
    validate(&cleaned)?;

    let tokens = tokenize(&cleaned)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expression()?;
    if let Some(token) = parser.peek() {
        return Err(EvaluationError::UnexpectedToken(token.to_string()));
    }

    if !value.is_finite() {
        return Err(EvaluationError::NonFinite);
    }
    Ok(Calculation { value })
}

/// Strip whitespace and map typographic operators to their ASCII forms
pub fn clean_expression(expression: &str) -> String {
    expression
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '×' => '*',
            '÷' => '/',
            other => other,
        })
        .collect()
}

/// Reject malformed input before parsing.
///
/// Checks run in a fixed order: empty input, unbalanced parentheses,
/// characters outside the grammar, then runs of two or more operators.
pub fn validate(expression: &str) -> Result<(), EvaluationError> {
    if expression.is_empty() {
        return Err(EvaluationError::Empty);
    }

    let mut depth: usize = 0;
    for c in expression.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(EvaluationError::UnbalancedParentheses)?;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(EvaluationError::UnbalancedParentheses);
    }

    if let Some(bad) = expression
        .chars()
        .find(|c| !(c.is_ascii_digit() || *c == '.' || *c == '(' || *c == ')' || OPERATORS.contains(c)))
    {
        return Err(EvaluationError::InvalidCharacter(bad));
    }

    let mut previous_was_operator = false;
    for c in expression.chars() {
        let is_operator = OPERATORS.contains(&c);
        if is_operator && previous_was_operator {
            return Err(EvaluationError::ConsecutiveOperators);
        }
        previous_was_operator = is_operator;
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Operator(char),
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Operator(op) => write!(f, "{op}"),
            Token::Open => f.write_str("("),
            Token::Close => f.write_str(")"),
        }
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token>, EvaluationError> {
    let mut tokens = Vec::new();
    let mut chars = expression.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            let mut literal = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    literal.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            let value = literal
                .parse::<f64>()
                .map_err(|_| EvaluationError::InvalidNumber(literal.clone()))?;
            tokens.push(Token::Number(value));
            continue;
        }

        chars.next();
        let token = match c {
            '(' => Token::Open,
            ')' => Token::Close,
            op if OPERATORS.contains(&op) => Token::Operator(op),
            other => return Err(EvaluationError::InvalidCharacter(other)),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

/// Grammar, lowest precedence first:
///
/// ```text
/// expression := term (('+' | '-') term)*
/// term       := unary (('*' | '/') unary)*
/// unary      := ('+' | '-') unary | power
/// power      := primary ('^' unary)?
/// primary    := number | '(' expression ')'
/// ```
///
/// `^` is right-associative; everything else associates left to right.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expression(&mut self) -> Result<f64, EvaluationError> {
        let mut value = self.term()?;
        while let Some(Token::Operator(op @ ('+' | '-'))) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, EvaluationError> {
        let mut value = self.unary()?;
        while let Some(Token::Operator(op @ ('*' | '/'))) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            if op == '*' {
                value *= rhs;
            } else {
                if rhs == 0.0 {
                    return Err(EvaluationError::DivisionByZero);
                }
                value /= rhs;
            }
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, EvaluationError> {
        match self.peek() {
            Some(Token::Operator('-')) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Operator('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64, EvaluationError> {
        let base = self.primary()?;
        if let Some(Token::Operator('^')) = self.peek() {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, EvaluationError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Open) => {
                let value = self.expression()?;
                match self.advance() {
                    Some(Token::Close) => Ok(value),
                    Some(other) => Err(EvaluationError::UnexpectedToken(other.to_string())),
                    None => Err(EvaluationError::UnexpectedEnd),
                }
            }
            Some(other) => Err(EvaluationError::UnexpectedToken(other.to_string())),
            None => Err(EvaluationError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_str(expression: &str) -> String {
        evaluate(expression).unwrap().to_string()
    }

    #[test]
    fn test_basic_calculations() {
        assert_eq!(eval_str("2+2"), "4");
        assert_eq!(eval_str("3*4"), "12");
        assert_eq!(eval_str("10/2"), "5");
        assert_eq!(eval_str("100 / 4"), "25");
        assert_eq!(evaluate("10/2").unwrap().kind(), NumberKind::Integer);
    }

    #[test]
    fn test_precedence_and_parentheses() {
        assert_eq!(eval_str("(2+3)*4"), "20");
        assert_eq!(eval_str("2+3*4"), "14");
        assert_eq!(eval_str("2^3"), "8");
        assert_eq!(eval_str("2*3^2"), "18");
        assert_eq!(eval_str("2^3^2"), "512");
        assert_eq!(eval_str("10-4-3"), "3");
        assert_eq!(eval_str("64/4/2"), "8");
        assert_eq!(eval_str("-2^2"), "-4");
    }

    #[test]
    fn test_decimals() {
        let result = evaluate("3.14*2").unwrap();
        assert_eq!(result.kind(), NumberKind::Decimal);
        assert!((result.value - 6.28).abs() < 1e-9);
        assert_eq!(result.to_string(), "6.28");
        assert_eq!(eval_str("7/2"), "3.5");
    }

    #[test]
    fn test_rationals_are_decimal() {
        let third = evaluate("1/3").unwrap();
        assert_eq!(third.kind(), NumberKind::Decimal);
        assert_eq!(evaluate("6/3").unwrap().kind(), NumberKind::Integer);
    }

    #[test]
    fn test_expression_cleaning() {
        assert_eq!(eval_str(" 2 + 2 "), "4");
        assert_eq!(eval_str("2×3"), "6");
        assert_eq!(eval_str("6÷2"), "3");
    }

    #[test]
    fn test_invalid_expressions() {
        assert_eq!(evaluate(""), Err(EvaluationError::Empty));
        assert_eq!(evaluate("   "), Err(EvaluationError::Empty));
        assert_eq!(evaluate("(2+3"), Err(EvaluationError::UnbalancedParentheses));
        assert_eq!(evaluate(")2+3("), Err(EvaluationError::UnbalancedParentheses));
        assert_eq!(evaluate("2+abc"), Err(EvaluationError::InvalidCharacter('a')));
        assert_eq!(evaluate("2++3"), Err(EvaluationError::ConsecutiveOperators));
        assert_eq!(evaluate("2*-3"), Err(EvaluationError::ConsecutiveOperators));
    }

    #[test]
    fn test_validation_order() {
        // Unbalanced wins over invalid characters
        assert_eq!(evaluate("(abc"), Err(EvaluationError::UnbalancedParentheses));
        // Invalid characters win over consecutive operators
        assert_eq!(evaluate("x++1"), Err(EvaluationError::InvalidCharacter('x')));
    }

    #[test]
    fn test_code_is_never_executed() {
        assert!(evaluate("__import__('os').system('ls')").is_err());
        assert!(evaluate("2;3").is_err());
        assert!(evaluate("2**3").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            evaluate("1.2.3+1"),
            Err(EvaluationError::InvalidNumber("1.2.3".to_string()))
        );
        assert_eq!(evaluate("2+"), Err(EvaluationError::UnexpectedEnd));
        assert_eq!(evaluate("()"), Err(EvaluationError::UnexpectedToken(")".to_string())));
        assert_eq!(evaluate("2(3)"), Err(EvaluationError::UnexpectedToken("(".to_string())));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(evaluate("1/0"), Err(EvaluationError::DivisionByZero));
        assert_eq!(evaluate("5/(2-2)"), Err(EvaluationError::DivisionByZero));
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(evaluate("10^400"), Err(EvaluationError::NonFinite));
    }

    #[test]
    fn test_negative_zero_renders_as_zero() {
        assert_eq!(eval_str("-0*5"), "0");
    }
}
