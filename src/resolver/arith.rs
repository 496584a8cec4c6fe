//! Four-operator integer arithmetic for folded constants.
//!
//! Grammar: `int (op int)*` with `op` in `+ - * /`, whitespace ignored,
//! no parentheses, no unary signs. `*` and `/` bind tighter than `+` and `-`;
//! equal precedence folds left to right.
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected `{0}`")]
    Unexpected(String),
    #[error("expression ends with an operator")]
    TrailingOperator,
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Op::Add),
            '-' => Some(Op::Sub),
            '*' => Some(Op::Mul),
            '/' => Some(Op::Div),
            _ => None,
        }
    }

    fn apply(self, lhs: i64, rhs: i64) -> Result<i64, EvalError> {
        match self {
            Op::Add => lhs.checked_add(rhs).ok_or(EvalError::Overflow),
            Op::Sub => lhs.checked_sub(rhs).ok_or(EvalError::Overflow),
            Op::Mul => lhs.checked_mul(rhs).ok_or(EvalError::Overflow),
            Op::Div if rhs == 0 => Err(EvalError::DivisionByZero),
            Op::Div => lhs.checked_div(rhs).ok_or(EvalError::Overflow),
        }
    }
}

/// Split into alternating operands and operators.
fn tokenize(expr: &str) -> Result<(Vec<i64>, Vec<Op>), EvalError> {
    let mut operands = Vec::new();
    let mut ops = Vec::new();
    let mut chars = expr.chars().filter(|c| !c.is_whitespace()).peekable();

    while let Some(&c) = chars.peek() {
        let expect_operand = operands.len() == ops.len();
        if expect_operand {
            if !c.is_ascii_digit() {
                return Err(EvalError::Unexpected(c.to_string()));
            }
            let mut digits = String::new();
            while let Some(&d) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                digits.push(d);
                chars.next();
            }
            operands.push(digits.parse::<i64>().map_err(|_| EvalError::Overflow)?);
        } else {
            let op = Op::from_char(c).ok_or_else(|| EvalError::Unexpected(c.to_string()))?;
            ops.push(op);
            chars.next();
        }
    }

    if operands.is_empty() {
        return Err(EvalError::Empty);
    }
    if operands.len() == ops.len() {
        return Err(EvalError::TrailingOperator);
    }
    Ok((operands, ops))
}

pub fn evaluate(expr: &str) -> Result<i64, EvalError> {
    let (operands, ops) = tokenize(expr)?;

    // pass 1: fold * and / into terms
    let mut terms = vec![operands[0]];
    let mut term_ops = Vec::new();
    for (op, rhs) in ops.into_iter().zip(operands.into_iter().skip(1)) {
        match op {
            Op::Mul | Op::Div => {
                let lhs = terms.pop().ok_or(EvalError::Empty)?;
                terms.push(op.apply(lhs, rhs)?);
            }
            Op::Add | Op::Sub => {
                term_ops.push(op);
                terms.push(rhs);
            }
        }
    }

    // pass 2: + and - left to right
    let mut acc = terms[0];
    for (op, rhs) in term_ops.into_iter().zip(terms.into_iter().skip(1)) {
        acc = op.apply(acc, rhs)?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_without_parentheses() {
        assert_eq!(evaluate("2 + 3 * 4"), Ok(14));
        assert_eq!(evaluate("2*3+4"), Ok(10));
        assert_eq!(evaluate("20 / 4 * 2"), Ok(10));
        assert_eq!(evaluate("10 - 2 - 3"), Ok(5));
        assert_eq!(evaluate("1 - 5"), Ok(-4));
        assert_eq!(evaluate("7 / 2"), Ok(3));
    }

    #[test]
    fn bare_number() {
        assert_eq!(evaluate(" 42 "), Ok(42));
    }

    #[test]
    fn failures() {
        assert_eq!(evaluate(""), Err(EvalError::Empty));
        assert_eq!(evaluate("1 / 0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("3 +"), Err(EvalError::TrailingOperator));
        assert_eq!(evaluate("-3"), Err(EvalError::Unexpected("-".into())));
        assert_eq!(evaluate("abc"), Err(EvalError::Unexpected("a".into())));
        assert_eq!(evaluate("1.5 * 2"), Err(EvalError::Unexpected(".".into())));
        assert_eq!(evaluate("9223372036854775807 + 1"), Err(EvalError::Overflow));
        assert_eq!(evaluate("(1 + 2)"), Err(EvalError::Unexpected("(".into())));
    }
}
