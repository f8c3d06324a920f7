//! Expression parsing for OpenQASM 2 gate parameters.

use super::{MAX_EXPRESSION_DEPTH, Parser};
use crate::ast::{BinOp, Expression};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    pub(super) fn expression(&mut self) -> ParseResult<Expression> {
        self.binary_expr(0)
    }

    /// Precedence climbing over `+ -` and `* /`.
    fn binary_expr(&mut self, min_prec: u8) -> ParseResult<Expression> {
        let mut left = self.unary_expr()?;

        while let Some(op) = self.peek_binary_op() {
            let prec = op_precedence(op);
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.binary_expr(prec + 1)?;
            left = Expression::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Every nested sub-expression passes through here.
    fn unary_expr(&mut self) -> ParseResult<Expression> {
        if self.depth >= MAX_EXPRESSION_DEPTH {
            return Err(ParseError::InvalidExpression {
                line: self.line(),
                message: "expression nested too deeply".into(),
            });
        }
        self.depth += 1;
        let expr = self.signed_expr();
        self.depth -= 1;
        expr
    }

    fn signed_expr(&mut self) -> ParseResult<Expression> {
        if self.consume(&Token::Minus) {
            return Ok(Expression::Neg(Box::new(self.unary_expr()?)));
        }
        if self.consume(&Token::Plus) {
            return self.unary_expr();
        }
        self.power_expr()
    }

    /// `^` binds tighter than unary minus and is right-associative.
    fn power_expr(&mut self) -> ParseResult<Expression> {
        let base = self.primary_expr()?;
        if self.consume(&Token::Caret) {
            let exponent = self.unary_expr()?;
            return Ok(Expression::BinOp {
                left: Box::new(base),
                op: BinOp::Pow,
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn primary_expr(&mut self) -> ParseResult<Expression> {
        let line = self.line();
        let token = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof("expression".into()))?;

        match token {
            Token::IntLiteral(v) => Ok(Expression::Int(v)),
            Token::RealLiteral(v) => Ok(Expression::Real(v)),
            Token::Pi => Ok(Expression::Pi),
            Token::Identifier(name) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.advance();
                    let arg = self.expression()?;
                    self.expect(Token::RParen)?;
                    Ok(Expression::Call {
                        function: name,
                        arg: Box::new(arg),
                    })
                } else {
                    Ok(Expression::Identifier(name))
                }
            }
            Token::LParen => {
                let expr = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            other => Err(ParseError::UnexpectedToken {
                line,
                expected: "expression".into(),
                found: other.to_string(),
            }),
        }
    }

    fn peek_binary_op(&self) -> Option<BinOp> {
        match self.peek()? {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            _ => None,
        }
    }

    pub(super) fn expression_list(&mut self) -> ParseResult<Vec<Expression>> {
        if self.check(&Token::RParen) {
            return Ok(vec![]);
        }
        let mut exprs = vec![self.expression()?];
        while self.consume(&Token::Comma) {
            exprs.push(self.expression()?);
        }
        Ok(exprs)
    }
}

fn op_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Add | BinOp::Sub => 1,
        BinOp::Mul | BinOp::Div => 2,
        BinOp::Pow => 3,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{BinOp, Expression, QuantumOp, Statement};
    use crate::error::ParseError;
    use crate::parser::{MAX_EXPRESSION_DEPTH, parse_program};

    fn params_of(call: &str) -> Vec<Expression> {
        let program = parse_program(&format!("OPENQASM 2.0;\n{call}")).unwrap();
        match program.statements.into_iter().next().unwrap().statement {
            Statement::Op(QuantumOp::Gate { params, .. }) => params,
            other => panic!("expected gate call, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence() {
        let params = params_of("rz(1 + pi/2) q[0];");
        let Expression::BinOp { op, right, .. } = &params[0] else {
            panic!("expected binary op");
        };
        assert_eq!(*op, BinOp::Add);
        assert!(matches!(**right, Expression::BinOp { op: BinOp::Div, .. }));
    }

    #[test]
    fn test_nesting_within_limit() {
        let depth = MAX_EXPRESSION_DEPTH - 2;
        let params = params_of(&format!("rz({}0{}) q[0];", "(".repeat(depth), ")".repeat(depth)));
        assert_eq!(params, vec![Expression::Int(0)]);
    }

    #[test]
    fn test_deep_nesting_rejected() {
        for expr in [
            format!("{}0{}", "(".repeat(200_000), ")".repeat(200_000)),
            format!("{}1", "-".repeat(10_000)),
            format!("sin({}0{})", "cos(".repeat(500), ")".repeat(500)),
            "2^".repeat(1_000) + "2",
        ] {
            let err = parse_program(&format!("OPENQASM 2.0;\nrz({expr}) q[0];")).unwrap_err();
            assert!(
                matches!(err, ParseError::InvalidExpression { line: 2, ref message } if message.contains("nested too deeply")),
                "unexpected error: {err}"
            );
        }
    }

    #[test]
    fn test_negation_and_functions() {
        let params = params_of("u3(-pi, cos(0), 2^-1) q[0];");
        assert_eq!(params.len(), 3);
        assert!(matches!(params[0], Expression::Neg(_)));
        assert!(matches!(params[1], Expression::Call { ref function, .. } if function == "cos"));
        assert!(matches!(params[2], Expression::BinOp { op: BinOp::Pow, .. }));
    }
}
