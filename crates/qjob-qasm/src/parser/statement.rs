//! Statement parsing for OpenQASM 2.

use super::Parser;
use crate::ast::{Argument, GateBodyOp, GateDef, Located, QuantumOp, Statement};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    pub(super) fn statement(&mut self) -> ParseResult<Located> {
        let line = self.line();
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("statement".into()))?;

        let statement = match token {
            Token::Include => self.include()?,
            Token::QReg => {
                self.advance();
                let (name, size) = self.register_decl()?;
                Statement::QReg { name, size }
            }
            Token::CReg => {
                self.advance();
                let (name, size) = self.register_decl()?;
                Statement::CReg { name, size }
            }
            Token::Gate => Statement::GateDef(self.gate_def()?),
            Token::Opaque => self.opaque()?,
            Token::If => self.if_statement()?,
            Token::Measure | Token::Reset | Token::Barrier | Token::Identifier(_) => {
                Statement::Op(self.quantum_op()?)
            }
            other => {
                return Err(ParseError::UnexpectedToken {
                    line,
                    expected: "statement".into(),
                    found: other.to_string(),
                });
            }
        };

        Ok(Located { line, statement })
    }

    fn include(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Include)?;
        let line = self.line();
        let file = match self.advance() {
            Some(Token::StringLiteral(s)) => s,
            Some(other) => {
                return Err(ParseError::UnexpectedToken {
                    line,
                    expected: "file name string".into(),
                    found: other.to_string(),
                });
            }
            None => return Err(ParseError::UnexpectedEof("file name string".into())),
        };
        self.expect(Token::Semicolon)?;
        Ok(Statement::Include(file))
    }

    /// `name[size];` after `qreg`/`creg`.
    fn register_decl(&mut self) -> ParseResult<(String, u64)> {
        let name = self.identifier()?;
        self.expect(Token::LBracket)?;
        let size = self.int_literal()?;
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;
        Ok((name, size))
    }

    fn gate_def(&mut self) -> ParseResult<GateDef> {
        self.expect(Token::Gate)?;
        let name = self.identifier()?;
        let params = if self.consume(&Token::LParen) {
            let params = if self.check(&Token::RParen) {
                vec![]
            } else {
                self.identifier_list()?
            };
            self.expect(Token::RParen)?;
            params
        } else {
            vec![]
        };
        let qubits = self.identifier_list()?;

        self.expect(Token::LBrace)?;
        let mut body = Vec::new();
        while !self.consume(&Token::RBrace) {
            if self.is_eof() {
                return Err(ParseError::UnexpectedEof("'}'".into()));
            }
            body.push(self.gate_body_op()?);
        }

        Ok(GateDef {
            name,
            params,
            qubits,
            body,
        })
    }

    fn gate_body_op(&mut self) -> ParseResult<GateBodyOp> {
        if self.consume(&Token::Barrier) {
            let qubits = self.identifier_list()?;
            self.expect(Token::Semicolon)?;
            return Ok(GateBodyOp::Barrier(qubits));
        }
        let name = self.identifier()?;
        let params = self.optional_params()?;
        let qubits = self.identifier_list()?;
        self.expect(Token::Semicolon)?;
        Ok(GateBodyOp::Call {
            name,
            params,
            qubits,
        })
    }

    fn opaque(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Opaque)?;
        let name = self.identifier()?;
        if self.consume(&Token::LParen) {
            if !self.check(&Token::RParen) {
                self.identifier_list()?;
            }
            self.expect(Token::RParen)?;
        }
        self.identifier_list()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Opaque { name })
    }

    /// `if (creg == value) op`
    fn if_statement(&mut self) -> ParseResult<Statement> {
        self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        let register = self.identifier()?;
        self.expect(Token::EqEq)?;
        let value = self.int_literal()?;
        self.expect(Token::RParen)?;
        let op = self.quantum_op()?;
        Ok(Statement::If {
            register,
            value,
            op,
        })
    }

    pub(super) fn quantum_op(&mut self) -> ParseResult<QuantumOp> {
        let op = match self.peek() {
            Some(Token::Measure) => {
                self.advance();
                let qubit = self.argument()?;
                self.expect(Token::Arrow)?;
                let clbit = self.argument()?;
                QuantumOp::Measure { qubit, clbit }
            }
            Some(Token::Reset) => {
                self.advance();
                QuantumOp::Reset(self.argument()?)
            }
            Some(Token::Barrier) => {
                self.advance();
                QuantumOp::Barrier(self.argument_list()?)
            }
            _ => {
                let name = self.identifier()?;
                let params = self.optional_params()?;
                let args = self.argument_list()?;
                QuantumOp::Gate { name, params, args }
            }
        };
        self.expect(Token::Semicolon)?;
        Ok(op)
    }

    fn optional_params(&mut self) -> ParseResult<Vec<crate::ast::Expression>> {
        if !self.consume(&Token::LParen) {
            return Ok(vec![]);
        }
        let params = self.expression_list()?;
        self.expect(Token::RParen)?;
        Ok(params)
    }

    fn argument(&mut self) -> ParseResult<Argument> {
        let register = self.identifier()?;
        let index = if self.consume(&Token::LBracket) {
            let index = self.int_literal()?;
            self.expect(Token::RBracket)?;
            Some(index)
        } else {
            None
        };
        Ok(Argument { register, index })
    }

    fn argument_list(&mut self) -> ParseResult<Vec<Argument>> {
        let mut args = vec![self.argument()?];
        while self.consume(&Token::Comma) {
            args.push(self.argument()?);
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{GateBodyOp, QuantumOp, Statement};
    use crate::parser::parse_program;

    fn statements(body: &str) -> Vec<Statement> {
        parse_program(&format!("OPENQASM 2.0;\n{body}"))
            .unwrap()
            .statements
            .into_iter()
            .map(|l| l.statement)
            .collect()
    }

    #[test]
    fn test_gate_definition() {
        let stmts = statements("gate majority(theta) a, b, c { cx c, b; rz(theta/2) a; barrier a, b; }");
        let Statement::GateDef(def) = &stmts[0] else {
            panic!("expected gate definition");
        };
        assert_eq!(def.name, "majority");
        assert_eq!(def.params, vec!["theta"]);
        assert_eq!(def.qubits, vec!["a", "b", "c"]);
        assert_eq!(def.body.len(), 3);
        assert!(matches!(def.body[2], GateBodyOp::Barrier(ref q) if q.len() == 2));
    }

    #[test]
    fn test_conditional() {
        let stmts = statements("qreg q[1]; creg c[1]; if (c == 1) x q[0];");
        assert!(matches!(
            &stmts[2],
            Statement::If { register, value: 1, op: QuantumOp::Gate { name, .. } }
                if register == "c" && name == "x"
        ));
    }

    #[test]
    fn test_whole_register_arguments() {
        let stmts = statements("qreg q[2]; creg c[2]; h q; measure q -> c;");
        assert!(matches!(
            &stmts[2],
            Statement::Op(QuantumOp::Gate { args, .. }) if args[0].index.is_none()
        ));
    }

    #[test]
    fn test_unclosed_gate_body() {
        assert!(parse_program("OPENQASM 2.0;\ngate g a { x a;").is_err());
    }
}
