//! Recursive-descent parser for OpenQASM 2.

mod expression;
mod statement;

use crate::ast::Program;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token, tokenize};

/// Parse an OpenQASM 2 source string into an AST.
pub fn parse_program(source: &str) -> ParseResult<Program> {
    let mut parser = Parser::new(source)?;
    parser.program()
}

/// Parser state.
pub(super) struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    /// Current expression nesting, bounded by [`MAX_EXPRESSION_DEPTH`].
    depth: usize,
}

/// Deepest nesting of parentheses, signs and powers within one expression.
pub(super) const MAX_EXPRESSION_DEPTH: usize = 64;

#[allow(clippy::needless_pass_by_value)]
impl Parser {
    fn new(source: &str) -> ParseResult<Self> {
        let mut tokens = Vec::new();
        for result in tokenize(source) {
            match result {
                Ok(t) => tokens.push(t),
                Err(failure) => {
                    return Err(ParseError::LexerError {
                        line: failure.line,
                        message: failure.message,
                    });
                }
            }
        }
        Ok(Self {
            tokens,
            pos: 0,
            depth: 0,
        })
    }

    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Line of the current token, or of the last token at end of input.
    pub(super) fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    pub(super) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    pub(super) fn expect(&mut self, expected: Token) -> ParseResult<()> {
        let line = self.line();
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("'{expected}'")))?;

        if std::mem::discriminant(&found) != std::mem::discriminant(&expected) {
            return Err(ParseError::UnexpectedToken {
                line,
                expected: format!("'{expected}'"),
                found: found.to_string(),
            });
        }
        Ok(())
    }

    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn program(&mut self) -> ParseResult<Program> {
        if !self.check(&Token::OpenQasm) {
            return Err(ParseError::MissingHeader);
        }
        self.advance();
        let version = self.version()?;
        self.expect(Token::Semicolon)?;

        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.statement()?);
        }

        Ok(Program {
            version,
            statements,
        })
    }

    fn version(&mut self) -> ParseResult<String> {
        let version = match self.advance() {
            Some(Token::RealLiteral(v)) => v,
            #[allow(clippy::cast_precision_loss)]
            Some(Token::IntLiteral(v)) => v as f64,
            Some(other) => return Err(ParseError::InvalidVersion(other.to_string())),
            None => return Err(ParseError::UnexpectedEof("version number".into())),
        };
        if !(2.0..3.0).contains(&version) {
            return Err(ParseError::InvalidVersion(format!("{version:.1}")));
        }
        Ok(format!("{version:.1}"))
    }

    pub(super) fn identifier(&mut self) -> ParseResult<String> {
        let line = self.line();
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s),
            Some(other) => Err(ParseError::UnexpectedToken {
                line,
                expected: "identifier".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("identifier".into())),
        }
    }

    pub(super) fn identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut ids = vec![self.identifier()?];
        while self.consume(&Token::Comma) {
            ids.push(self.identifier()?);
        }
        Ok(ids)
    }

    pub(super) fn int_literal(&mut self) -> ParseResult<u64> {
        let line = self.line();
        match self.advance() {
            Some(Token::IntLiteral(v)) => Ok(v),
            Some(other) => Err(ParseError::UnexpectedToken {
                line,
                expected: "integer".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("integer".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Argument, QuantumOp, Statement};

    #[test]
    fn test_parse_default_program() {
        let program = parse_program(
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[1];\ncreg c[1];\nx q[0];\nmeasure q[0] -> c[0];",
        )
        .unwrap();
        assert_eq!(program.version, "2.0");
        assert_eq!(program.statements.len(), 5);
        assert_eq!(program.statements[4].line, 6);
        assert_eq!(
            program.statements[4].statement,
            Statement::Op(QuantumOp::Measure {
                qubit: Argument {
                    register: "q".into(),
                    index: Some(0)
                },
                clbit: Argument {
                    register: "c".into(),
                    index: Some(0)
                },
            })
        );
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            parse_program("qreg q[1];"),
            Err(ParseError::MissingHeader)
        ));
        assert!(matches!(parse_program(""), Err(ParseError::MissingHeader)));
    }

    #[test]
    fn test_version_three_rejected() {
        assert!(matches!(
            parse_program("OPENQASM 3.0; qubit q;"),
            Err(ParseError::InvalidVersion(v)) if v == "3.0"
        ));
    }

    #[test]
    fn test_missing_semicolon_reports_line() {
        let err = parse_program("OPENQASM 2.0;\nqreg q[1]\nx q[0];").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { line: 3, .. }), "{err}");
    }

    #[test]
    fn test_truncated_input() {
        assert!(matches!(
            parse_program("OPENQASM 2.0;\nqreg q["),
            Err(ParseError::UnexpectedEof(_))
        ));
    }
}
