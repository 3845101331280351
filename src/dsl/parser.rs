//! Parser for the beamline description language.

use std::collections::{HashMap, HashSet};

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{OpticsError, Result};

/// Parser for beamline descriptions.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire beamline description.
    pub fn parse(&mut self) -> Result<BeamlineAst> {
        let mut ast = BeamlineAst::new();
        let mut names = HashSet::new();

        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let element = self.parse_element()?;
                    if !names.insert(element.name.clone()) {
                        return Err(OpticsError::DuplicateElement { name: element.name });
                    }
                    ast.elements.push(element);
                }
                _ => {
                    return Err(OpticsError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            self.end_of_line()?;
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(OpticsError::parse(
                self.current.line,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            ))
        }
    }

    fn expect_number(&mut self) -> Result<f64> {
        let tok = self.expect(TokenKind::Number)?;
        parse_value(&tok.text)
            .ok_or_else(|| OpticsError::parse(tok.line, format!("invalid number: {}", tok.text)))
    }

    fn end_of_line(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Newline => self.advance(),
            TokenKind::Eof => Ok(()),
            _ => Err(OpticsError::parse(
                self.current.line,
                format!("unexpected trailing token: {:?}", self.current.text),
            )),
        }
    }

    fn parse_directive(&mut self, ast: &mut BeamlineAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".dimension" => {
                let value = self.expect_number()?;
                if value != 4.0 && value != 6.0 {
                    return Err(OpticsError::parse(line, format!("dimension must be 4 or 6, got {}", value)));
                }
                ast.dimension = Some(value as usize);
            }
            ".gamma" => {
                ast.gamma = Some(self.expect_number()?);
            }
            _ => {
                return Err(OpticsError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    fn parse_element(&mut self) -> Result<ElementDef> {
        let keyword = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        let element_type = ElementType::from_keyword(&keyword).ok_or_else(|| {
            OpticsError::UnknownElementType {
                keyword: keyword.clone(),
                line,
            }
        })?;

        let name = self.expect(TokenKind::Identifier)?.text;

        if self.current.kind != TokenKind::Number {
            return Err(OpticsError::invalid_element(&name, line, "expected element length"));
        }
        let length = self.expect_number()?;
        if length < 0.0 {
            return Err(OpticsError::invalid_element(&name, line, "length must be non-negative"));
        }

        // key=value parameters until end of line
        let mut params = HashMap::new();
        while self.current.kind == TokenKind::Identifier {
            let key = self.current.text.to_lowercase();
            self.advance()?;
            self.expect(TokenKind::Equals)?;
            let value = self.expect_number()?;

            if !element_type.allowed_params().contains(&key.as_str()) {
                return Err(OpticsError::invalid_element(
                    &name,
                    line,
                    format!("unknown parameter '{}'", key),
                ));
            }
            params.insert(key, value);
        }

        Ok(ElementDef {
            element_type,
            name,
            length,
            params,
            line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drift() {
        let ast = super::super::parse("DRIFT D1 1.25").unwrap();
        assert_eq!(ast.elements.len(), 1);
        assert_eq!(ast.elements[0].element_type, ElementType::Drift);
        assert_eq!(ast.elements[0].name, "D1");
        assert_eq!(ast.elements[0].length, 1.25);
    }

    #[test]
    fn test_parse_parameters() {
        let ast = super::super::parse("qf Q1 0.5 k=2.0 thin=1\nSBEND B1 1.2 angle=0.3 e1=0.1").unwrap();
        let q = &ast.elements[0];
        assert_eq!(q.element_type, ElementType::FocusingQuad);
        assert_eq!(q.params["k"], 2.0);
        assert_eq!(q.params["thin"], 1.0);
        let b = &ast.elements[1];
        assert_eq!(b.params["angle"], 0.3);
        assert_eq!(b.line, 2);
    }

    #[test]
    fn test_parse_directives() {
        let ast = super::super::parse(".dimension 6\n.gamma 1.5\nDRIFT D1 1.0").unwrap();
        assert_eq!(ast.dimension, Some(6));
        assert_eq!(ast.gamma, Some(1.5));
        assert!(super::super::parse(".dimension 5").is_err());
        assert!(super::super::parse(".optics on").is_err());
    }

    #[test]
    fn test_parse_with_comments() {
        let input = "# FODO cell\nQF Q1 0.5 k=1 ; inline comment style\n\nDRIFT D1 1.0\n";
        let ast = super::super::parse(input).unwrap();
        assert_eq!(ast.elements.len(), 2);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            super::super::parse("SOLENOID S1 1.0"),
            Err(OpticsError::UnknownElementType { .. })
        ));
        assert!(matches!(
            super::super::parse("DRIFT D1 1.0\nDRIFT D1 2.0"),
            Err(OpticsError::DuplicateElement { .. })
        ));
        assert!(matches!(
            super::super::parse("DRIFT D1 -1.0"),
            Err(OpticsError::InvalidElement { .. })
        ));
        assert!(matches!(
            super::super::parse("DRIFT D1 1.0 k=2"),
            Err(OpticsError::InvalidElement { .. })
        ));
        assert!(matches!(
            super::super::parse("QF Q1"),
            Err(OpticsError::InvalidElement { .. })
        ));
    }
}
