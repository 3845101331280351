//! Beamline description language.
//!
//! A small line-oriented language for writing down a beamline: one element
//! per line, in beam order, with optional directives for the phase-space
//! dimension.
//!
//! # Grammar Overview
//!
//! ```text
//! beamline  = { line }
//! line      = comment | directive | element | empty
//! comment   = ('#' | ';') { any_char }
//! directive = '.dimension' ('4' | '6') | '.gamma' number
//! element   = keyword name length { param '=' number }
//!
//! keyword   = "DRIFT" | "QF" | "QD" | "SBEND" | "RBEND"
//! param     = "k" | "thin" | "angle" | "e1" | "e2"
//! number    = ['-' | '+'] digit+ ['.' digit*] [('e'|'E') ['-'|'+'] digit+]
//! name      = (letter | '_') { letter | digit | '_' }
//! ```
//!
//! # Element Types
//!
//! | Keyword | Description | Parameters |
//! |---------|-------------|------------|
//! | DRIFT (D, O) | Field-free drift | none |
//! | QF | Horizontally focusing quadrupole | `k` (default 0), `thin` |
//! | QD (QDF) | Horizontally defocusing quadrupole | `k` (default 0), `thin` |
//! | SBEND (BEND, DIPOLE) | Sector bend | `angle` (required), `e1`, `e2` |
//! | RBEND | Rectangular bend, faces default to `angle/2` | `angle` (required), `e1`, `e2` |
//!
//! The length of a bend is its full arc length.
//!
//! # Example
//!
//! ```text
//! # Symmetric quadrupole triplet
//! DRIFT D0  1.0
//! QF    Q1  0.5  k=2.0
//! DRIFT D1  1.0
//! QD    Q2  0.5  k=2.0
//! DRIFT D2  1.0
//! QF    Q3  0.5  k=2.0
//! DRIFT D3  1.0
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a beamline description string into an AST.
pub fn parse(input: &str) -> Result<BeamlineAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a beamline description file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<BeamlineAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::OpticsError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
