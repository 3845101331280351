//! Error types for the ionoptics beam transport engine.
//!
//! This module provides a unified error type [`OpticsError`] that covers
//! all error conditions that can occur during beamline parsing, transfer
//! matrix evaluation, thick-to-thin reduction, and strength optimization.

use thiserror::Error;

use crate::matrix::Plane;

/// Result type alias using [`OpticsError`].
pub type Result<T> = std::result::Result<T, OpticsError>;

/// Unified error type for all ionoptics operations.
#[derive(Error, Debug)]
pub enum OpticsError {
    // ============ Beamline Description Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid element definition
    #[error("Invalid element '{name}' at line {line}: {message}")]
    InvalidElement {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown element keyword
    #[error("Unknown element type '{keyword}' at line {line}")]
    UnknownElementType { keyword: String, line: usize },

    /// Duplicate element name
    #[error("Duplicate element name '{name}'")]
    DuplicateElement { name: String },

    // ============ Optics Errors ============
    /// Length, radius or angle input that makes an element matrix undefined
    #[error("Invalid geometry: {message}")]
    InvalidGeometry { message: String },

    /// Principal planes requested for a plane without angle coupling
    #[error("Degenerate optics in the {plane} plane: no angle coupling (M21 = 0), principal planes are undefined")]
    DegenerateOptics { plane: Plane },

    /// Inconsistent beamline or matrix list
    #[error("Malformed beamline: {message}")]
    MalformedBeamline { message: String },

    /// Invalid parameter value
    #[error("Invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // ============ Optimization Errors ============
    /// Strength search did not reach the imaging condition
    #[error("Strength optimization did not converge after {iterations} iterations (residual: {residual:.2e}, {reason})")]
    ConvergenceFailure {
        iterations: u64,
        residual: f64,
        reason: String,
    },

    /// Internal minimizer failure
    #[error("Minimizer error: {message}")]
    Minimizer { message: String },

    // ============ I/O Errors ============
    /// Error reading a beamline file
    #[error("Failed to read beamline file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing results
    #[error("Output error: {message}")]
    OutputError { message: String },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl OpticsError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid element error
    pub fn invalid_element(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidElement {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an invalid geometry error
    pub fn geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    /// Create a malformed beamline error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedBeamline {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a convergence failure error
    pub fn convergence_failure(iterations: u64, residual: f64, reason: impl Into<String>) -> Self {
        Self::ConvergenceFailure {
            iterations,
            residual,
            reason: reason.into(),
        }
    }
}

impl From<argmin::core::Error> for OpticsError {
    fn from(e: argmin::core::Error) -> Self {
        // Cost-function failures travel through argmin boxed; recover them.
        match e.downcast::<OpticsError>() {
            Ok(inner) => inner,
            Err(other) => Self::Minimizer {
                message: other.to_string(),
            },
        }
    }
}
