//! Abstract Syntax Tree types for the beamline description language.

use std::collections::HashMap;

/// Complete AST representation of a parsed beamline.
#[derive(Debug, Clone, Default)]
pub struct BeamlineAst {
    /// Element entries in beam order
    pub elements: Vec<ElementDef>,
    /// Phase-space dimension from `.dimension` (4 or 6)
    pub dimension: Option<usize>,
    /// Lorentz factor from `.gamma`
    pub gamma: Option<f64>,
}

impl BeamlineAst {
    /// Create a new empty beamline AST.
    pub fn new() -> Self {
        Self::default()
    }
}

/// An element entry from the description.
#[derive(Debug, Clone)]
pub struct ElementDef {
    /// Element type keyword
    pub element_type: ElementType,
    /// Unique element name
    pub name: String,
    /// Length along the reference orbit (m)
    pub length: f64,
    /// Named parameters (`k`, `angle`, `e1`, `e2`, `thin`)
    pub params: HashMap<String, f64>,
    /// Source line number for error reporting
    pub line: usize,
}

/// Element types supported by the description language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    /// Field-free drift
    Drift,
    /// Horizontally focusing quadrupole
    FocusingQuad,
    /// Horizontally defocusing quadrupole
    DefocusingQuad,
    /// Sector bend (faces perpendicular to the orbit unless given)
    SectorBend,
    /// Rectangular bend (faces at half the bend angle unless given)
    RectangularBend,
}

impl ElementType {
    /// Parse an element type from its keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "DRIFT" | "D" | "O" => Some(Self::Drift),
            "QF" => Some(Self::FocusingQuad),
            "QD" | "QDF" => Some(Self::DefocusingQuad),
            "SBEND" | "BEND" | "DIPOLE" => Some(Self::SectorBend),
            "RBEND" => Some(Self::RectangularBend),
            _ => None,
        }
    }

    /// Parameter names accepted by this element type.
    pub fn allowed_params(&self) -> &'static [&'static str] {
        match self {
            Self::Drift => &[],
            Self::FocusingQuad | Self::DefocusingQuad => &["k", "thin"],
            Self::SectorBend | Self::RectangularBend => &["angle", "e1", "e2"],
        }
    }
}
