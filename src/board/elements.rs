//! Board elements: constraint definitions attached to a grid

use super::grid::{DigitMap, GridSize};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Ordered cell sequences keyed by an opaque line id
pub type LineMap = BTreeMap<String, Vec<usize>>;

/// An arrow: digits on the shaft sum to the digit(s) in the circle
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArrowLine {
    pub circle: Vec<usize>,
    pub arrow: Vec<usize>,
}

/// A killer cage: cells with an optional sum clue
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Cage {
    pub cells: Vec<usize>,
    #[serde(default)]
    pub sum: Option<i64>,
}

/// A clone constraint: two regions that must hold identical digits
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloneRegion {
    pub source: Vec<usize>,
    pub target: Vec<usize>,
}

/// One constraint element of a board snapshot.
///
/// The variant set mirrors the editor's element palette. Kinds the solver
/// core does not encode are still parsed so the feasibility gate can accept
/// them and the warning evaluator can check the ones with local rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Row, column and cell uniqueness
    Grid,
    /// Box uniqueness (square box layout)
    Box,
    /// Box-position uniqueness across all boxes
    DisjointGroups(bool),
    /// Fixed digits placed by the puzzle setter
    Givens(DigitMap),
    /// Digits entered by the solver-user; identical semantics to givens
    Filled(DigitMap),
    /// Diagonal sums, keyed by diagonal index; `None` clues carry no sum
    LittleKiller(BTreeMap<usize, Option<i64>>),
    /// Strictly increasing lines, bulb to tip
    Thermo(LineMap),
    /// Non-decreasing lines, bulb to tip
    SlowThermo(LineMap),
    /// Interior digits lie strictly between the two line ends
    Between(LineMap),
    /// Interior digits sum to the sum of the two line ends
    DoubleArrow(LineMap),
    /// Interior digits avoid the closed range spanned by the two ends
    Lockout(LineMap),
    /// Digit sequence reads the same from both ends
    Palindrome(LineMap),
    /// Adjacent digits differ by at least half the digit range
    Whisper(LineMap),
    /// Adjacent digits differ by at least half the digit range minus one
    DutchWhisper(LineMap),
    /// Consecutive digits in some order
    Renban(LineMap),
    Arrow(BTreeMap<String, ArrowLine>),
    Killer(BTreeMap<String, Cage>),
    Clone(BTreeMap<String, CloneRegion>),
    Quadruple(BTreeMap<usize, Vec<u8>>),
    /// Pencil-mark annotation; no constraint semantics
    Corner,
    /// Pencil-mark annotation; no constraint semantics
    Center,
    /// Cell coloring annotation; no constraint semantics
    Colors,
    /// Unrecognized element tag, kept for the feasibility gate
    Unknown(String),
}

impl Element {
    /// Build a typed element from a raw `(type, value)` pair
    pub fn from_raw(kind: &str, value: Value) -> Result<Self> {
        let element = match kind {
            "grid" => Element::Grid,
            "box" => Element::Box,
            "disjointGroups" => Element::DisjointGroups(truthy(&value)),
            "givens" => Element::Givens(parse_payload(kind, value)?),
            "filled" => Element::Filled(parse_payload(kind, value)?),
            "littleKiller" => Element::LittleKiller(parse_little_killer(value)),
            "thermo" => Element::Thermo(parse_payload(kind, value)?),
            "slowThermo" => Element::SlowThermo(parse_payload(kind, value)?),
            "between" => Element::Between(parse_payload(kind, value)?),
            "doubleArrow" => Element::DoubleArrow(parse_payload(kind, value)?),
            "lockout" => Element::Lockout(parse_payload(kind, value)?),
            "palindrome" => Element::Palindrome(parse_payload(kind, value)?),
            "whisper" => Element::Whisper(parse_payload(kind, value)?),
            "dutchWhisper" => Element::DutchWhisper(parse_payload(kind, value)?),
            "renban" => Element::Renban(parse_payload(kind, value)?),
            "arrow" => Element::Arrow(parse_payload(kind, value)?),
            "killer" => Element::Killer(parse_payload(kind, value)?),
            "clone" => Element::Clone(parse_payload(kind, value)?),
            "quadruple" => Element::Quadruple(parse_payload(kind, value)?),
            "corner" => Element::Corner,
            "center" => Element::Center,
            "colors" => Element::Colors,
            other => Element::Unknown(other.to_string()),
        };
        Ok(element)
    }

    /// The element's type tag
    pub fn kind(&self) -> &str {
        match self {
            Element::Grid => "grid",
            Element::Box => "box",
            Element::DisjointGroups(_) => "disjointGroups",
            Element::Givens(_) => "givens",
            Element::Filled(_) => "filled",
            Element::LittleKiller(_) => "littleKiller",
            Element::Thermo(_) => "thermo",
            Element::SlowThermo(_) => "slowThermo",
            Element::Between(_) => "between",
            Element::DoubleArrow(_) => "doubleArrow",
            Element::Lockout(_) => "lockout",
            Element::Palindrome(_) => "palindrome",
            Element::Whisper(_) => "whisper",
            Element::DutchWhisper(_) => "dutchWhisper",
            Element::Renban(_) => "renban",
            Element::Arrow(_) => "arrow",
            Element::Killer(_) => "killer",
            Element::Clone(_) => "clone",
            Element::Quadruple(_) => "quadruple",
            Element::Corner => "corner",
            Element::Center => "center",
            Element::Colors => "colors",
            Element::Unknown(kind) => kind,
        }
    }

    /// Whether the element is a pure annotation with no constraint semantics
    pub fn is_annotation(&self) -> bool {
        matches!(self, Element::Corner | Element::Center | Element::Colors)
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => false,
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(kind: &str, value: Value) -> Result<T> {
    serde_yaml::from_value(value).with_context(|| format!("Invalid payload for element '{kind}'"))
}

/// Little-killer clues tolerate non-numeric sums: the editor stores a dash
/// for an empty clue, and such entries contribute no constraint.
fn parse_little_killer(value: Value) -> BTreeMap<usize, Option<i64>> {
    let mut clues = BTreeMap::new();
    if let Value::Mapping(mapping) = value {
        for (key, sum) in mapping {
            let Some(diagonal) = key.as_u64() else {
                continue;
            };
            clues.insert(diagonal as usize, sum.as_i64());
        }
    }
    clues
}

/// An immutable board snapshot: grid dimensions plus constraint elements
/// keyed by opaque ids. Element order is not observable; the ordered map
/// only keeps clause emission reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub grid: GridSize,
    pub elements: BTreeMap<String, Element>,
}

impl Board {
    /// Create a board with no elements
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid,
            elements: BTreeMap::new(),
        }
    }

    /// Add an element under the given id (builder style)
    pub fn with_element(mut self, id: &str, element: Element) -> Self {
        self.elements.insert(id.to_string(), element);
        self
    }

    /// The digits currently on the board: givens and filled cells merged,
    /// givens winning on conflict.
    pub fn digit_map(&self) -> DigitMap {
        let mut digits = DigitMap::new();
        for element in self.elements.values() {
            if let Element::Filled(map) = element {
                digits.extend(map.iter().map(|(&cell, &digit)| (cell, digit)));
            }
        }
        for element in self.elements.values() {
            if let Element::Givens(map) = element {
                digits.extend(map.iter().map(|(&cell, &digit)| (cell, digit)));
            }
        }
        digits
    }
}
