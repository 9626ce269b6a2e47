//! Board file loading

use super::elements::{Board, Element};
use super::grid::GridSize;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawBoard {
    grid: GridSize,
    #[serde(default)]
    elements: BTreeMap<String, RawElement>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: serde_yaml::Value,
}

/// Load a board snapshot from a YAML file
pub fn load_board_from_file<P: AsRef<Path>>(path: P) -> Result<Board> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read board file: {}", path.as_ref().display()))?;

    parse_board_from_str(&content)
        .with_context(|| format!("Failed to parse board file: {}", path.as_ref().display()))
}

/// Parse a board snapshot from YAML text
pub fn parse_board_from_str(content: &str) -> Result<Board> {
    let raw: RawBoard = serde_yaml::from_str(content).context("Board document is not valid YAML")?;

    let mut board = Board::new(raw.grid);
    for (id, element) in raw.elements {
        let element = Element::from_raw(&element.kind, element.value)
            .with_context(|| format!("Element '{id}'"))?;
        board.elements.insert(id, element);
    }

    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EXAMPLE: &str = "\
grid:
  width: 9
  height: 9
elements:
  e1:
    type: grid
  e2:
    type: box
  e3:
    type: givens
    value:
      0: 5
      10: 3
  e4:
    type: littleKiller
    value:
      19: 6
";

    #[test]
    fn test_parse_example_board() {
        let board = parse_board_from_str(EXAMPLE).unwrap();
        assert_eq!(board.grid, GridSize::square(9));
        assert_eq!(board.elements.len(), 4);
        assert_eq!(board.elements["e1"], Element::Grid);
        assert_eq!(board.digit_map().get(&10), Some(&3));
    }

    #[test]
    fn test_unknown_element_parses_as_unknown() {
        let board = parse_board_from_str(
            "grid: {width: 9, height: 9}\nelements:\n  x: {type: fog}\n",
        )
        .unwrap();
        assert_eq!(board.elements["x"], Element::Unknown("fog".to_string()));
    }

    #[test]
    fn test_elements_are_optional() {
        let board = parse_board_from_str("grid: {width: 4, height: 4}\n").unwrap();
        assert!(board.elements.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXAMPLE.as_bytes()).unwrap();

        let board = load_board_from_file(file.path()).unwrap();
        assert_eq!(board.grid.side(), 9);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_board_from_file("does/not/exist.yaml");
        assert!(result.is_err());
    }
}
