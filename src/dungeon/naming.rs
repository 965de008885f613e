//! # Template Naming Convention
//!
//! Template file names follow `TYPE_NAME_STATE[_WEIGHT].schematic`. Names that
//! fail any check are still registered, but only as untagged templates.

use super::DungeonPack;
use crate::config::{
    DEFAULT_DUNGEON_WEIGHT, MAX_DUNGEON_WEIGHT, MIN_DUNGEON_WEIGHT, SCHEMATIC_FILE_EXTENSION,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches the NAME segment of a template file name.
static SCHEMATIC_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("Invalid schematic name regex"));

/// Reasons a template file name fails the naming convention.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("missing .schematic extension")]
    MissingExtension,

    #[error("expected 3 or 4 underscore-separated parts, found {0}")]
    WrongSegmentCount(usize),

    #[error("type {0:?} is not declared by the pack")]
    UnknownType(String),

    #[error("name {0:?} contains invalid characters")]
    InvalidName(String),

    #[error("state {0:?} is neither open nor closed")]
    InvalidState(String),

    #[error("weight {0:?} is not an integer in [1, 10000]")]
    InvalidWeight(String),

    #[error("no dungeon pack is available to validate against")]
    NoPack,
}

/// The parts of a valid template file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateName {
    pub type_name: String,
    pub name: String,
    pub is_open: bool,
    pub weight: u32,
}

/// Parses and validates a template file name against a pack's declared types.
///
/// # Examples
///
/// ```
/// use pocketdim::{parse_template_name, DungeonPack, DungeonPackConfig, PackId};
///
/// let config = DungeonPackConfig::new("MAZES", ["Maze"]);
/// let pack = DungeonPack::new(PackId(0), config);
///
/// let parsed = parse_template_name("Maze_Hall1_open_250.schematic", &pack).unwrap();
/// assert_eq!(parsed.type_name, "Maze");
/// assert_eq!(parsed.weight, 250);
/// assert!(parsed.is_open);
///
/// assert!(parse_template_name("Maze_Hall1_sideways.schematic", &pack).is_err());
/// ```
pub fn parse_template_name(file_name: &str, pack: &DungeonPack) -> Result<TemplateName, NameError> {
    let stem = file_name
        .strip_suffix(SCHEMATIC_FILE_EXTENSION)
        .ok_or(NameError::MissingExtension)?;

    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 3 || parts.len() > 4 {
        return Err(NameError::WrongSegmentCount(parts.len()));
    }

    let type_name = parts[0];
    if !pack.is_known_type(type_name) {
        return Err(NameError::UnknownType(type_name.to_string()));
    }

    let name = parts[1];
    if !SCHEMATIC_NAME_PATTERN.is_match(name) {
        return Err(NameError::InvalidName(name.to_string()));
    }

    let state = parts[2];
    let is_open = if state.eq_ignore_ascii_case("open") {
        true
    } else if state.eq_ignore_ascii_case("closed") {
        false
    } else {
        return Err(NameError::InvalidState(state.to_string()));
    };

    let weight = match parts.get(3) {
        Some(raw) => parse_weight(raw)?,
        None => DEFAULT_DUNGEON_WEIGHT,
    };

    Ok(TemplateName {
        type_name: type_name.to_string(),
        name: name.to_string(),
        is_open,
        weight,
    })
}

fn parse_weight(raw: &str) -> Result<u32, NameError> {
    // Parse wide so out-of-range and negative values fail the range check, not the parse.
    let weight: i64 = raw
        .parse()
        .map_err(|_| NameError::InvalidWeight(raw.to_string()))?;
    if weight < i64::from(MIN_DUNGEON_WEIGHT) || weight > i64::from(MAX_DUNGEON_WEIGHT) {
        return Err(NameError::InvalidWeight(raw.to_string()));
    }
    Ok(weight as u32)
}
