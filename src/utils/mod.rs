//! # Utilities Module
//!
//! Small helpers for random number generation and resource path handling.

use crate::config::SCHEMATIC_FILE_EXTENSION;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

/// Creates a seeded random number generator.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Gets the final component of a resource path.
///
/// Bundled resource paths always use `/`; custom paths use the platform
/// separator. Both are handled.
pub fn file_name(path: &str) -> Option<&str> {
    let name = Path::new(path).file_name()?.to_str()?;
    // Bundled paths may still carry a `/` on platforms whose separator differs.
    Some(name.rsplit('/').next().unwrap_or(name))
}

/// Gets a template's display name: its file name without the schematic extension.
///
/// # Examples
///
/// ```
/// use pocketdim::template_name;
///
/// assert_eq!(template_name("/schematics/ruins/Hub_Atrium_open.schematic"), "Hub_Atrium_open");
/// assert_eq!(template_name("notes.txt"), "notes.txt");
/// ```
pub fn template_name(path: &str) -> &str {
    let name = file_name(path).unwrap_or(path);
    name.strip_suffix(SCHEMATIC_FILE_EXTENSION).unwrap_or(name)
}

/// Checks whether a path names a schematic resource.
pub fn is_schematic(path: &str) -> bool {
    file_name(path).is_some_and(|name| name.ends_with(SCHEMATIC_FILE_EXTENSION))
}
