//! # Pack Configuration
//!
//! Each pack directory carries a `rules.json` file declaring the pack's types,
//! its switching settings and the chain rules used to pick the next type.
//!
//! ```json
//! {
//!   "version": 1,
//!   "types": ["Hub", "Maze", "Trap", "Exit"],
//!   "settings": {
//!     "allow_switch_in": true,
//!     "allow_switch_out": true,
//!     "allow_duplicates_in_chain": false,
//!     "pack_weight": 100
//!   },
//!   "rules": [
//!     { "condition": ["Hub", "Maze"], "products": [{ "type": "Exit", "weight": 60 }] },
//!     { "condition": [], "products": [{ "type": "Hub" }, { "type": "Maze", "weight": 250 }] }
//!   ]
//! }
//! ```

use crate::config::{DEFAULT_DUNGEON_WEIGHT, DEFAULT_PACK_WEIGHT, MAX_DUNGEON_WEIGHT, MIN_DUNGEON_WEIGHT};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Typed failure of loading a pack configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration resource does not exist
    #[error("could not find a dungeon pack config file: {0}")]
    NotFound(String),

    /// The configuration resource exists but cannot be used
    #[error("malformed dungeon pack config {path}: {reason}")]
    Malformed { path: String, reason: String },
}

/// Switching and duplication settings of a pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackSettings {
    /// Whether selection may switch into this pack from another one
    pub allow_switch_in: bool,
    /// Whether selection may switch out of this pack into another one
    pub allow_switch_out: bool,
    /// Whether a template may repeat within one chain and its subtree
    pub allow_duplicates_in_chain: bool,
    /// Weight of this pack when another pack switches out
    pub pack_weight: u32,
}

impl Default for PackSettings {
    fn default() -> Self {
        Self {
            allow_switch_in: true,
            allow_switch_out: true,
            allow_duplicates_in_chain: true,
            pack_weight: DEFAULT_PACK_WEIGHT,
        }
    }
}

/// One weighted outcome of a chain rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleProduct {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_product_weight")]
    pub weight: u32,
}

fn default_product_weight() -> u32 {
    DEFAULT_DUNGEON_WEIGHT
}

/// Picks the type of the next template from the types of the chain so far.
///
/// The condition lists type names oldest first and matches when the chain's
/// most recent types equal it. An empty condition matches every chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRule {
    #[serde(default)]
    pub condition: Vec<String>,
    pub products: Vec<RuleProduct>,
}

impl ChainRule {
    pub fn new(condition: &[&str], products: &[(&str, u32)]) -> Self {
        Self {
            condition: condition.iter().map(|name| name.to_string()).collect(),
            products: products
                .iter()
                .map(|(name, weight)| RuleProduct {
                    type_name: name.to_string(),
                    weight: *weight,
                })
                .collect(),
        }
    }

    /// Checks whether the tail of a chronological type history equals the condition.
    ///
    /// # Examples
    ///
    /// ```
    /// use pocketdim::ChainRule;
    ///
    /// let rule = ChainRule::new(&["Hub", "Maze"], &[("Exit", 10)]);
    /// assert!(rule.matches(&["Trap", "Hub", "Maze"]));
    /// assert!(!rule.matches(&["Maze", "Hub"]));
    /// assert!(!rule.matches(&["Maze"]));
    /// ```
    pub fn matches<S: AsRef<str>>(&self, type_history: &[S]) -> bool {
        if self.condition.len() > type_history.len() {
            return false;
        }
        let tail = &type_history[type_history.len() - self.condition.len()..];
        self.condition
            .iter()
            .zip(tail)
            .all(|(expected, actual)| expected == actual.as_ref())
    }
}

fn default_version() -> u32 {
    1
}

/// Parsed configuration of one dungeon pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonPackConfig {
    /// Set from the pack directory, never from the file
    #[serde(skip)]
    name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub types: Vec<String>,
    #[serde(default)]
    pub settings: PackSettings,
    #[serde(default)]
    pub rules: Vec<ChainRule>,
}

impl DungeonPackConfig {
    /// Creates a config with default settings and no rules.
    pub fn new<I, S>(name: impl Into<String>, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            version: default_version(),
            types: types.into_iter().map(Into::into).collect(),
            settings: PackSettings::default(),
            rules: Vec::new(),
        }
    }

    /// Creates a config for testing with every setting spelled out.
    pub fn for_testing(name: &str, types: &[&str], allow_switch_in: bool, allow_switch_out: bool, pack_weight: u32) -> Self {
        let mut config = Self::new(name, types.iter().copied());
        config.settings = PackSettings {
            allow_switch_in,
            allow_switch_out,
            allow_duplicates_in_chain: true,
            pack_weight,
        };
        config
    }

    /// Parses and validates a config from JSON text.
    ///
    /// `path` only labels errors.
    pub fn from_json_str(text: &str, path: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|e| ConfigError::Malformed {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Checks the declared types, weights and rules for consistency.
    pub fn validate(&self, path: &str) -> Result<(), ConfigError> {
        let malformed = |reason: String| ConfigError::Malformed {
            path: path.to_string(),
            reason,
        };

        if self.types.is_empty() {
            return Err(malformed("no dungeon types declared".to_string()));
        }

        let mut declared = HashSet::new();
        for type_name in &self.types {
            if type_name.is_empty() || type_name.contains('_') {
                return Err(malformed(format!("invalid type name {:?}", type_name)));
            }
            if !declared.insert(type_name.as_str()) {
                return Err(malformed(format!("type {:?} declared twice", type_name)));
            }
        }

        if !(MIN_DUNGEON_WEIGHT..=MAX_DUNGEON_WEIGHT).contains(&self.settings.pack_weight) {
            return Err(malformed(format!(
                "pack weight {} is outside [{}, {}]",
                self.settings.pack_weight, MIN_DUNGEON_WEIGHT, MAX_DUNGEON_WEIGHT
            )));
        }

        for (index, rule) in self.rules.iter().enumerate() {
            if rule.products.is_empty() {
                return Err(malformed(format!("rule {} has no products", index)));
            }
            for type_name in &rule.condition {
                if !declared.contains(type_name.as_str()) {
                    return Err(malformed(format!(
                        "rule {} uses undeclared type {:?}",
                        index, type_name
                    )));
                }
            }
            for product in &rule.products {
                if !declared.contains(product.type_name.as_str()) {
                    return Err(malformed(format!(
                        "rule {} produces undeclared type {:?}",
                        index, product.type_name
                    )));
                }
                if !(MIN_DUNGEON_WEIGHT..=MAX_DUNGEON_WEIGHT).contains(&product.weight) {
                    return Err(malformed(format!(
                        "rule {} gives {:?} weight {}",
                        index, product.type_name, product.weight
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn declared_types(&self) -> &[String] {
        &self.types
    }

    pub fn allow_switch_in(&self) -> bool {
        self.settings.allow_switch_in
    }

    pub fn allow_switch_out(&self) -> bool {
        self.settings.allow_switch_out
    }

    pub fn allow_duplicates_in_chain(&self) -> bool {
        self.settings.allow_duplicates_in_chain
    }

    pub fn pack_weight(&self) -> u32 {
        self.settings.pack_weight
    }

    pub fn with_rule(mut self, rule: ChainRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_duplicates_in_chain(mut self, allowed: bool) -> Self {
        self.settings.allow_duplicates_in_chain = allowed;
        self
    }
}
