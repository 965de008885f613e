//! # Generation Module
//!
//! Choosing the next dungeon for a link.
//!
//! This module holds the generic weighted sampler and the selection engine
//! that decides whether to switch packs and which template to build. Selection
//! never fails outright: every failure after registration ends in a fallback
//! template.

pub mod selection;
pub mod weighted;

pub use selection::*;
pub use weighted::*;

use crate::{DungeonTemplate, PocketDimError};
use std::sync::Arc;

/// Result of choosing the next dungeon for a link.
#[derive(Debug)]
pub enum SelectionOutcome {
    /// Normal pack and template selection succeeded
    Selected(Arc<DungeonTemplate>),
    /// Selection failed; a fallback template was used instead
    Fallback {
        template: Arc<DungeonTemplate>,
        reason: PocketDimError,
    },
    /// Nothing was selected because the registry is not ready
    Fatal(PocketDimError),
}

impl SelectionOutcome {
    /// Gets the chosen template, if any.
    pub fn template(&self) -> Option<&Arc<DungeonTemplate>> {
        match self {
            SelectionOutcome::Selected(template) => Some(template),
            SelectionOutcome::Fallback { template, .. } => Some(template),
            SelectionOutcome::Fatal(_) => None,
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, SelectionOutcome::Selected(_))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SelectionOutcome::Fallback { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, SelectionOutcome::Fatal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DungeonType, LifecycleError};

    #[test]
    fn test_outcome_template_access() {
        let template = Arc::new(DungeonTemplate::new(100, "/x/a.schematic", true, DungeonType::unknown()));

        let selected = SelectionOutcome::Selected(template.clone());
        assert!(selected.is_selected());
        assert_eq!(selected.template(), Some(&template));

        let fallback = SelectionOutcome::Fallback {
            template: template.clone(),
            reason: PocketDimError::EmptySelection("nothing".to_string()),
        };
        assert!(fallback.is_fallback());
        assert_eq!(fallback.template(), Some(&template));

        let fatal = SelectionOutcome::Fatal(LifecycleError::NotRegistered.into());
        assert!(fatal.is_fatal());
        assert!(fatal.template().is_none());
    }
}
