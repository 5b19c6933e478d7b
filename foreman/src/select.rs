//! "Up next" selection over the intent-tracked work-item graph.
//!
//! The intents' durable tracking doubles as the dependency universe: each
//! tracked item carries `requires` edges and a run-vocabulary status. This
//! module flattens that universe into bolts and hands it to the pure
//! resolver, which is the same policy presentation layers use.

use std::collections::HashSet;
use std::path::Path;

use crate::core::bolt::{Bolt, ResolvedBolt};
use crate::core::resolver::up_next;
use crate::error::Result;
use crate::io::paths::ProjectPaths;
use crate::io::state_store::load_state;
use crate::model::StateDocument;

/// Flatten every intent's tracked items into a bolt universe.
///
/// The first occurrence of an id wins; a duplicate in a later intent is
/// dropped rather than resolved twice.
pub fn intent_bolts(doc: &StateDocument) -> Vec<Bolt> {
    let mut seen = HashSet::new();
    let mut bolts = Vec::new();
    for intent in &doc.intents {
        for item in &intent.work_items {
            if seen.insert(item.id.clone()) {
                bolts.push(Bolt {
                    id: item.id.clone(),
                    status: item.status.into(),
                    requires: item.requires.clone(),
                });
            }
        }
    }
    bolts
}

/// Load the state document and return priority-ordered schedulable work.
pub fn up_next_from_root(root: &Path) -> Result<Vec<ResolvedBolt>> {
    let paths = ProjectPaths::new(root);
    let doc = load_state(&paths.state_path)?;
    Ok(up_next(&intent_bolts(&doc)))
}
