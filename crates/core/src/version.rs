//! Page version snapshots: the action that produced them and a structural
//! diff between two snapshots.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::error::CoreError;

/// Maximum change-summary length stored with a version.
pub const MAX_CHANGE_SUMMARY_LEN: usize = 500;

/// What produced a version snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionAction {
    /// Written by a transition into `PUBLISHED`.
    Publish,
    /// Written by an explicit "create version" call.
    Manual,
    /// Written by the editor's periodic save.
    Autosave,
}

impl VersionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            VersionAction::Publish => "PUBLISH",
            VersionAction::Manual => "MANUAL",
            VersionAction::Autosave => "AUTOSAVE",
        }
    }
}

impl fmt::Display for VersionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUBLISH" => Ok(VersionAction::Publish),
            "MANUAL" => Ok(VersionAction::Manual),
            "AUTOSAVE" => Ok(VersionAction::Autosave),
            other => Err(CoreError::Validation(format!(
                "Invalid version action '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for VersionAction {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Validate an optional change summary.
pub fn validate_change_summary(summary: &str) -> Result<(), CoreError> {
    if summary.chars().count() > MAX_CHANGE_SUMMARY_LEN {
        return Err(CoreError::Validation(format!(
            "Change summary must be at most {MAX_CHANGE_SUMMARY_LEN} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Borrowed view of the versioned fields of a page or snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotView<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub blocks: &'a [Block],
}

/// How a single block differs between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockChangeKind {
    Added,
    Removed,
    Modified,
    Moved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockChange {
    pub block_id: String,
    pub change: BlockChangeKind,
    /// Position in the older snapshot, if present there.
    pub old_index: Option<usize>,
    /// Position in the newer snapshot, if present there.
    pub new_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotDiff {
    pub title_changed: bool,
    pub description_changed: bool,
    pub blocks: Vec<BlockChange>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        !self.title_changed && !self.description_changed && self.blocks.is_empty()
    }
}

/// Compare two snapshots block-by-block, keyed on block id.
///
/// A block whose content, type, or settings changed is `Modified`. Among
/// the blocks present in both snapshots, the largest set that kept its
/// relative order stays put and every other unchanged block is `Moved`, so
/// inserting or removing a block does not mark its neighbours as moved.
/// Changes are listed in new-snapshot order, followed by removals in
/// old-snapshot order.
pub fn diff_snapshots(old: SnapshotView<'_>, new: SnapshotView<'_>) -> SnapshotDiff {
    let old_index: HashMap<&str, usize> = old
        .blocks
        .iter()
        .enumerate()
        .map(|(i, b)| (b.id.as_str(), i))
        .collect();
    let new_ids: HashMap<&str, usize> = new
        .blocks
        .iter()
        .enumerate()
        .map(|(i, b)| (b.id.as_str(), i))
        .collect();

    let shared: Vec<(usize, usize)> = new
        .blocks
        .iter()
        .enumerate()
        .filter_map(|(ni, b)| old_index.get(b.id.as_str()).map(|&oi| (ni, oi)))
        .collect();
    let old_order: Vec<usize> = shared.iter().map(|&(_, oi)| oi).collect();
    let in_place: HashSet<usize> = longest_increasing(&old_order)
        .into_iter()
        .map(|pos| shared[pos].0)
        .collect();

    let mut changes = Vec::new();
    for (ni, block) in new.blocks.iter().enumerate() {
        match old_index.get(block.id.as_str()) {
            None => changes.push(BlockChange {
                block_id: block.id.clone(),
                change: BlockChangeKind::Added,
                old_index: None,
                new_index: Some(ni),
            }),
            Some(&oi) => {
                let before = &old.blocks[oi];
                let kind = if before.block_type != block.block_type
                    || before.content != block.content
                    || before.settings != block.settings
                {
                    Some(BlockChangeKind::Modified)
                } else if !in_place.contains(&ni) {
                    Some(BlockChangeKind::Moved)
                } else {
                    None
                };
                if let Some(change) = kind {
                    changes.push(BlockChange {
                        block_id: block.id.clone(),
                        change,
                        old_index: Some(oi),
                        new_index: Some(ni),
                    });
                }
            }
        }
    }

    for (oi, block) in old.blocks.iter().enumerate() {
        if !new_ids.contains_key(block.id.as_str()) {
            changes.push(BlockChange {
                block_id: block.id.clone(),
                change: BlockChangeKind::Removed,
                old_index: Some(oi),
                new_index: None,
            });
        }
    }

    SnapshotDiff {
        title_changed: old.title != new.title,
        description_changed: old.description != new.description,
        blocks: changes,
    }
}

/// Positions in `seq` of one longest strictly increasing subsequence.
fn longest_increasing(seq: &[usize]) -> Vec<usize> {
    // tails[k] is the position of the smallest tail of any run of length k + 1.
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];
    for (pos, &value) in seq.iter().enumerate() {
        let slot = tails.partition_point(|&t| seq[t] < value);
        if slot > 0 {
            prev[pos] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(pos);
        } else {
            tails[slot] = pos;
        }
    }

    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(pos) = cursor {
        run.push(pos);
        cursor = prev[pos];
    }
    run.reverse();
    run
}
