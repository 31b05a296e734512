use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use log::debug;

use crate::error::{PipelineError, Result};
use crate::skeleton::Skeleton;

// ─── Name restoration map ─────────────────────────────────────────────────────

/// Mapping from standardized bone names back to the original names they
/// replaced.
///
/// Built by recording the full bone-name list before standardization and the
/// full list after, then pairing entries by ordinal position. The external
/// standardizer renames in place without reordering, which makes the pairing
/// valid; the equal-length precondition below is the guard for that contract.
#[derive(Debug, Clone, Default)]
pub struct NameRestorationMap {
    restored: HashMap<String, String>,
}

impl NameRestorationMap {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pair `standardized[i]` with `original[i]` for every position. Fails
    /// when the lists diverged in length, which would silently corrupt every
    /// later rename.
    pub fn from_ordered_lists(standardized: &[String], original: &[String]) -> Result<Self> {
        if standardized.len() != original.len() {
            return Err(PipelineError::RestorationListMismatch {
                before: original.len(),
                after: standardized.len(),
            });
        }
        let restored = standardized
            .iter()
            .zip(original.iter())
            .map(|(standardized, original)| (standardized.clone(), original.clone()))
            .collect();
        Ok(Self { restored })
    }

    /// Original name recorded for a standardized name, if any.
    pub fn original_for(&self, standardized: &str) -> Option<&str> {
        self.restored.get(standardized).map(String::as_str)
    }

    /// Original name when one is recorded, otherwise the input unchanged.
    pub fn effective_name<'a>(&'a self, standardized: &'a str) -> &'a str {
        self.original_for(standardized).unwrap_or(standardized)
    }

    pub fn len(&self) -> usize {
        self.restored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restored.is_empty()
    }
}

// ─── Collision-safe renaming ──────────────────────────────────────────────────

/// Deterministic temporary name for a bone or vertex group about to be
/// displaced by a rename. Short enough for hosts with 63-byte name limits.
pub fn temp_rename_name(name: &str) -> String {
    let mut hasher = std::hash::DefaultHasher::new();
    name.hash(&mut hasher);
    format!("_TMP_{:06}", hasher.finish() % 1_000_000)
}

/// Rename a bone, first moving any bone already holding the target name out
/// of the way to a temporary name.
///
/// This keeps the skeleton's name-uniqueness invariant intact mid-pass: the
/// only transient names ever observed are the `_TMP_` placeholders, never a
/// duplicate.
pub fn rename_bone_collision_safe(skeleton: &mut Skeleton, from: &str, to: &str) -> Result<()> {
    if from == to {
        return Ok(());
    }
    if skeleton.contains(to) {
        let displaced = temp_rename_name(to);
        debug!("displacing occupied bone name '{to}' to '{displaced}'");
        skeleton.rename_bone(to, &displaced)?;
    }
    skeleton.rename_bone(from, to)
}

// ─── Source name restoration ──────────────────────────────────────────────────

/// Restore a skeleton's bone names to the recorded original list, pairing by
/// position. Bones beyond the recorded list keep their current names.
///
/// Runs as a two-phase rename: standardized and original name sets can
/// overlap arbitrarily, so every affected bone is parked on a temporary name
/// before the originals are assigned.
pub fn restore_bone_names(skeleton: &mut Skeleton, original: &[String]) -> Result<()> {
    let mut edit = skeleton.edit_scope();
    let current = edit.bone_names();

    let renames: Vec<(String, String)> = current
        .into_iter()
        .zip(original.iter())
        .filter(|(current, original)| current != *original)
        .map(|(current, original)| (current, original.clone()))
        .collect();

    for (current, _) in &renames {
        let parked = temp_rename_name(current);
        edit.rename_bone(current, &parked)?;
    }
    for (current, original) in &renames {
        let parked = temp_rename_name(current);
        rename_bone_collision_safe(&mut edit, &parked, original)?;
    }
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
