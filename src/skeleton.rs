use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::{Deref, DerefMut};

use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{PipelineError, Result};

// ─── Generator parameters ─────────────────────────────────────────────────────

/// Axis value consumed by the rig generator's limb and finger parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAxis {
    X,
    Y,
    Z,
    NegX,
    NegY,
    NegZ,
}

impl RotationAxis {
    pub fn negated(self) -> Self {
        match self {
            RotationAxis::X => RotationAxis::NegX,
            RotationAxis::Y => RotationAxis::NegY,
            RotationAxis::Z => RotationAxis::NegZ,
            RotationAxis::NegX => RotationAxis::X,
            RotationAxis::NegY => RotationAxis::Y,
            RotationAxis::NegZ => RotationAxis::Z,
        }
    }
}

/// Per-bone parameters read by the rig generator oracle. The core only writes
/// these while tuning the template; the generator owns their interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratorParams {
    pub rotation_axis: Option<RotationAxis>,
    pub primary_rotation_axis: Option<RotationAxis>,
    pub segments: Option<u32>,
}

// ─── Constraints ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    CopyTransforms,
}

/// Pose-level constraint attached to a bone, targeting another bone of the
/// same skeleton by name.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneConstraint {
    pub kind: ConstraintKind,
    pub target: String,
    pub influence: f32,
    pub muted: bool,
}

impl BoneConstraint {
    pub fn copy_transforms(target: impl Into<String>) -> Self {
        Self {
            kind: ConstraintKind::CopyTransforms,
            target: target.into(),
            influence: 1.0,
            muted: false,
        }
    }
}

// ─── Bone ─────────────────────────────────────────────────────────────────────

/// A joint node of a skeleton graph.
///
/// `head` and `tail` are positions in the skeleton's local (armature) space;
/// world positions go through [`Skeleton::world_transform`]. Structural fields
/// (name, parent, children) are managed by the owning [`Skeleton`] so that
/// name uniqueness and parent/child symmetry hold at all times.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    name: String,
    parent: Option<usize>,
    children: Vec<usize>,
    pub head: Vector3<f32>,
    pub tail: Vector3<f32>,
    pub roll: f32,
    pub connected: bool,
    pub deform: bool,
    pub hidden: bool,
    pub selected: bool,
    groups: BTreeSet<String>,
    /// Legacy 32-slot layer bitmask for hosts without named bone collections.
    pub layers: u32,
    pub params: GeneratorParams,
    pub constraints: Vec<BoneConstraint>,
    pub custom_properties: BTreeMap<String, f64>,
}

impl Bone {
    fn new(name: String) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            head: Vector3::zeros(),
            tail: Vector3::zeros(),
            roll: 0.0,
            connected: false,
            deform: false,
            hidden: false,
            selected: false,
            groups: BTreeSet::new(),
            layers: 0,
            params: GeneratorParams::default(),
            constraints: Vec::new(),
            custom_properties: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }

    pub fn length(&self) -> f32 {
        (self.tail - self.head).norm()
    }

    /// Rescale the bone along its own direction, keeping the head fixed.
    /// Zero-length bones are left untouched.
    pub fn set_length(&mut self, length: f32) {
        let direction = self.tail - self.head;
        let current = direction.norm();
        if current > f32::EPSILON {
            self.tail = self.head + direction * (length / current);
        }
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    pub fn assign_group(&mut self, group: impl Into<String>) {
        self.groups.insert(group.into());
    }
}

// ─── Skeleton ─────────────────────────────────────────────────────────────────

/// Interaction mode of a skeleton, mirroring the host's object/edit/pose
/// distinction. Scoped guards record and restore it; see
/// [`Skeleton::edit_scope`] and [`Skeleton::pose_scope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Object,
    Edit,
    Pose,
}

/// A rooted forest of bones with unique names.
///
/// Bones live in index slots that stay stable across removals, so recorded
/// indices (parent links, children lists) never shift. Iteration follows slot
/// order, which is creation order.
#[derive(Debug, Clone)]
pub struct Skeleton {
    name: String,
    pub world_transform: Matrix4<f32>,
    pub hidden: bool,
    slots: Vec<Option<Bone>>,
    by_name: HashMap<String, usize>,
    mode: InteractionMode,
}

impl Skeleton {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            world_transform: Matrix4::identity(),
            hidden: false,
            slots: Vec::new(),
            by_name: HashMap::new(),
            mode: InteractionMode::Object,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn bone_count(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.index_of(name).and_then(|index| self.bone_at(index))
    }

    pub fn bone_mut(&mut self, name: &str) -> Option<&mut Bone> {
        let index = self.index_of(name)?;
        self.bone_at_mut(index)
    }

    pub fn bone_at(&self, index: usize) -> Option<&Bone> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn bone_at_mut(&mut self, index: usize) -> Option<&mut Bone> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Live bone indices in creation order.
    pub fn indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|_| index))
            .collect()
    }

    pub fn bones(&self) -> impl Iterator<Item = &Bone> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Bone names in creation order.
    pub fn bone_names(&self) -> Vec<String> {
        self.bones().map(|bone| bone.name.clone()).collect()
    }

    /// Create a new root bone. Fails when the name is already taken.
    pub fn add_bone(&mut self, name: impl Into<String>) -> Result<usize> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(PipelineError::DuplicateBoneName(name));
        }
        let index = self.slots.len();
        self.by_name.insert(name.clone(), index);
        self.slots.push(Some(Bone::new(name)));
        Ok(index)
    }

    /// Rename a bone, preserving its index and all links to it.
    pub fn rename_bone(&mut self, from: &str, to: &str) -> Result<()> {
        if from == to {
            return Ok(());
        }
        if self.by_name.contains_key(to) {
            return Err(PipelineError::DuplicateBoneName(to.to_string()));
        }
        let index = self
            .by_name
            .remove(from)
            .ok_or_else(|| PipelineError::BoneNotFound(from.to_string()))?;
        self.by_name.insert(to.to_string(), index);
        if let Some(bone) = self.bone_at_mut(index) {
            bone.name = to.to_string();
        }
        Ok(())
    }

    /// Re-parent a bone. `None` makes it a root. The caller must not create a
    /// cycle; parent chains are expected to stay acyclic (checked in debug
    /// builds).
    pub fn set_parent(&mut self, child: &str, parent: Option<&str>) -> Result<()> {
        let child_index = self
            .index_of(child)
            .ok_or_else(|| PipelineError::BoneNotFound(child.to_string()))?;
        let parent_index = match parent {
            Some(name) => Some(
                self.index_of(name)
                    .ok_or_else(|| PipelineError::BoneNotFound(name.to_string()))?,
            ),
            None => None,
        };

        debug_assert!(
            parent_index.is_none_or(|p| !self.is_ancestor_of(child_index, p)),
            "re-parenting '{child}' would create a cycle"
        );

        // Detach from the current parent first.
        if let Some(old_parent) = self.bone_at(child_index).and_then(Bone::parent) {
            if let Some(bone) = self.bone_at_mut(old_parent) {
                bone.children.retain(|&c| c != child_index);
            }
        }

        if let Some(bone) = self.bone_at_mut(child_index) {
            bone.parent = parent_index;
        }
        if let Some(parent_index) = parent_index {
            if let Some(bone) = self.bone_at_mut(parent_index) {
                bone.children.push(child_index);
            }
        }
        Ok(())
    }

    fn is_ancestor_of(&self, candidate: usize, mut node: usize) -> bool {
        if candidate == node {
            return true;
        }
        while let Some(parent) = self.bone_at(node).and_then(Bone::parent) {
            if parent == candidate {
                return true;
            }
            node = parent;
        }
        false
    }

    /// Remove a bone by name. Its children are re-parented to the removed
    /// bone's parent (with `connected` cleared), or become roots. Removing an
    /// absent bone is a no-op returning `false`.
    pub fn remove_bone(&mut self, name: &str) -> bool {
        let Some(index) = self.index_of(name) else {
            return false;
        };
        let Some(bone) = self.slots[index].take() else {
            return false;
        };
        self.by_name.remove(name);

        if let Some(parent_index) = bone.parent {
            if let Some(parent) = self.bone_at_mut(parent_index) {
                parent.children.retain(|&c| c != index);
            }
        }
        for child_index in bone.children {
            if let Some(child) = self.bone_at_mut(child_index) {
                child.parent = bone.parent;
                child.connected = false;
            }
            if let Some(parent_index) = bone.parent {
                if let Some(parent) = self.bone_at_mut(parent_index) {
                    parent.children.push(child_index);
                }
            }
        }
        true
    }

    /// All descendant indices of a bone, depth-first, the bone itself
    /// excluded.
    pub fn children_recursive(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self
            .bone_at(index)
            .map(|bone| bone.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(bone) = self.bone_at(current) {
                stack.extend(bone.children.iter().rev().copied());
            }
        }
        out
    }

    /// Set the connected flag. Connecting snaps the bone's head onto its
    /// parent's tail, as the host does; disconnecting only clears the flag and
    /// leaves the head where the connection put it.
    pub fn set_connected(&mut self, name: &str, connected: bool) -> bool {
        let Some(index) = self.index_of(name) else {
            return false;
        };
        if connected {
            if let Some(parent_tail) = self
                .bone_at(index)
                .and_then(Bone::parent)
                .and_then(|parent| self.bone_at(parent))
                .map(|parent| parent.tail)
            {
                if let Some(bone) = self.bone_at_mut(index) {
                    bone.head = parent_tail;
                }
            }
        }
        if let Some(bone) = self.bone_at_mut(index) {
            bone.connected = connected;
            return true;
        }
        false
    }

    pub fn world_head(&self, bone: &Bone) -> Vector3<f32> {
        self.world_transform
            .transform_point(&Point3::from(bone.head))
            .coords
    }

    pub fn world_tail(&self, bone: &Bone) -> Vector3<f32> {
        self.world_transform
            .transform_point(&Point3::from(bone.tail))
            .coords
    }

    /// Mute or unmute every constraint on bones belonging to a group,
    /// returning a per-bone processed constraint count.
    pub fn set_group_constraints_muted(
        &mut self,
        group: &str,
        muted: bool,
    ) -> BTreeMap<String, usize> {
        let mut result = BTreeMap::new();
        for slot in self.slots.iter_mut().filter_map(Option::as_mut) {
            if !slot.groups.contains(group) || slot.constraints.is_empty() {
                continue;
            }
            for constraint in &mut slot.constraints {
                constraint.muted = muted;
            }
            result.insert(slot.name.clone(), slot.constraints.len());
        }
        result
    }

    /// Enter edit mode, restoring the previous mode when the scope drops.
    pub fn edit_scope(&mut self) -> EditScope<'_> {
        EditScope::new(self)
    }

    /// Enter pose mode, restoring the previous mode when the scope drops.
    pub fn pose_scope(&mut self) -> PoseScope<'_> {
        PoseScope::new(self)
    }
}

// ─── Mode scopes ──────────────────────────────────────────────────────────────

/// Scoped edit-mode acquisition. Restores the prior interaction mode on every
/// exit path, including unwinds.
pub struct EditScope<'a> {
    skeleton: &'a mut Skeleton,
    previous: InteractionMode,
}

impl<'a> EditScope<'a> {
    fn new(skeleton: &'a mut Skeleton) -> Self {
        let previous = skeleton.mode;
        skeleton.mode = InteractionMode::Edit;
        Self { skeleton, previous }
    }
}

impl Deref for EditScope<'_> {
    type Target = Skeleton;

    fn deref(&self) -> &Skeleton {
        self.skeleton
    }
}

impl DerefMut for EditScope<'_> {
    fn deref_mut(&mut self) -> &mut Skeleton {
        self.skeleton
    }
}

impl Drop for EditScope<'_> {
    fn drop(&mut self) {
        self.skeleton.mode = self.previous;
    }
}

/// Scoped pose-mode acquisition, counterpart of [`EditScope`] for operations
/// that are only legal at pose level (constraints, custom properties).
pub struct PoseScope<'a> {
    skeleton: &'a mut Skeleton,
    previous: InteractionMode,
}

impl<'a> PoseScope<'a> {
    fn new(skeleton: &'a mut Skeleton) -> Self {
        let previous = skeleton.mode;
        skeleton.mode = InteractionMode::Pose;
        Self { skeleton, previous }
    }
}

impl Deref for PoseScope<'_> {
    type Target = Skeleton;

    fn deref(&self) -> &Skeleton {
        self.skeleton
    }
}

impl DerefMut for PoseScope<'_> {
    fn deref_mut(&mut self) -> &mut Skeleton {
        self.skeleton
    }
}

impl Drop for PoseScope<'_> {
    fn drop(&mut self) {
        self.skeleton.mode = self.previous;
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
