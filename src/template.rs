use std::collections::HashSet;

use log::debug;
use regex::Regex;

use crate::skeleton::{RotationAxis, Skeleton};

// ─── Pattern helpers ──────────────────────────────────────────────────────────

/// Names of bones whose name matches any of the given anchored patterns, in
/// creation order.
pub(crate) fn match_bone_names(skeleton: &Skeleton, patterns: &[Regex]) -> Vec<String> {
    skeleton
        .bones()
        .filter(|bone| patterns.iter().any(|pattern| pattern.is_match(bone.name())))
        .map(|bone| bone.name().to_string())
        .collect()
}

pub(crate) fn compile_patterns(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
}

// ─── Topology pruning ─────────────────────────────────────────────────────────

/// Side bones the template carries that the humanoid format has no analog
/// for; removed whenever they end up unmapped.
const DISPOSABLE_PELVIS_BONES: [&str; 2] = ["pelvis.L", "pelvis.R"];
const DISPOSABLE_BREAST_BONES: [&str; 2] = ["breast.L", "breast.R"];
/// Redundant spine joint collapsed when the source has no upper-chest bone.
const DISPOSABLE_SPINE_BONE: &str = "spine.003";

/// Remove template bones that the correspondence leaves no use for.
///
/// Palm bones go unconditionally; the fixed pelvis/breast pairs and the
/// redundant spine segment go when unmapped. Any other unmapped bone is left
/// in place and simply receives no correspondence-driven rename later.
/// Returns the removed names; removals of already-absent bones are no-ops.
pub fn prune_unmapped_template_bones(
    template: &mut Skeleton,
    correspondence: &[(String, String)],
) -> Vec<String> {
    let mapped: HashSet<&str> = correspondence
        .iter()
        .map(|(template_bone, _)| template_bone.as_str())
        .collect();

    let mut removed = Vec::new();
    let mut edit = template.edit_scope();

    let palm_patterns = compile_patterns(&[r"^palm.*$"]);
    for name in match_bone_names(&edit, &palm_patterns) {
        if edit.remove_bone(&name) {
            removed.push(name);
        }
    }

    for name in edit.bone_names() {
        if mapped.contains(name.as_str()) {
            continue;
        }
        if DISPOSABLE_PELVIS_BONES.contains(&name.as_str())
            || DISPOSABLE_BREAST_BONES.contains(&name.as_str())
        {
            if edit.remove_bone(&name) {
                removed.push(name);
            }
            continue;
        }
        if name != DISPOSABLE_SPINE_BONE {
            debug!("template bone '{name}' is not mapped");
            continue;
        }
        if edit.remove_bone(&name) {
            removed.push(name);
        }
    }

    removed
}

// ─── Geometric alignment ──────────────────────────────────────────────────────

/// Move every mapped template bone onto its source counterpart.
///
/// The template's world transform is first set equal to the source's so the
/// copied local-space head/tail positions land in the same place. Unmapped
/// template bones keep their generator-default positions; pairs whose
/// template bone was pruned are skipped.
pub fn align_template_to_source(
    template: &mut Skeleton,
    source: &Skeleton,
    correspondence: &[(String, String)],
) {
    let mut edit = template.edit_scope();
    edit.world_transform = source.world_transform;

    for (template_name, source_name) in correspondence {
        let Some(source_bone) = source.bone(source_name) else {
            continue;
        };
        let head = source_bone.head;
        let tail = source_bone.tail;
        let Some(template_bone) = edit.bone_mut(template_name) else {
            continue;
        };
        template_bone.head = head;
        template_bone.tail = tail;
    }
}

// ─── Shape tuning ─────────────────────────────────────────────────────────────

const NECK_BASE_BONE: &str = "spine.004";

const LIMB_AXIS_PATTERNS: [&str; 2] = [r"^upper_arm\.(L|R)$", r"^thigh\.(L|R)$"];

const FINGER_AXIS_PATTERNS: [&str; 5] = [
    r"^f_pinky\.01\.(L|R)$",
    r"^f_ring\.01\.(L|R)$",
    r"^f_middle\.01\.(L|R)$",
    r"^f_index\.01\.(L|R)$",
    r"^thumb\.01\.(L|R)$",
];

const SINGLE_SEGMENT_LIMBS: [&str; 4] = ["upper_arm.R", "upper_arm.L", "thigh.R", "thigh.L"];

/// Apply the fixed anatomical corrections the generator needs before it can
/// expand the template. All assignments are absolute, so re-applying the
/// tuning leaves the template unchanged.
pub fn tune_template_shape(template: &mut Skeleton) {
    adjust_neck_base_connection(template);
    set_limb_rotation_axes(template);
    set_arm_and_finger_rolls(template);
    collapse_limb_segments(template);
}

/// Toggle the neck-base joint's connected flag on and off so it keeps an
/// orientation independent of the chest bone's tail.
fn adjust_neck_base_connection(template: &mut Skeleton) {
    let mut edit = template.edit_scope();
    edit.set_connected(NECK_BASE_BONE, true);
    edit.set_connected(NECK_BASE_BONE, false);
}

/// Primary bending axes for limbs and the proximal finger segments. Finger
/// axes mirror between sides.
fn set_limb_rotation_axes(template: &mut Skeleton) {
    let limb_patterns = compile_patterns(&LIMB_AXIS_PATTERNS);
    for name in match_bone_names(template, &limb_patterns) {
        if let Some(bone) = template.bone_mut(&name) {
            bone.params.rotation_axis = Some(RotationAxis::X);
        }
    }

    let finger_patterns = compile_patterns(&FINGER_AXIS_PATTERNS);
    for name in match_bone_names(template, &finger_patterns) {
        let axis = if name.ends_with('L') {
            RotationAxis::Z
        } else {
            RotationAxis::Z.negated()
        };
        if let Some(bone) = template.bone_mut(&name) {
            bone.params.primary_rotation_axis = Some(axis);
        }
    }
}

/// Roll corrections for arm, hand and finger bones, mirrored by side; thumbs
/// stay at zero roll on both sides.
fn set_arm_and_finger_rolls(template: &mut Skeleton) {
    let mut edit = template.edit_scope();
    for index in edit.indices() {
        let Some(bone) = edit.bone_at_mut(index) else {
            continue;
        };
        let name = bone.name().to_string();

        if name.starts_with("f_") && name.contains(".L") {
            bone.roll = (-90.0f32).to_radians();
        }
        if name.starts_with("f_") && name.contains(".R") {
            bone.roll = 90.0f32.to_radians();
        }
        if name.starts_with("thumb") {
            bone.roll = 0.0;
        }

        if (name.contains("arm") && name.contains(".L"))
            || (name.contains("hand") && name.contains(".L"))
        {
            bone.roll = 90.0f32.to_radians();
        }
        if (name.contains("arm") && name.contains(".R"))
            || (name.contains("hand") && name.contains(".R"))
        {
            bone.roll = (-90.0f32).to_radians();
        }
    }
}

/// Collapse the generator's multi-segment IK chains on arms and thighs to a
/// single segment for FK-driven deformation.
fn collapse_limb_segments(template: &mut Skeleton) {
    for name in SINGLE_SEGMENT_LIMBS {
        if let Some(bone) = template.bone_mut(name) {
            bone.params.segments = Some(1);
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
