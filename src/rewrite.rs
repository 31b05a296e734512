use std::collections::HashSet;

use log::{debug, info};

use crate::error::{PipelineError, Result};
use crate::host::HostCapabilities;
use crate::naming::{NameRestorationMap, rename_bone_collision_safe};
use crate::skeleton::{BoneConstraint, Skeleton};
use crate::template::{compile_patterns, match_bone_names};

// ─── Generated-rig naming convention ──────────────────────────────────────────

const DEFORM_PREFIX: &str = "DEF-";
const ORG_PREFIX: &str = "ORG-";

/// Eye bones deform through their organizational-layer bones in the
/// generator's convention, not through `DEF-` bones.
const EYE_TEMPLATE_BONES: [&str; 2] = ["eye.L", "eye.R"];

/// Deformation-layer group tag assigned by the generator.
pub const DEFORM_GROUP: &str = "DEF";

// ─── Facial subtree deletion ──────────────────────────────────────────────────

/// Facial bone subtrees the target avatar format rigs differently; removed
/// together with all descendants.
const FACIAL_BONE_PATTERNS: [&str; 13] = [
    r"^(ORG|DEF)-forehead.*$",
    r"^(ORG|DEF)-temple.*$",
    r"^((ORG|DEF)-)?brow.*$",
    r"^((MCH|ORG|DEF)-)?lid\.(B|T).*$",
    r"^((ORG|DEF)-)?ear\.(L|R).*$",
    r"^((MCH|ORG|DEF)-)?tongue.*$",
    r"^((ORG|DEF)-)?chin.*$",
    r"^((ORG|DEF)-)?cheek\.(B|T).*$",
    r"^(ORG-)?teeth\.(B|T)$",
    r"^((ORG|DEF)-)?nose.*$",
    r"^((ORG|DEF)-)?lip.*$",
    r"^((MCH|ORG|DEF)-)?jaw.*$",
    r"^MCH-mouth_lock$",
];

/// Delete every facial bone matching the fixed pattern list, along with its
/// whole subtree.
///
/// The deletion set is collected up front and deduplicated so that removing a
/// parent never invalidates a child that is itself scheduled for removal.
pub fn remove_facial_bones(rig: &mut Skeleton) {
    let patterns = compile_patterns(&FACIAL_BONE_PATTERNS);
    let mut edit = rig.edit_scope();

    let mut scheduled = HashSet::new();
    let mut to_remove = Vec::new();
    for root_name in match_bone_names(&edit, &patterns) {
        let Some(root_index) = edit.index_of(&root_name) else {
            continue;
        };
        let mut subtree = edit.children_recursive(root_index);
        subtree.push(root_index);
        for index in subtree {
            let Some(name) = edit.bone_at(index).map(|bone| bone.name().to_string()) else {
                continue;
            };
            if scheduled.insert(name.clone()) {
                to_remove.push(name);
            }
        }
    }

    for name in to_remove {
        debug!("deleting facial bone '{name}'");
        edit.remove_bone(&name);
    }
}

// ─── Deformation-layer rename ─────────────────────────────────────────────────

/// Rename the rig's deformation bones to the source model's vertex-group
/// names.
///
/// For each correspondence pair the addressed bone is `DEF-<template>`, or
/// `ORG-<template>` for the eye roles, whose deform flag is forced on. A
/// missing rig bone skips the pair; a `DEF-` bone without its deform flag is
/// a generator-compatibility breach and aborts the run. The final name is the
/// original pre-standardization name when the restoration map knows one,
/// otherwise the source name as-is. Afterwards a bone literally named `root`
/// is renamed to the capitalized form the target engine expects.
pub fn rename_deform_bones_to_source(
    rig: &mut Skeleton,
    correspondence: &[(String, String)],
    restoration: &NameRestorationMap,
) -> Result<()> {
    let mut edit = rig.edit_scope();

    for (template_name, source_name) in correspondence {
        let is_eye = EYE_TEMPLATE_BONES.contains(&template_name.as_str());
        let rig_name = if is_eye {
            format!("{ORG_PREFIX}{template_name}")
        } else {
            format!("{DEFORM_PREFIX}{template_name}")
        };

        let Some(bone) = edit.bone_mut(&rig_name) else {
            debug!("rig bone '{rig_name}' not present, skipping rename");
            continue;
        };
        if is_eye {
            bone.deform = true;
        } else if !bone.deform {
            return Err(PipelineError::DeformFlagMissing { bone: rig_name });
        }

        let target_name = restoration.effective_name(source_name).to_string();
        info!("renaming bone '{rig_name}' to '{target_name}'");
        rename_bone_collision_safe(&mut edit, &rig_name, &target_name)?;
    }

    if edit.contains("root") {
        rename_bone_collision_safe(&mut edit, "root", "Root")?;
    }

    Ok(())
}

// ─── Unmapped-bone grafting ───────────────────────────────────────────────────

/// Graft source bones that received no role mapping onto the rig, each under
/// its (restoration-mapped) parent.
///
/// Single pass over the source in creation order: a bone whose parent is not
/// yet in the rig is skipped and never retried, so an unmapped chain only
/// attaches when its bones appear in top-down order. Grafted bones keep the
/// source head/tail verbatim and inherit the rig parent's group memberships,
/// or its legacy layer bitmask on hosts without named collections.
pub fn graft_unmapped_source_bones(
    rig: &mut Skeleton,
    source: &Skeleton,
    restoration: &NameRestorationMap,
    capabilities: HostCapabilities,
) -> Result<Vec<String>> {
    let mut grafted = Vec::new();
    let mut edit = rig.edit_scope();

    for index in source.indices() {
        let Some(source_bone) = source.bone_at(index) else {
            continue;
        };
        let target_name = restoration.effective_name(source_bone.name()).to_string();
        if edit.contains(&target_name) {
            continue;
        }
        let Some(parent_bone) = source_bone.parent().and_then(|p| source.bone_at(p)) else {
            continue;
        };
        let parent_target = restoration.effective_name(parent_bone.name()).to_string();
        if !edit.contains(&parent_target) {
            debug!("skipping '{target_name}': parent '{parent_target}' is not in the rig");
            continue;
        }

        info!("generating bone '{parent_target}/{target_name}'");
        let head = source_bone.head;
        let tail = source_bone.tail;
        let parent_groups: Vec<String> = edit
            .bone(&parent_target)
            .map(|bone| bone.groups().map(str::to_string).collect())
            .unwrap_or_default();
        let parent_layers = edit.bone(&parent_target).map(|bone| bone.layers).unwrap_or(0);

        edit.add_bone(target_name.clone())?;
        edit.set_parent(&target_name, Some(&parent_target))?;
        if let Some(bone) = edit.bone_mut(&target_name) {
            bone.head = head;
            bone.tail = tail;
            if capabilities.named_bone_collections {
                for group in parent_groups {
                    bone.assign_group(group);
                }
            } else {
                bone.layers = parent_layers;
            }
        }
        grafted.push(target_name);
    }

    Ok(grafted)
}

// ─── Eye control derivation ───────────────────────────────────────────────────

/// Reposition the eye control bones from the `master_eye.L` / `eye.L`
/// reference pair.
///
/// The eye controls have no direct source counterpart, so their corrected
/// position is extrapolated along the master-eye sight line: a slope and
/// intercept are computed per axis pair (x/y and z/y) from the reference
/// world-space head and tail, then inverted at the eye's depth. A zero
/// denominator falls back to the reference head's own coordinate. The left
/// result is mirrored on the x axis for the right eye, and the shared `eyes`
/// control is rescaled by the derived ratio times a fixed 1.35 cosmetic
/// factor, but only when the slope is non-degenerate.
pub fn derive_eye_control_positions(rig: &mut Skeleton) {
    let Some((m_head, m_tail)) = rig
        .bone("master_eye.L")
        .map(|bone| (rig.world_head(bone), rig.world_tail(bone)))
    else {
        return;
    };
    let Some((e_head, e_length)) = rig
        .bone("eye.L")
        .map(|bone| (rig.world_head(bone), bone.length()))
    else {
        return;
    };

    let dx = m_tail.x - m_head.x;
    let x_a = if dx != 0.0 { (m_tail.y - m_head.y) / dx } else { 0.0 };
    let x_b = m_head.y - x_a * m_head.x;
    let x_position = if x_a != 0.0 {
        (e_head.y - x_b) / x_a
    } else {
        m_head.x
    };

    let dz = m_tail.z - m_head.z;
    let z_a = if dz != 0.0 { (m_tail.y - m_head.y) / dz } else { 0.0 };
    let z_b = m_head.y - z_a * m_head.z;
    let z_position = if z_a != 0.0 {
        (e_head.y - z_b) / z_a
    } else {
        m_head.z
    };

    let mut edit = rig.edit_scope();

    if let Some(bone) = edit.bone_mut("eye.L") {
        bone.head.x = x_position;
        bone.head.z = z_position;
        bone.tail.x = x_position;
        bone.tail.z = z_position + e_length;
    }
    if let Some(bone) = edit.bone_mut("eye.R") {
        bone.head.x = -x_position;
        bone.head.z = z_position;
        bone.tail.x = -x_position;
        bone.tail.z = z_position + e_length;
    }

    if x_a != 0.0 {
        if let Some(bone) = edit.bone_mut("eyes") {
            bone.head.z = z_position;
            bone.tail.z = z_position + e_length;
            if e_head.x != 0.0 {
                let scale_ratio = (x_position - e_head.x) / e_head.x;
                let rescaled = bone.length() * scale_ratio * 1.35;
                bone.set_length(rescaled);
            }
        }
    }
}

// ─── Engine hierarchy rewrites ────────────────────────────────────────────────

/// Parent reassignments the target engine's humanoid importer requires.
const ENGINE_PARENT_REWRITES: [(&str, &str); 6] = [
    ("J_Bip_R_Shoulder", "J_Bip_C_UpperChest"),
    ("J_Bip_L_Shoulder", "J_Bip_C_UpperChest"),
    ("J_Bip_L_UpperArm", "J_Bip_L_Shoulder"),
    ("J_Bip_R_UpperArm", "J_Bip_R_Shoulder"),
    ("J_Bip_R_UpperLeg", "J_Bip_C_Hips"),
    ("J_Bip_L_UpperLeg", "J_Bip_C_Hips"),
];

const PROXIMAL_FINGER_BONES: [&str; 5] = ["Thumb1", "Index1", "Middle1", "Ring1", "Little1"];

const HEAD_BONE: &str = "J_Bip_C_Head";

const EYE_ADJUST_WIRING: [(&str, &str); 2] = [
    ("J_Adj_L_FaceEye", "MCH-eye.L"),
    ("J_Adj_R_FaceEye", "MCH-eye.R"),
];

/// Apply the fixed shoulder/arm/leg parent table plus the per-hand proximal
/// finger table. Each reassignment only happens when both the bone and its
/// new parent exist after renaming.
pub fn rewrite_engine_hierarchy(rig: &mut Skeleton) -> Result<()> {
    let mut rewrites: Vec<(String, String)> = ENGINE_PARENT_REWRITES
        .iter()
        .map(|(bone, parent)| (bone.to_string(), parent.to_string()))
        .collect();
    for side in ["R", "L"] {
        for finger in PROXIMAL_FINGER_BONES {
            rewrites.push((format!("J_Bip_{side}_{finger}"), format!("J_Bip_{side}_Hand")));
        }
    }

    let mut edit = rig.edit_scope();
    for (bone, parent) in rewrites {
        if edit.contains(&bone) && edit.contains(&parent) {
            edit.set_parent(&bone, Some(&parent))?;
        }
    }
    Ok(())
}

/// Wire the auxiliary eye-adjustment bones into the rig: re-parent them to
/// the head (edit scope), then add them to the deformation group and attach a
/// copy-transforms constraint following the mechanism eye bone (pose scope).
pub fn wire_eye_adjustment_bones(rig: &mut Skeleton) -> Result<()> {
    {
        let mut edit = rig.edit_scope();
        for (bone, _) in EYE_ADJUST_WIRING {
            if edit.contains(bone) && edit.contains(HEAD_BONE) {
                edit.set_parent(bone, Some(HEAD_BONE))?;
            }
        }
    }

    let mut pose = rig.pose_scope();
    for (bone_name, target) in EYE_ADJUST_WIRING {
        let has_target = pose.contains(target);
        let Some(bone) = pose.bone_mut(bone_name) else {
            continue;
        };
        bone.assign_group(DEFORM_GROUP);
        if has_target {
            bone.constraints.push(BoneConstraint::copy_transforms(target));
        }
    }
    Ok(())
}

// ─── IK polish ────────────────────────────────────────────────────────────────

const IK_STRETCH_PROPERTY: &str = "IK_Stretch";
const POLE_VECTOR_PROPERTY: &str = "pole_vector";

/// Zero the IK stretch factor on every pose bone that carries one.
pub fn disable_ik_stretching(rig: &mut Skeleton) {
    let mut pose = rig.pose_scope();
    for index in pose.indices() {
        if let Some(bone) = pose.bone_at_mut(index) {
            if let Some(stretch) = bone.custom_properties.get_mut(IK_STRETCH_PROPERTY) {
                *stretch = 0.0;
            }
        }
    }
}

/// Switch the arm IK pole-vector toggles on and surface their target bones.
///
/// Selection happens at pose level when the host supports it; otherwise it
/// goes through a short edit scope, which is the only place those hosts allow
/// bone selection.
pub fn show_ik_toggle_pole(rig: &mut Skeleton, capabilities: HostCapabilities) {
    let mut bones_to_select = Vec::new();

    {
        let mut pose = rig.pose_scope();
        for side in [".L", ".R"] {
            let toggle_bone = format!("upper_arm_parent{side}");
            let target_bone = format!("upper_arm_ik_target{side}");

            let pole_enabled = pose
                .bone(&toggle_bone)
                .and_then(|bone| bone.custom_properties.get(POLE_VECTOR_PROPERTY))
                .copied();
            if pole_enabled != Some(0.0) {
                continue;
            }
            if let Some(bone) = pose.bone_mut(&toggle_bone) {
                bone.custom_properties
                    .insert(POLE_VECTOR_PROPERTY.to_string(), 1.0);
            }
            if let Some(bone) = pose.bone_mut(&target_bone) {
                bone.hidden = false;
                bones_to_select.push(target_bone);
            }
        }

        if capabilities.pose_bone_selection {
            for name in &bones_to_select {
                if let Some(bone) = pose.bone_mut(name) {
                    bone.selected = true;
                }
            }
            return;
        }
    }

    if !bones_to_select.is_empty() {
        let mut edit = rig.edit_scope();
        for name in &bones_to_select {
            if let Some(bone) = edit.bone_mut(name) {
                bone.selected = true;
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;

    fn rig_with(names: &[(&str, Option<&str>)]) -> Skeleton {
        let mut rig = Skeleton::new("rig");
        for (name, parent) in names {
            rig.add_bone(*name).expect("unique name");
            if let Some(parent) = parent {
                rig.set_parent(name, Some(parent)).expect("parent exists");
            }
        }
        rig
    }

    #[test]
    fn given_facial_subtrees_when_removing_then_matches_and_descendants_are_deleted() {
        let mut rig = rig_with(&[
            ("DEF-spine", None),
            ("ORG-nose", Some("DEF-spine")),
            ("nose.001", Some("ORG-nose")),
            ("nose.002", Some("nose.001")),
            ("MCH-mouth_lock", Some("DEF-spine")),
            ("DEF-hand.L", Some("DEF-spine")),
        ]);

        remove_facial_bones(&mut rig);

        for gone in ["ORG-nose", "nose.001", "nose.002", "MCH-mouth_lock"] {
            assert!(!rig.contains(gone), "{gone} should be deleted");
        }
        assert!(rig.contains("DEF-spine"));
        assert!(rig.contains("DEF-hand.L"));
    }

    #[test]
    fn given_overlapping_subtree_matches_when_removing_then_deletion_is_not_fatal() {
        // brow.B.L matches on its own and is also a descendant of ORG-brow.B;
        // the collected set must deduplicate it.
        let mut rig = rig_with(&[("ORG-brow.B", None), ("brow.B.L", Some("ORG-brow.B"))]);

        remove_facial_bones(&mut rig);

        assert!(rig.is_empty());
    }

    #[test]
    fn given_correspondence_when_renaming_then_deform_bones_take_original_names() {
        let mut rig = rig_with(&[("DEF-spine", None), ("DEF-spine.001", Some("DEF-spine"))]);
        rig.bone_mut("DEF-spine").expect("bone exists").deform = true;
        rig.bone_mut("DEF-spine.001").expect("bone exists").deform = true;

        let correspondence = vec![
            ("spine".to_string(), "hips".to_string()),
            ("spine.001".to_string(), "spine".to_string()),
        ];
        let restoration = NameRestorationMap::from_ordered_lists(
            &["hips".to_string(), "spine".to_string()],
            &["J_Bip_C_Hips".to_string(), "J_Bip_C_Spine".to_string()],
        )
        .expect("equal lists");

        rename_deform_bones_to_source(&mut rig, &correspondence, &restoration)
            .expect("rename succeeds");

        assert!(rig.contains("J_Bip_C_Hips"));
        assert!(rig.contains("J_Bip_C_Spine"));
        assert!(!rig.contains("DEF-spine"));
        let spine = rig.bone("J_Bip_C_Spine").expect("bone exists");
        let hips_index = rig.index_of("J_Bip_C_Hips").expect("bone exists");
        assert_eq!(spine.parent(), Some(hips_index));
    }

    #[test]
    fn given_missing_deform_flag_when_renaming_then_pipeline_error_is_fatal() {
        let mut rig = rig_with(&[("DEF-spine", None)]);

        let correspondence = vec![("spine".to_string(), "Hips".to_string())];
        let result =
            rename_deform_bones_to_source(&mut rig, &correspondence, &NameRestorationMap::empty());

        assert!(matches!(
            result,
            Err(PipelineError::DeformFlagMissing { bone }) if bone == "DEF-spine"
        ));
    }

    #[test]
    fn given_eye_roles_when_renaming_then_org_bone_is_used_and_deform_is_forced() {
        let mut rig = rig_with(&[("ORG-eye.L", None)]);
        assert!(!rig.bone("ORG-eye.L").expect("bone exists").deform);

        let correspondence = vec![("eye.L".to_string(), "EyeL".to_string())];
        rename_deform_bones_to_source(&mut rig, &correspondence, &NameRestorationMap::empty())
            .expect("rename succeeds");

        let eye = rig.bone("EyeL").expect("bone exists");
        assert!(eye.deform);
    }

    #[test]
    fn given_lowercase_root_marker_when_renaming_then_it_is_capitalized() {
        let mut rig = rig_with(&[("root", None)]);

        rename_deform_bones_to_source(&mut rig, &[], &NameRestorationMap::empty())
            .expect("rename succeeds");

        assert!(rig.contains("Root"));
        assert!(!rig.contains("root"));
    }

    #[test]
    fn given_missing_rig_bone_when_renaming_then_pair_is_skipped() {
        let mut rig = rig_with(&[("DEF-spine", None)]);
        rig.bone_mut("DEF-spine").expect("bone exists").deform = true;

        let correspondence = vec![
            ("jaw".to_string(), "Jaw".to_string()),
            ("spine".to_string(), "Hips".to_string()),
        ];
        rename_deform_bones_to_source(&mut rig, &correspondence, &NameRestorationMap::empty())
            .expect("rename succeeds");

        assert!(rig.contains("Hips"));
    }

    #[test]
    fn given_unmapped_source_bone_when_grafting_then_geometry_is_copied_verbatim() {
        let mut source = Skeleton::new("vrm");
        source.add_bone("Spine").expect("unique name");
        source.add_bone("Tail").expect("unique name");
        source.set_parent("Tail", Some("Spine")).expect("parent exists");
        let tail = source.bone_mut("Tail").expect("bone exists");
        tail.head = Vector3::new(0.0, -0.1, 0.9);
        tail.tail = Vector3::new(0.0, -0.3, 0.8);

        let mut rig = rig_with(&[("Spine", None)]);
        rig.bone_mut("Spine").expect("bone exists").assign_group(DEFORM_GROUP);

        let grafted = graft_unmapped_source_bones(
            &mut rig,
            &source,
            &NameRestorationMap::empty(),
            HostCapabilities::default(),
        )
        .expect("grafting succeeds");

        assert_eq!(grafted, vec!["Tail".to_string()]);
        let tail = rig.bone("Tail").expect("bone exists");
        assert_eq!(tail.head, Vector3::new(0.0, -0.1, 0.9));
        assert_eq!(tail.tail, Vector3::new(0.0, -0.3, 0.8));
        assert_eq!(tail.parent(), rig.index_of("Spine"));
        assert!(tail.in_group(DEFORM_GROUP));
    }

    #[test]
    fn given_legacy_host_when_grafting_then_layer_bitmask_is_copied_instead_of_groups() {
        let mut source = Skeleton::new("vrm");
        source.add_bone("Spine").expect("unique name");
        source.add_bone("Skirt").expect("unique name");
        source.set_parent("Skirt", Some("Spine")).expect("parent exists");

        let mut rig = rig_with(&[("Spine", None)]);
        let spine = rig.bone_mut("Spine").expect("bone exists");
        spine.assign_group(DEFORM_GROUP);
        spine.layers = 0b1010;

        let capabilities = HostCapabilities {
            named_bone_collections: false,
            pose_bone_selection: false,
        };
        graft_unmapped_source_bones(&mut rig, &source, &NameRestorationMap::empty(), capabilities)
            .expect("grafting succeeds");

        let skirt = rig.bone("Skirt").expect("bone exists");
        assert_eq!(skirt.layers, 0b1010);
        assert!(!skirt.in_group(DEFORM_GROUP));
    }

    #[test]
    fn given_chain_behind_missing_ancestor_when_grafting_then_chain_is_left_unattached() {
        // HairTip precedes HairRoot in creation order, so its parent is not
        // yet in the rig when it is visited; single-pass means no retry.
        let mut source = Skeleton::new("vrm");
        source.add_bone("Head").expect("unique name");
        source.add_bone("HairTip").expect("unique name");
        source.add_bone("HairRoot").expect("unique name");
        source.set_parent("HairRoot", Some("Head")).expect("parent exists");
        source
            .set_parent("HairTip", Some("HairRoot"))
            .expect("parent exists");

        let mut rig = rig_with(&[("Head", None)]);
        let grafted = graft_unmapped_source_bones(
            &mut rig,
            &source,
            &NameRestorationMap::empty(),
            HostCapabilities::default(),
        )
        .expect("grafting succeeds");

        assert_eq!(grafted, vec!["HairRoot".to_string()]);
        assert!(!rig.contains("HairTip"));
    }

    #[test]
    fn given_restoration_map_when_grafting_then_original_names_are_used() {
        let mut source = Skeleton::new("vrm");
        source.add_bone("spine").expect("unique name");
        source.add_bone("bust_1").expect("unique name");
        source.set_parent("bust_1", Some("spine")).expect("parent exists");

        let restoration = NameRestorationMap::from_ordered_lists(
            &["spine".to_string(), "bust_1".to_string()],
            &["J_Bip_C_Spine".to_string(), "J_Sec_Bust1".to_string()],
        )
        .expect("equal lists");

        let mut rig = rig_with(&[("J_Bip_C_Spine", None)]);
        let grafted = graft_unmapped_source_bones(
            &mut rig,
            &source,
            &restoration,
            HostCapabilities::default(),
        )
        .expect("grafting succeeds");

        assert_eq!(grafted, vec!["J_Sec_Bust1".to_string()]);
        assert_eq!(
            rig.bone("J_Sec_Bust1").expect("bone exists").parent(),
            rig.index_of("J_Bip_C_Spine")
        );
    }

    #[test]
    fn given_aligned_reference_points_when_deriving_eyes_then_fallback_uses_reference_head() {
        // Zero horizontal delta on the master eye bone: the x slope is
        // degenerate and the eye must stay at the reference head's x.
        let mut rig = rig_with(&[("master_eye.L", None), ("eye.L", None), ("eye.R", None)]);
        let master = rig.bone_mut("master_eye.L").expect("bone exists");
        master.head = Vector3::new(0.7, 0.0, 1.5);
        master.tail = Vector3::new(0.7, 0.4, 1.5);
        let eye = rig.bone_mut("eye.L").expect("bone exists");
        eye.head = Vector3::new(0.6, 0.3, 1.45);
        eye.tail = Vector3::new(0.6, 0.3, 1.55);

        derive_eye_control_positions(&mut rig);

        let eye = rig.bone("eye.L").expect("bone exists");
        assert_eq!(eye.head.x, 0.7);
        let eye_r = rig.bone("eye.R").expect("bone exists");
        assert_eq!(eye_r.head.x, -0.7);
    }

    #[test]
    fn given_slanted_reference_when_deriving_eyes_then_position_is_extrapolated() {
        let mut rig = rig_with(&[
            ("master_eye.L", None),
            ("eye.L", None),
            ("eye.R", None),
            ("eyes", None),
        ]);
        let master = rig.bone_mut("master_eye.L").expect("bone exists");
        master.head = Vector3::new(1.0, 0.0, 1.5);
        master.tail = Vector3::new(1.2, 0.4, 1.5);
        let eye = rig.bone_mut("eye.L").expect("bone exists");
        eye.head = Vector3::new(0.7, 0.3, 1.45);
        eye.tail = Vector3::new(0.7, 0.3, 1.55);
        let eyes = rig.bone_mut("eyes").expect("bone exists");
        eyes.head = Vector3::new(0.0, 0.2, 1.4);
        eyes.tail = Vector3::new(0.0, 0.2, 1.6);

        derive_eye_control_positions(&mut rig);

        // x slope: 0.4 / 0.2 = 2, intercept -2 → x at y=0.3 is 1.15.
        let eye = rig.bone("eye.L").expect("bone exists");
        assert!((eye.head.x - 1.15).abs() < 1e-5);
        assert!((eye.head.z - 1.5).abs() < 1e-5);
        assert!((eye.tail.z - 1.6).abs() < 1e-5);
        let eye_r = rig.bone("eye.R").expect("bone exists");
        assert!((eye_r.head.x + 1.15).abs() < 1e-5);

        // eyes bone rescaled by (1.15-0.7)/0.7 * 1.35 against its 0.2 length
        // after repositioning to z=1.5..1.6 (length 0.1).
        let eyes = rig.bone("eyes").expect("bone exists");
        assert!((eyes.head.z - 1.5).abs() < 1e-5);
        let expected_length = 0.1 * ((1.15 - 0.7) / 0.7) * 1.35;
        assert!((eyes.length() - expected_length).abs() < 1e-5);
    }

    #[test]
    fn given_engine_parent_table_when_rewriting_then_existing_pairs_are_reparented() {
        let mut rig = rig_with(&[
            ("J_Bip_C_Hips", None),
            ("J_Bip_C_UpperChest", Some("J_Bip_C_Hips")),
            ("J_Bip_L_Shoulder", Some("J_Bip_C_Hips")),
            ("J_Bip_L_UpperArm", Some("J_Bip_C_Hips")),
            ("J_Bip_L_Hand", Some("J_Bip_L_UpperArm")),
            ("J_Bip_L_Index1", Some("J_Bip_C_Hips")),
        ]);

        rewrite_engine_hierarchy(&mut rig).expect("rewrites succeed");

        let shoulder = rig.bone("J_Bip_L_Shoulder").expect("bone exists");
        assert_eq!(shoulder.parent(), rig.index_of("J_Bip_C_UpperChest"));
        let upper_arm = rig.bone("J_Bip_L_UpperArm").expect("bone exists");
        assert_eq!(upper_arm.parent(), rig.index_of("J_Bip_L_Shoulder"));
        let index1 = rig.bone("J_Bip_L_Index1").expect("bone exists");
        assert_eq!(index1.parent(), rig.index_of("J_Bip_L_Hand"));
        // Right-side entries are absent and silently skipped.
        assert!(!rig.contains("J_Bip_R_Shoulder"));
    }

    #[test]
    fn given_eye_adjustment_bones_when_wiring_then_constraint_and_group_are_attached() {
        let mut rig = rig_with(&[
            ("J_Bip_C_Head", None),
            ("J_Adj_L_FaceEye", None),
            ("MCH-eye.L", Some("J_Bip_C_Head")),
        ]);

        wire_eye_adjustment_bones(&mut rig).expect("wiring succeeds");

        let adj = rig.bone("J_Adj_L_FaceEye").expect("bone exists");
        assert_eq!(adj.parent(), rig.index_of("J_Bip_C_Head"));
        assert!(adj.in_group(DEFORM_GROUP));
        assert_eq!(adj.constraints.len(), 1);
        assert_eq!(adj.constraints[0].target, "MCH-eye.L");
        assert!(!adj.constraints[0].muted);
    }

    #[test]
    fn given_ik_stretch_properties_when_disabling_then_values_are_zeroed() {
        let mut rig = rig_with(&[("upper_arm_ik.L", None), ("hand_ik.L", None)]);
        rig.bone_mut("upper_arm_ik.L")
            .expect("bone exists")
            .custom_properties
            .insert(IK_STRETCH_PROPERTY.to_string(), 1.0);

        disable_ik_stretching(&mut rig);

        let arm = rig.bone("upper_arm_ik.L").expect("bone exists");
        assert_eq!(arm.custom_properties.get(IK_STRETCH_PROPERTY), Some(&0.0));
        assert!(
            rig.bone("hand_ik.L")
                .expect("bone exists")
                .custom_properties
                .is_empty()
        );
    }

    #[test]
    fn given_disabled_pole_toggle_when_showing_then_toggle_is_set_and_target_unhidden() {
        let mut rig = rig_with(&[
            ("upper_arm_parent.L", None),
            ("upper_arm_ik_target.L", None),
        ]);
        rig.bone_mut("upper_arm_parent.L")
            .expect("bone exists")
            .custom_properties
            .insert(POLE_VECTOR_PROPERTY.to_string(), 0.0);
        rig.bone_mut("upper_arm_ik_target.L")
            .expect("bone exists")
            .hidden = true;

        show_ik_toggle_pole(&mut rig, HostCapabilities::default());

        let parent = rig.bone("upper_arm_parent.L").expect("bone exists");
        assert_eq!(
            parent.custom_properties.get(POLE_VECTOR_PROPERTY),
            Some(&1.0)
        );
        let target = rig.bone("upper_arm_ik_target.L").expect("bone exists");
        assert!(!target.hidden);
        assert!(target.selected);
    }
}
