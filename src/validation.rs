use crate::report::{Severity, ValidationIssue};
use crate::roles::{HumanBoneRole, RoleMap};
use crate::skeleton::Skeleton;

// ─── Required roles and relations ─────────────────────────────────────────────

/// Humanoid roles a source model must bind for conversion to proceed.
const REQUIRED_ROLES: [HumanBoneRole; 17] = [
    HumanBoneRole::Hips,
    HumanBoneRole::Spine,
    HumanBoneRole::Chest,
    HumanBoneRole::Neck,
    HumanBoneRole::Head,
    HumanBoneRole::LeftUpperArm,
    HumanBoneRole::LeftLowerArm,
    HumanBoneRole::LeftHand,
    HumanBoneRole::RightUpperArm,
    HumanBoneRole::RightLowerArm,
    HumanBoneRole::RightHand,
    HumanBoneRole::LeftUpperLeg,
    HumanBoneRole::LeftLowerLeg,
    HumanBoneRole::LeftFoot,
    HumanBoneRole::RightUpperLeg,
    HumanBoneRole::RightLowerLeg,
    HumanBoneRole::RightFoot,
];

const REQUIRED_PARENT_RELATIONS: [(HumanBoneRole, HumanBoneRole); 12] = [
    (HumanBoneRole::Hips, HumanBoneRole::Spine),
    (HumanBoneRole::Spine, HumanBoneRole::Chest),
    (HumanBoneRole::Chest, HumanBoneRole::Neck),
    (HumanBoneRole::Neck, HumanBoneRole::Head),
    (HumanBoneRole::LeftUpperArm, HumanBoneRole::LeftLowerArm),
    (HumanBoneRole::LeftLowerArm, HumanBoneRole::LeftHand),
    (HumanBoneRole::RightUpperArm, HumanBoneRole::RightLowerArm),
    (HumanBoneRole::RightLowerArm, HumanBoneRole::RightHand),
    (HumanBoneRole::LeftUpperLeg, HumanBoneRole::LeftLowerLeg),
    (HumanBoneRole::LeftLowerLeg, HumanBoneRole::LeftFoot),
    (HumanBoneRole::RightUpperLeg, HumanBoneRole::RightLowerLeg),
    (HumanBoneRole::RightLowerLeg, HumanBoneRole::RightFoot),
];

// ─── Pre-flight checks ────────────────────────────────────────────────────────

/// Return required roles missing from the source role map.
pub fn collect_missing_required_roles(roles: &RoleMap) -> Vec<HumanBoneRole> {
    REQUIRED_ROLES
        .iter()
        .filter(|role| roles.bone_name(**role).is_none())
        .copied()
        .collect()
}

/// Validate required humanoid parent relationships against the actual bone
/// hierarchy. A `chest → neck` relation also accepts an interposed
/// `upperChest` bone.
pub fn validate_role_hierarchy(skeleton: &Skeleton, roles: &RoleMap) -> Vec<ValidationIssue> {
    REQUIRED_PARENT_RELATIONS
        .iter()
        .filter_map(|(parent_role, child_role)| {
            let parent_index = skeleton.index_of(roles.bone_name(*parent_role)?)?;
            let child_bone = skeleton.bone(roles.bone_name(*child_role)?)?;

            let Some(actual_parent_index) = child_bone.parent() else {
                return Some(ValidationIssue {
                    severity: Severity::Error,
                    code: "INVALID_BONE_HIERARCHY".to_string(),
                    message: format!(
                        "[ERROR] Non-standard bone hierarchy: parent for '{}' is not set",
                        child_role.as_str()
                    ),
                });
            };

            let is_valid_parent = if *parent_role == HumanBoneRole::Chest
                && *child_role == HumanBoneRole::Neck
            {
                let upper_chest_index = roles
                    .bone_name(HumanBoneRole::UpperChest)
                    .and_then(|name| skeleton.index_of(name));
                actual_parent_index == parent_index
                    || upper_chest_index == Some(actual_parent_index)
            } else {
                actual_parent_index == parent_index
            };

            if !is_valid_parent {
                return Some(ValidationIssue {
                    severity: Severity::Error,
                    code: "INVALID_BONE_HIERARCHY".to_string(),
                    message: format!(
                        "[ERROR] Non-standard bone hierarchy: '{}' is not parented under '{}'",
                        child_role.as_str(),
                        parent_role.as_str()
                    ),
                });
            }

            None
        })
        .collect()
}

/// Run every pre-flight check over a source skeleton and its role map.
pub fn validate_source(skeleton: &Skeleton, roles: &RoleMap) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for role in collect_missing_required_roles(roles) {
        issues.push(ValidationIssue {
            severity: Severity::Error,
            code: "MISSING_REQUIRED_BONE".to_string(),
            message: format!("[ERROR] Required bone '{}' was not found", role.as_str()),
        });
    }

    for (role, bone_name) in roles.iter() {
        if !skeleton.contains(bone_name) {
            issues.push(ValidationIssue {
                severity: Severity::Error,
                code: "INVALID_BONE_BINDING".to_string(),
                message: format!(
                    "[ERROR] Role '{}' is bound to missing bone '{}'",
                    role.as_str(),
                    bone_name
                ),
            });
        }
    }

    issues.extend(validate_role_hierarchy(skeleton, roles));
    issues
}

// ─── Tests ────────────────────────────────────────────────────────────────────
