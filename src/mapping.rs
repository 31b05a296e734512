use crate::roles::{HumanBoneRole, RoleMap};

/// Build the (template bone, source bone) correspondence list from two
/// independently computed role maps.
///
/// One pair is emitted, in role-enumeration order, for every anatomical role
/// bound with a non-blank bone name in both maps. Roles bound in only one
/// skeleton are silently skipped; the bookkeeping slots are never considered.
pub fn build_bone_correspondence(
    template_roles: &RoleMap,
    source_roles: &RoleMap,
) -> Vec<(String, String)> {
    HumanBoneRole::ALL
        .iter()
        .filter(|role| !role.is_bookkeeping())
        .filter_map(|role| {
            let template_bone = template_roles.bone_name(*role)?;
            let source_bone = source_roles.bone_name(*role)?;
            Some((template_bone.to_string(), source_bone.to_string()))
        })
        .collect()
}
