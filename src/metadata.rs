use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::naming::NameRestorationMap;
use crate::roles::RoleMap;
use crate::skeleton::Skeleton;

// ─── Secondary-motion (spring) settings ───────────────────────────────────────

/// One springy joint of a secondary-motion chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringJoint {
    pub bone_name: String,
    pub hit_radius: f32,
    pub stiffness: f32,
    pub gravity_power: f32,
    pub gravity_dir: [f32; 3],
    pub drag_force: f32,
}

/// Collision shape protecting meshes from spring chains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Sphere {
        offset: [f32; 3],
        radius: f32,
    },
    Capsule {
        offset: [f32; 3],
        radius: f32,
        tail: [f32; 3],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringCollider {
    pub name: String,
    pub bone_name: String,
    pub shape: ColliderShape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringColliderGroup {
    pub name: String,
    pub collider_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub name: String,
    pub center_bone: Option<String>,
    pub joints: Vec<SpringJoint>,
    pub collider_group_names: Vec<String>,
}

// ─── Avatar metadata ──────────────────────────────────────────────────────────

/// Avatar metadata carried alongside a skeleton: authorship/license meta,
/// expression bindings, look-at settings, the humanoid role assignment, and
/// the secondary-motion rig.
///
/// The pipeline never interprets `meta`, `expressions`, or `look_at`; they
/// are opaque blobs copied verbatim apart from re-pointed name references.
#[derive(Debug, Clone, Default)]
pub struct AvatarMetadata {
    pub meta: Value,
    pub expressions: Value,
    pub look_at: Value,
    pub humanoid: RoleMap,
    pub colliders: Vec<SpringCollider>,
    pub collider_groups: Vec<SpringColliderGroup>,
    pub springs: Vec<Spring>,
    pub enable_spring_animation: bool,
}

/// Copy avatar metadata onto a freshly built rig.
///
/// Bone-name references go through the restoration map, since the rig carries
/// original names while the source metadata was recorded against standardized
/// ones. Humanoid bindings whose bone did not survive into the rig are
/// dropped; spring references are re-pointed unconditionally so that chains
/// attached to grafted bones keep working. Expression morph binds reference
/// mesh objects by name and are re-pointed through the mesh duplication map.
pub fn copy_avatar_metadata(
    source: &AvatarMetadata,
    rig: &Skeleton,
    restoration: &NameRestorationMap,
    mesh_name_map: &HashMap<String, String>,
) -> AvatarMetadata {
    let mut humanoid = RoleMap::new();
    for (role, bone_name) in source.humanoid.iter() {
        let effective = restoration.effective_name(bone_name);
        if rig.contains(effective) {
            humanoid.bind(role, effective);
        }
    }

    let colliders = source
        .colliders
        .iter()
        .map(|collider| SpringCollider {
            name: collider.name.clone(),
            bone_name: restoration.effective_name(&collider.bone_name).to_string(),
            shape: collider.shape.clone(),
        })
        .collect();

    let springs = source
        .springs
        .iter()
        .map(|spring| Spring {
            name: spring.name.clone(),
            center_bone: spring
                .center_bone
                .as_deref()
                .map(|name| restoration.effective_name(name).to_string()),
            joints: spring
                .joints
                .iter()
                .map(|joint| SpringJoint {
                    bone_name: restoration.effective_name(&joint.bone_name).to_string(),
                    ..joint.clone()
                })
                .collect(),
            collider_group_names: spring.collider_group_names.clone(),
        })
        .collect();

    let mut expressions = source.expressions.clone();
    repoint_mesh_object_names(&mut expressions, mesh_name_map);

    AvatarMetadata {
        meta: source.meta.clone(),
        expressions,
        look_at: source.look_at.clone(),
        humanoid,
        colliders,
        collider_groups: source.collider_groups.clone(),
        springs,
        enable_spring_animation: source.enable_spring_animation,
    }
}

/// Replace every `mesh_object_name` string in an arbitrary JSON tree through
/// the given map. Unknown names are left untouched.
fn repoint_mesh_object_names(value: &mut Value, mesh_name_map: &HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(name)) = map.get_mut("mesh_object_name") {
                if let Some(new_name) = mesh_name_map.get(name.as_str()) {
                    *name = new_name.clone();
                }
            }
            for (_, child) in map.iter_mut() {
                repoint_mesh_object_names(child, mesh_name_map);
            }
        }
        Value::Array(array) => {
            for child in array.iter_mut() {
                repoint_mesh_object_names(child, mesh_name_map);
            }
        }
        _ => {}
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::roles::HumanBoneRole;

    use super::*;

    fn restoration(pairs: &[(&str, &str)]) -> NameRestorationMap {
        let standardized: Vec<String> = pairs.iter().map(|(s, _)| s.to_string()).collect();
        let original: Vec<String> = pairs.iter().map(|(_, o)| o.to_string()).collect();
        NameRestorationMap::from_ordered_lists(&standardized, &original).expect("equal lists")
    }

    fn rig_with(names: &[&str]) -> Skeleton {
        let mut rig = Skeleton::new("rig");
        for name in names {
            rig.add_bone(*name).expect("unique name");
        }
        rig
    }

    #[test]
    fn given_humanoid_bindings_when_copying_then_names_are_restored_and_missing_dropped() {
        let mut source = AvatarMetadata::default();
        source.humanoid.bind(HumanBoneRole::Hips, "hips");
        source.humanoid.bind(HumanBoneRole::Spine, "spine");

        let rig = rig_with(&["J_Bip_C_Hips"]);
        let map = restoration(&[("hips", "J_Bip_C_Hips"), ("spine", "J_Bip_C_Spine")]);

        let copied = copy_avatar_metadata(&source, &rig, &map, &HashMap::new());

        assert_eq!(
            copied.humanoid.bone_name(HumanBoneRole::Hips),
            Some("J_Bip_C_Hips")
        );
        assert_eq!(copied.humanoid.bone_name(HumanBoneRole::Spine), None);
    }

    #[test]
    fn given_spring_chains_when_copying_then_joint_and_center_references_are_repointed() {
        let mut source = AvatarMetadata::default();
        source.springs.push(Spring {
            name: "hair".to_string(),
            center_bone: Some("head".to_string()),
            joints: vec![SpringJoint {
                bone_name: "hair_1".to_string(),
                hit_radius: 0.02,
                stiffness: 0.8,
                gravity_power: 0.1,
                gravity_dir: [0.0, -1.0, 0.0],
                drag_force: 0.4,
            }],
            collider_group_names: vec!["head_colliders".to_string()],
        });
        source.colliders.push(SpringCollider {
            name: "head_collider".to_string(),
            bone_name: "head".to_string(),
            shape: ColliderShape::Sphere {
                offset: [0.0, 0.1, 0.0],
                radius: 0.09,
            },
        });

        let rig = rig_with(&["J_Bip_C_Head", "J_Sec_Hair1"]);
        let map = restoration(&[("head", "J_Bip_C_Head"), ("hair_1", "J_Sec_Hair1")]);

        let copied = copy_avatar_metadata(&source, &rig, &map, &HashMap::new());

        assert_eq!(copied.springs[0].center_bone.as_deref(), Some("J_Bip_C_Head"));
        assert_eq!(copied.springs[0].joints[0].bone_name, "J_Sec_Hair1");
        assert_eq!(copied.springs[0].joints[0].stiffness, 0.8);
        assert_eq!(copied.colliders[0].bone_name, "J_Bip_C_Head");
    }

    #[test]
    fn given_expression_binds_when_copying_then_mesh_references_follow_duplicates() {
        let mut source = AvatarMetadata::default();
        source.expressions = json!({
            "preset": {
                "happy": {
                    "morph_target_binds": [
                        {"node": {"mesh_object_name": "Face"}, "index": 3, "weight": 1.0}
                    ]
                }
            },
            "custom": []
        });

        let mesh_name_map =
            HashMap::from([("Face".to_string(), "Face.001".to_string())]);
        let rig = rig_with(&[]);
        let copied =
            copy_avatar_metadata(&source, &rig, &NameRestorationMap::empty(), &mesh_name_map);

        assert_eq!(
            copied
                .expressions
                .pointer("/preset/happy/morph_target_binds/0/node/mesh_object_name")
                .and_then(Value::as_str),
            Some("Face.001")
        );
        // Weights and indices ride along untouched.
        assert_eq!(
            copied
                .expressions
                .pointer("/preset/happy/morph_target_binds/0/index")
                .and_then(Value::as_u64),
            Some(3)
        );
    }

    #[test]
    fn given_meta_blob_when_copying_then_it_is_carried_verbatim() {
        let mut source = AvatarMetadata::default();
        source.meta = json!({"name": "Mio", "version": "1.2", "license": "CC0"});
        source.enable_spring_animation = true;

        let rig = rig_with(&[]);
        let copied =
            copy_avatar_metadata(&source, &rig, &NameRestorationMap::empty(), &HashMap::new());

        assert_eq!(copied.meta, source.meta);
        assert!(copied.enable_spring_animation);
    }
}
