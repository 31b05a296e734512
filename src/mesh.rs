use std::collections::HashMap;

use log::debug;

use crate::naming::{NameRestorationMap, temp_rename_name};

/// A skinned mesh object as the pipeline sees it: a name, the vertex groups
/// that bind it to bones, and the armature its skin modifier follows.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshObject {
    pub name: String,
    pub vertex_groups: Vec<String>,
    /// Armature object driving the skin modifier.
    pub armature_target: Option<String>,
    /// Armature object this mesh is parented under.
    pub parent_armature: Option<String>,
    pub hidden: bool,
}

impl MeshObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertex_groups: Vec::new(),
            armature_target: None,
            parent_armature: None,
            hidden: false,
        }
    }
}

/// Rename a mesh's vertex groups from standardized bone names back to the
/// originals.
///
/// Standardized and original name sets can overlap, so a naive in-place
/// rename could produce transient duplicates. Every affected group is first
/// parked on a deterministic temporary name, then assigned its final name,
/// so no duplicate ever exists in the list.
pub fn rename_vertex_groups_to_original(mesh: &mut MeshObject, restoration: &NameRestorationMap) {
    if restoration.is_empty() {
        return;
    }

    let mut parked: HashMap<String, String> = HashMap::new();
    for group in &mut mesh.vertex_groups {
        if let Some(original) = restoration.original_for(group) {
            if original == group.as_str() {
                continue;
            }
            let temp_name = temp_rename_name(group);
            parked.insert(temp_name.clone(), original.to_string());
            *group = temp_name;
        }
    }

    for group in &mut mesh.vertex_groups {
        if let Some(target) = parked.get(group) {
            *group = target.clone();
        }
    }
}

/// Duplicate the source meshes for the new rig: host-style `.001` copy names,
/// vertex groups renamed to original bone names, parented under the rig.
/// Returns the copies together with a source-name → copy-name map for
/// expression re-pointing.
pub fn duplicate_meshes_for_rig(
    meshes: &[MeshObject],
    rig_name: &str,
    restoration: &NameRestorationMap,
) -> (Vec<MeshObject>, HashMap<String, String>) {
    let mut copies = Vec::with_capacity(meshes.len());
    let mut name_map = HashMap::new();

    for mesh in meshes {
        let mut copy = mesh.clone();
        copy.name = format!("{}.001", mesh.name);
        copy.hidden = false;
        rename_vertex_groups_to_original(&mut copy, restoration);
        copy.parent_armature = Some(rig_name.to_string());
        debug!("duplicated mesh '{}' as '{}'", mesh.name, copy.name);
        name_map.insert(mesh.name.clone(), copy.name.clone());
        copies.push(copy);
    }

    (copies, name_map)
}

/// Point every skin modifier at the given rig.
pub fn retarget_armature_modifiers(meshes: &mut [MeshObject], rig_name: &str) {
    for mesh in meshes {
        if mesh.armature_target.is_some() {
            mesh.armature_target = Some(rig_name.to_string());
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
