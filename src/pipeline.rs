use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::host::RigHost;
use crate::mapping::build_bone_correspondence;
use crate::mesh::{MeshObject, duplicate_meshes_for_rig, retarget_armature_modifiers};
use crate::metadata::{AvatarMetadata, copy_avatar_metadata};
use crate::naming::{NameRestorationMap, restore_bone_names};
use crate::report::{RigifyReport, Severity};
use crate::rewrite::{
    derive_eye_control_positions, disable_ik_stretching, graft_unmapped_source_bones,
    remove_facial_bones, rename_deform_bones_to_source, rewrite_engine_hierarchy,
    show_ik_toggle_pole, wire_eye_adjustment_bones,
};
use crate::skeleton::Skeleton;
use crate::template::{align_template_to_source, prune_unmapped_template_bones, tune_template_shape};
use crate::validation::validate_source;

// ─── Options ──────────────────────────────────────────────────────────────────

/// Conversion options exposed by the host-side operator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Hide the source armature and its meshes once the rig is built.
    pub hide_original: bool,
    /// Hide the consumed template; the generated rig supersedes it.
    pub hide_template: bool,
    /// Copy avatar metadata (humanoid bindings, spring rig, expressions)
    /// onto the new rig.
    pub copy_avatar_metadata: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            hide_original: true,
            hide_template: true,
            copy_avatar_metadata: true,
        }
    }
}

/// Everything a conversion run produces.
#[derive(Debug)]
pub struct ConversionOutcome {
    pub rig: Skeleton,
    /// The consumed template, kept hidden rather than destroyed.
    pub template: Skeleton,
    pub meshes: Vec<MeshObject>,
    pub metadata: Option<AvatarMetadata>,
    pub report: RigifyReport,
}

// ─── Pipeline ─────────────────────────────────────────────────────────────────

/// Run the full VRM→control-rig conversion against a host.
///
/// The source skeleton is standardized in place for the duration of the run
/// and its original bone names are restored before returning. A fatal error
/// leaves the graphs in whatever state the completed steps produced; there is
/// no rollback beyond the host's own undo stack.
pub fn convert_vrm_to_rigify(
    source: &mut Skeleton,
    source_meshes: &mut [MeshObject],
    source_metadata: Option<&AvatarMetadata>,
    host: &dyn RigHost,
    options: PipelineOptions,
) -> Result<ConversionOutcome> {
    let capabilities = host.capabilities();

    // Record original names, normalize, and pair the two lists positionally.
    let original_names = source.bone_names();
    host.standardize_names(source)?;
    let restoration = NameRestorationMap::from_ordered_lists(&source.bone_names(), &original_names)?;
    debug!("restoration map carries {} names", restoration.len());

    let template_name = format!("{}.metarig", source.name());
    let mut template = host
        .spawn_template(&template_name)
        .map_err(|err| PipelineError::GeneratorUnavailable(err.to_string()))?;

    let template_roles = host.assign_roles(&template)?;
    let source_roles = host.assign_roles(source)?;

    let issues = validate_source(source, &source_roles);
    if issues.iter().any(|issue| issue.severity == Severity::Error) {
        return Err(PipelineError::UnsupportedSource {
            issues: issues
                .into_iter()
                .filter(|issue| issue.severity == Severity::Error)
                .collect(),
        });
    }

    let correspondence = build_bone_correspondence(&template_roles, &source_roles);
    info!(
        "mapped {} humanoid roles between template and source",
        correspondence.len()
    );

    let pruned = prune_unmapped_template_bones(&mut template, &correspondence);
    align_template_to_source(&mut template, source, &correspondence);
    tune_template_shape(&mut template);

    let mut rig = host.generate_rig(&template)?;
    info!(
        "generated rig '{}' with {} bones",
        rig.name(),
        rig.bone_count()
    );

    remove_facial_bones(&mut rig);
    rename_deform_bones_to_source(&mut rig, &correspondence, &restoration)?;
    let grafted = graft_unmapped_source_bones(&mut rig, source, &restoration, capabilities)?;
    derive_eye_control_positions(&mut rig);
    disable_ik_stretching(&mut rig);
    show_ik_toggle_pole(&mut rig, capabilities);

    let (mut meshes, mesh_name_map) = duplicate_meshes_for_rig(source_meshes, rig.name(), &restoration);
    retarget_armature_modifiers(&mut meshes, rig.name());

    rewrite_engine_hierarchy(&mut rig)?;
    wire_eye_adjustment_bones(&mut rig)?;

    restore_bone_names(source, &original_names)?;

    let metadata = if options.copy_avatar_metadata {
        source_metadata
            .map(|metadata| copy_avatar_metadata(metadata, &rig, &restoration, &mesh_name_map))
    } else {
        None
    };

    if options.hide_template {
        template.hidden = true;
    }
    if options.hide_original {
        source.hidden = true;
        for mesh in source_meshes.iter_mut() {
            mesh.hidden = true;
        }
    }

    let report = RigifyReport {
        source_name: source.name().to_string(),
        rig_name: rig.name().to_string(),
        source_bone_count: source.bone_count(),
        rig_bone_count: rig.bone_count(),
        mesh_count: meshes.len(),
        mapped_bones: correspondence,
        pruned_template_bones: pruned,
        grafted_bones: grafted,
        issues,
    };

    Ok(ConversionOutcome {
        rig,
        template,
        meshes,
        metadata,
        report,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
