//! Conversion of a VRM humanoid armature into a Rigify-style control rig.
//!
//! The crate is an in-process graph-transformation pipeline: it corresponds
//! two skeletons through the fixed humanoid role set, reshapes and prunes the
//! generator's template to match the source anatomy, hands the template to
//! the host's rig generator, then rewrites the generated rig: facial subtree
//! removal, deformation-bone renaming back to the source's vertex-group
//! names, grafting of roleless source bones, eye-control derivation, and the
//! hierarchy fixes the target engine's humanoid importer expects.
//!
//! The host application is reached exclusively through [`host::RigHost`];
//! there is no file, network, or UI surface here.

pub mod error;
pub mod host;
pub mod mapping;
pub mod mesh;
pub mod metadata;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod rewrite;
pub mod roles;
pub mod skeleton;
pub mod template;
pub mod validation;

pub use error::{PipelineError, Result};
pub use host::{HostCapabilities, RigHost};
pub use metadata::AvatarMetadata;
pub use mesh::MeshObject;
pub use naming::NameRestorationMap;
pub use pipeline::{ConversionOutcome, PipelineOptions, convert_vrm_to_rigify};
pub use report::{RigifyReport, Severity, ValidationIssue};
pub use roles::{HumanBoneRole, RoleMap};
pub use skeleton::{Bone, InteractionMode, Skeleton};
