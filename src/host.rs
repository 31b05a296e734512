use crate::roles::RoleMap;
use crate::skeleton::Skeleton;

/// Feature set of the hosting application, passed into the steps whose
/// behavior depends on it instead of branching on a host version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// The host exposes named bone collections. When false, only the legacy
    /// 32-slot layer bitmask is available and group memberships are carried
    /// through [`crate::skeleton::Bone::layers`].
    pub named_bone_collections: bool,
    /// Bones can be selected at pose level. When false, selection is only
    /// legal inside an edit scope.
    pub pose_bone_selection: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            named_bone_collections: true,
            pose_bone_selection: true,
        }
    }
}

/// Collaborator interface to the hosting application.
///
/// The pipeline is written against this trait only; it never reaches into
/// host state directly. All methods return opaque host errors, which the
/// pipeline wraps into its own error type. `generate_rig` is invoked exactly
/// once per run and is treated as deterministic for any tuned template.
pub trait RigHost {
    fn capabilities(&self) -> HostCapabilities;

    /// Spawn the generator's template skeleton. Failure here means the
    /// rig-generation capability is absent and is reported distinctly so the
    /// caller can guide the user to enable it.
    fn spawn_template(&self, name: &str) -> anyhow::Result<Skeleton>;

    /// Automatic humanoid role assignment for one skeleton.
    fn assign_roles(&self, skeleton: &Skeleton) -> anyhow::Result<RoleMap>;

    /// Normalize bone names in place. The ordering of bones must not change:
    /// the name restoration map pairs pre- and post-standardization names by
    /// position.
    fn standardize_names(&self, skeleton: &mut Skeleton) -> anyhow::Result<()>;

    /// Expand the tuned template into a full control rig with layered bone
    /// namespaces (`ORG-`/`DEF-`/`MCH-` plus control bones).
    fn generate_rig(&self, template: &Skeleton) -> anyhow::Result<Skeleton>;
}
