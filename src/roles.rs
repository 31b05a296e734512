use std::collections::BTreeMap;

// ─── Humanoid role enumeration ────────────────────────────────────────────────

/// Fixed VRM humanoid bone roles used to correspond bones across two
/// independently named skeletons.
///
/// The two trailing entries are bookkeeping slots carried by the humanoid
/// definition rather than anatomical roles; role-driven passes skip them via
/// [`HumanBoneRole::is_bookkeeping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HumanBoneRole {
    Hips,
    Spine,
    Chest,
    UpperChest,
    Neck,
    Head,
    LeftEye,
    RightEye,
    Jaw,
    LeftShoulder,
    LeftUpperArm,
    LeftLowerArm,
    LeftHand,
    RightShoulder,
    RightUpperArm,
    RightLowerArm,
    RightHand,
    LeftUpperLeg,
    LeftLowerLeg,
    LeftFoot,
    LeftToes,
    RightUpperLeg,
    RightLowerLeg,
    RightFoot,
    RightToes,
    LeftThumbMetacarpal,
    LeftThumbProximal,
    LeftThumbDistal,
    LeftIndexProximal,
    LeftIndexIntermediate,
    LeftIndexDistal,
    LeftMiddleProximal,
    LeftMiddleIntermediate,
    LeftMiddleDistal,
    LeftRingProximal,
    LeftRingIntermediate,
    LeftRingDistal,
    LeftLittleProximal,
    LeftLittleIntermediate,
    LeftLittleDistal,
    RightThumbMetacarpal,
    RightThumbProximal,
    RightThumbDistal,
    RightIndexProximal,
    RightIndexIntermediate,
    RightIndexDistal,
    RightMiddleProximal,
    RightMiddleIntermediate,
    RightMiddleDistal,
    RightRingProximal,
    RightRingIntermediate,
    RightRingDistal,
    RightLittleProximal,
    RightLittleIntermediate,
    RightLittleDistal,
    LastBoneNames,
    InitialAutomaticBoneAssignment,
}

impl HumanBoneRole {
    /// All roles in enumeration order, bookkeeping entries included.
    pub const ALL: [HumanBoneRole; 57] = [
        HumanBoneRole::Hips,
        HumanBoneRole::Spine,
        HumanBoneRole::Chest,
        HumanBoneRole::UpperChest,
        HumanBoneRole::Neck,
        HumanBoneRole::Head,
        HumanBoneRole::LeftEye,
        HumanBoneRole::RightEye,
        HumanBoneRole::Jaw,
        HumanBoneRole::LeftShoulder,
        HumanBoneRole::LeftUpperArm,
        HumanBoneRole::LeftLowerArm,
        HumanBoneRole::LeftHand,
        HumanBoneRole::RightShoulder,
        HumanBoneRole::RightUpperArm,
        HumanBoneRole::RightLowerArm,
        HumanBoneRole::RightHand,
        HumanBoneRole::LeftUpperLeg,
        HumanBoneRole::LeftLowerLeg,
        HumanBoneRole::LeftFoot,
        HumanBoneRole::LeftToes,
        HumanBoneRole::RightUpperLeg,
        HumanBoneRole::RightLowerLeg,
        HumanBoneRole::RightFoot,
        HumanBoneRole::RightToes,
        HumanBoneRole::LeftThumbMetacarpal,
        HumanBoneRole::LeftThumbProximal,
        HumanBoneRole::LeftThumbDistal,
        HumanBoneRole::LeftIndexProximal,
        HumanBoneRole::LeftIndexIntermediate,
        HumanBoneRole::LeftIndexDistal,
        HumanBoneRole::LeftMiddleProximal,
        HumanBoneRole::LeftMiddleIntermediate,
        HumanBoneRole::LeftMiddleDistal,
        HumanBoneRole::LeftRingProximal,
        HumanBoneRole::LeftRingIntermediate,
        HumanBoneRole::LeftRingDistal,
        HumanBoneRole::LeftLittleProximal,
        HumanBoneRole::LeftLittleIntermediate,
        HumanBoneRole::LeftLittleDistal,
        HumanBoneRole::RightThumbMetacarpal,
        HumanBoneRole::RightThumbProximal,
        HumanBoneRole::RightThumbDistal,
        HumanBoneRole::RightIndexProximal,
        HumanBoneRole::RightIndexIntermediate,
        HumanBoneRole::RightIndexDistal,
        HumanBoneRole::RightMiddleProximal,
        HumanBoneRole::RightMiddleIntermediate,
        HumanBoneRole::RightMiddleDistal,
        HumanBoneRole::RightRingProximal,
        HumanBoneRole::RightRingIntermediate,
        HumanBoneRole::RightRingDistal,
        HumanBoneRole::RightLittleProximal,
        HumanBoneRole::RightLittleIntermediate,
        HumanBoneRole::RightLittleDistal,
        HumanBoneRole::LastBoneNames,
        HumanBoneRole::InitialAutomaticBoneAssignment,
    ];

    /// VRM identifier for this role.
    pub fn as_str(self) -> &'static str {
        match self {
            HumanBoneRole::Hips => "hips",
            HumanBoneRole::Spine => "spine",
            HumanBoneRole::Chest => "chest",
            HumanBoneRole::UpperChest => "upperChest",
            HumanBoneRole::Neck => "neck",
            HumanBoneRole::Head => "head",
            HumanBoneRole::LeftEye => "leftEye",
            HumanBoneRole::RightEye => "rightEye",
            HumanBoneRole::Jaw => "jaw",
            HumanBoneRole::LeftShoulder => "leftShoulder",
            HumanBoneRole::LeftUpperArm => "leftUpperArm",
            HumanBoneRole::LeftLowerArm => "leftLowerArm",
            HumanBoneRole::LeftHand => "leftHand",
            HumanBoneRole::RightShoulder => "rightShoulder",
            HumanBoneRole::RightUpperArm => "rightUpperArm",
            HumanBoneRole::RightLowerArm => "rightLowerArm",
            HumanBoneRole::RightHand => "rightHand",
            HumanBoneRole::LeftUpperLeg => "leftUpperLeg",
            HumanBoneRole::LeftLowerLeg => "leftLowerLeg",
            HumanBoneRole::LeftFoot => "leftFoot",
            HumanBoneRole::LeftToes => "leftToes",
            HumanBoneRole::RightUpperLeg => "rightUpperLeg",
            HumanBoneRole::RightLowerLeg => "rightLowerLeg",
            HumanBoneRole::RightFoot => "rightFoot",
            HumanBoneRole::RightToes => "rightToes",
            HumanBoneRole::LeftThumbMetacarpal => "leftThumbMetacarpal",
            HumanBoneRole::LeftThumbProximal => "leftThumbProximal",
            HumanBoneRole::LeftThumbDistal => "leftThumbDistal",
            HumanBoneRole::LeftIndexProximal => "leftIndexProximal",
            HumanBoneRole::LeftIndexIntermediate => "leftIndexIntermediate",
            HumanBoneRole::LeftIndexDistal => "leftIndexDistal",
            HumanBoneRole::LeftMiddleProximal => "leftMiddleProximal",
            HumanBoneRole::LeftMiddleIntermediate => "leftMiddleIntermediate",
            HumanBoneRole::LeftMiddleDistal => "leftMiddleDistal",
            HumanBoneRole::LeftRingProximal => "leftRingProximal",
            HumanBoneRole::LeftRingIntermediate => "leftRingIntermediate",
            HumanBoneRole::LeftRingDistal => "leftRingDistal",
            HumanBoneRole::LeftLittleProximal => "leftLittleProximal",
            HumanBoneRole::LeftLittleIntermediate => "leftLittleIntermediate",
            HumanBoneRole::LeftLittleDistal => "leftLittleDistal",
            HumanBoneRole::RightThumbMetacarpal => "rightThumbMetacarpal",
            HumanBoneRole::RightThumbProximal => "rightThumbProximal",
            HumanBoneRole::RightThumbDistal => "rightThumbDistal",
            HumanBoneRole::RightIndexProximal => "rightIndexProximal",
            HumanBoneRole::RightIndexIntermediate => "rightIndexIntermediate",
            HumanBoneRole::RightIndexDistal => "rightIndexDistal",
            HumanBoneRole::RightMiddleProximal => "rightMiddleProximal",
            HumanBoneRole::RightMiddleIntermediate => "rightMiddleIntermediate",
            HumanBoneRole::RightMiddleDistal => "rightMiddleDistal",
            HumanBoneRole::RightRingProximal => "rightRingProximal",
            HumanBoneRole::RightRingIntermediate => "rightRingIntermediate",
            HumanBoneRole::RightRingDistal => "rightRingDistal",
            HumanBoneRole::RightLittleProximal => "rightLittleProximal",
            HumanBoneRole::RightLittleIntermediate => "rightLittleIntermediate",
            HumanBoneRole::RightLittleDistal => "rightLittleDistal",
            HumanBoneRole::LastBoneNames => "lastBoneNames",
            HumanBoneRole::InitialAutomaticBoneAssignment => "initialAutomaticBoneAssignment",
        }
    }

    /// True for the non-anatomical bookkeeping slots.
    pub fn is_bookkeeping(self) -> bool {
        matches!(
            self,
            HumanBoneRole::LastBoneNames | HumanBoneRole::InitialAutomaticBoneAssignment
        )
    }
}

// ─── Role map ─────────────────────────────────────────────────────────────────

/// Read-only role→bone-name lookup computed per skeleton by the host's
/// automatic humanoid bone assignment.
#[derive(Debug, Clone, Default)]
pub struct RoleMap {
    bindings: BTreeMap<HumanBoneRole, String>,
}

impl RoleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a role to a bone name. Empty names are treated as unbound by
    /// [`RoleMap::bone_name`], matching hosts that store blank bindings.
    pub fn bind(&mut self, role: HumanBoneRole, bone_name: impl Into<String>) {
        self.bindings.insert(role, bone_name.into());
    }

    /// Bone name bound to a role, or `None` when absent or blank.
    pub fn bone_name(&self, role: HumanBoneRole) -> Option<&str> {
        self.bindings
            .get(&role)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Iterate bound (role, bone name) pairs in role-enumeration order,
    /// skipping blank bindings and bookkeeping slots.
    pub fn iter(&self) -> impl Iterator<Item = (HumanBoneRole, &str)> {
        HumanBoneRole::ALL
            .iter()
            .filter(|role| !role.is_bookkeeping())
            .filter_map(|role| self.bone_name(*role).map(|name| (*role, name)))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
