use thiserror::Error;

use crate::report::ValidationIssue;

/// Result alias used throughout the conversion pipeline.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error values returned by conversion pipeline entry points.
///
/// Missing optional elements (an absent bone, role, or mapping entry) are
/// never errors; every pipeline step skips those locally. The variants here
/// are the conditions that abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The host could not provide the control-rig template, typically because
    /// the rig-generation add-on is not enabled.
    #[error("rig generation support is unavailable: {0}")]
    GeneratorUnavailable(String),

    /// A generated deformation-layer bone did not carry its deform flag.
    /// This indicates a correspondence or generator-compatibility bug
    /// upstream, not a recoverable model defect.
    #[error("generated bone '{bone}' is expected to deform but its deform flag is not set")]
    DeformFlagMissing { bone: String },

    /// The bone name lists recorded before and after name standardization no
    /// longer line up, so original names cannot be restored positionally.
    #[error("bone list changed during name standardization ({before} bones before, {after} after)")]
    RestorationListMismatch { before: usize, after: usize },

    /// An operation would have produced two bones with the same name.
    #[error("duplicate bone name '{0}'")]
    DuplicateBoneName(String),

    /// An operation addressed a bone that must exist at that point.
    #[error("bone '{0}' not found")]
    BoneNotFound(String),

    /// The source model failed pre-flight validation.
    #[error("unsupported source model: {}", format_issues(.issues))]
    UnsupportedSource { issues: Vec<ValidationIssue> },

    /// Any other failure reported by a host collaborator.
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message.clone())
        .collect::<Vec<String>>()
        .join(" / ")
}
