use serde::{Deserialize, Serialize};

/// Severity level used by validation issues.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single validation issue produced during pre-flight checks or conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

/// Summary returned after a completed conversion run.
#[derive(Debug, Clone, Serialize)]
pub struct RigifyReport {
    pub source_name: String,
    pub rig_name: String,
    pub source_bone_count: usize,
    pub rig_bone_count: usize,
    pub mesh_count: usize,
    /// (template bone, source bone) pairs the conversion was driven by.
    pub mapped_bones: Vec<(String, String)>,
    /// Template bones removed before rig generation.
    pub pruned_template_bones: Vec<String>,
    /// Source bones without a role, grafted onto the rig post-generation.
    pub grafted_bones: Vec<String>,
    pub issues: Vec<ValidationIssue>,
}
