use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::error::Result;
use crate::session::PatchContext;

/// Whether a step's failure stops the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Requirement {
    Mandatory,
    Optional,
}

/// One named unit of work over an image.
///
/// Implementations locate everything they need and validate it before their
/// first write. The session also restores a checkpoint when a step fails, so
/// a failed step never leaves half of its edits behind.
pub trait PatchStep {
    fn name(&self) -> &str;

    fn requirement(&self) -> Requirement {
        Requirement::Mandatory
    }

    fn apply(&self, ctx: &mut PatchContext) -> Result<()>;
}

/// Non-terminal result of running a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum StepOutcome {
    Applied,
    /// Optional step failed and the session carried on
    Warning(String),
}

impl StepOutcome {
    pub fn is_warning(&self) -> bool {
        matches!(self, StepOutcome::Warning(_))
    }
}
