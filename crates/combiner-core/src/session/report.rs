use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::Result;
use crate::session::{Requirement, StepOutcome};

/// Outcome of one step, for the session report
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub name: String,
    pub requirement: Requirement,
    pub outcome: StepOutcome,
}

/// Everything that happened to one file
#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub image: String,
    pub base_address: String,
    pub original_size: usize,
    pub appended_bytes: usize,
    pub steps: Vec<StepReport>,
}

impl ImageReport {
    pub fn warnings(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|step| step.outcome.is_warning())
    }
}

/// Summary of a whole patch run
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub generated_at: DateTime<Local>,
    pub images: Vec<ImageReport>,
}

impl SessionReport {
    pub fn new() -> Self {
        Self {
            generated_at: Local::now(),
            images: Vec::new(),
        }
    }

    pub fn push(&mut self, image: ImageReport) {
        self.images.push(image);
    }

    pub fn warning_count(&self) -> usize {
        self.images.iter().map(|image| image.warnings().count()).sum()
    }

    /// Save report to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl Default for SessionReport {
    fn default() -> Self {
        Self::new()
    }
}
