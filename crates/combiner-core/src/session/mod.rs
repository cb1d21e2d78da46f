//! Patch sessions
//!
//! A session owns one file for the duration of a patch run:
//!
//! - **Open**: the file is read into an [`Image`] with the requested layout
//! - **Run**: steps execute in declared order against a [`PatchContext`]
//! - **Commit**: the image plus any appended data is written back
//!
//! Nothing reaches the disk unless every mandatory step succeeded. Dropping a
//! session without committing leaves the file as it was.

mod report;
mod step;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::append::AppendBuffer;
use crate::error::{Error, Result};
use crate::image::{Image, ImageLayout};
use crate::pattern::Pattern;

pub use report::{ImageReport, SessionReport, StepReport};
pub use step::{PatchStep, Requirement, StepOutcome};

/// What to do when an optional step fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailurePolicy {
    pub optional_failures_fatal: bool,
}

impl FailurePolicy {
    pub fn lenient() -> Self {
        Self {
            optional_failures_fatal: false,
        }
    }

    pub fn strict() -> Self {
        Self {
            optional_failures_fatal: true,
        }
    }
}

struct Checkpoint {
    image: Image,
    append_len: usize,
}

/// State shared by the steps of one session
#[derive(Debug, Clone)]
pub struct PatchContext {
    name: String,
    image: Image,
    append: AppendBuffer,
    original_size: usize,
    steps: Vec<StepReport>,
}

impl PatchContext {
    pub fn new(name: impl Into<String>, image: Image) -> Self {
        let append = AppendBuffer::new(image.end_address());
        let original_size = image.len();
        Self {
            name: name.into(),
            image,
            append,
            original_size,
            steps: Vec::new(),
        }
    }

    /// Name of the image, used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut Image {
        &mut self.image
    }

    pub fn append(&self) -> &AppendBuffer {
        &self.append
    }

    pub fn append_mut(&mut self) -> &mut AppendBuffer {
        &mut self.append
    }

    /// Borrow the image and the append buffer together
    pub fn parts_mut(&mut self) -> (&mut Image, &mut AppendBuffer) {
        (&mut self.image, &mut self.append)
    }

    /// Parse `pattern` and locate it, adding `result_offset` to the match
    pub fn locate(&self, pattern: &str, result_offset: usize) -> Result<u32> {
        let pattern = Pattern::parse(pattern)?.with_result_offset(result_offset);
        self.image.locate(&pattern)
    }

    pub fn steps(&self) -> &[StepReport] {
        &self.steps
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            image: self.image.clone(),
            append_len: self.append.len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.image = checkpoint.image;
        self.append.truncate(checkpoint.append_len);
    }

    /// Run one step, turning its error into the session's verdict
    pub fn run_step(&mut self, step: &dyn PatchStep, policy: FailurePolicy) -> Result<StepOutcome> {
        info!("[{}] {}", self.name, step.name());
        let checkpoint = self.checkpoint();

        let outcome = match step.apply(self) {
            Ok(()) => StepOutcome::Applied,
            Err(err) => {
                self.restore(checkpoint);
                self.classify_failure(step, err, policy)?
            }
        };

        self.steps.push(StepReport {
            name: step.name().to_string(),
            requirement: step.requirement(),
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    fn classify_failure(
        &self,
        step: &dyn PatchStep,
        err: Error,
        policy: FailurePolicy,
    ) -> Result<StepOutcome> {
        let step_name = step.name().to_string();
        let image = self.name.clone();

        match step.requirement() {
            Requirement::Mandatory if err.is_version_mismatch() => {
                debug!("[{}] {} failed: {}", image, step_name, err);
                Err(Error::UnsupportedVersion {
                    step: step_name,
                    image,
                })
            }
            Requirement::Optional if err.is_recoverable() => {
                warn!("[{}] Optional step '{}' failed: {}", image, step_name, err);
                if policy.optional_failures_fatal {
                    Err(Error::OptionalStepFailed {
                        step: step_name,
                        image,
                        message: err.to_string(),
                    })
                } else {
                    Ok(StepOutcome::Warning(err.to_string()))
                }
            }
            _ => Err(Error::StepFailed {
                step: step_name,
                image,
                source: Box::new(err),
            }),
        }
    }

    /// Run `steps` in order, stopping at the first terminal failure
    pub fn run_steps(&mut self, steps: &[Box<dyn PatchStep + '_>], policy: FailurePolicy) -> Result<()> {
        for step in steps {
            self.run_step(step.as_ref(), policy)?;
        }
        Ok(())
    }

    fn report(&self) -> ImageReport {
        ImageReport {
            image: self.name.clone(),
            base_address: format!("0x{:08X}", self.image.translator().base_address()),
            original_size: self.original_size,
            appended_bytes: self.append.len(),
            steps: self.steps.clone(),
        }
    }

    /// Final bytes: the patched image followed by the appended region
    pub fn into_bytes(self) -> Vec<u8> {
        let mut image = self.image;
        if !self.append.is_empty() {
            image.extend(self.append.as_bytes());
        }
        image.into_bytes()
    }
}

/// A file-backed patch session
pub struct PatchSession {
    path: PathBuf,
    ctx: PatchContext,
    policy: FailurePolicy,
}

impl PatchSession {
    pub fn open<P: AsRef<Path>>(path: P, layout: ImageLayout) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = fs::read(&path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let image = Image::from_layout(data, layout)?;
        debug!(
            "Opened {} ({} bytes, end 0x{:08X})",
            name,
            image.len(),
            image.end_address()
        );

        Ok(Self {
            path,
            ctx: PatchContext::new(name, image),
            policy: FailurePolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn context(&self) -> &PatchContext {
        &self.ctx
    }

    pub fn run(&mut self, steps: &[Box<dyn PatchStep + '_>]) -> Result<()> {
        self.ctx.run_steps(steps, self.policy)
    }

    /// Write the image and appended data back to the file
    pub fn commit(self) -> Result<ImageReport> {
        let report = self.ctx.report();
        let bytes = self.ctx.into_bytes();
        fs::write(&self.path, &bytes)?;
        info!(
            "Wrote {} ({} bytes, {} appended)",
            report.image,
            bytes.len(),
            report.appended_bytes
        );
        Ok(report)
    }
}

/// Open `path`, run every step and write the result back.
///
/// On a terminal failure the file is left exactly as it was.
pub fn patch_file<P: AsRef<Path>>(
    path: P,
    layout: ImageLayout,
    steps: &[Box<dyn PatchStep + '_>],
    policy: FailurePolicy,
) -> Result<ImageReport> {
    let mut session = PatchSession::open(path, layout)?.with_policy(policy);
    session.run(steps)?;
    session.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: u32 = 0x8001_0000;

    struct WriteThenFail;

    impl PatchStep for WriteThenFail {
        fn name(&self) -> &str {
            "write then fail"
        }

        fn requirement(&self) -> Requirement {
            Requirement::Optional
        }

        fn apply(&self, ctx: &mut PatchContext) -> Result<()> {
            ctx.image_mut().write_u32(BASE, 0xFFFF_FFFF)?;
            ctx.append_mut().append(&[1, 2, 3]);
            ctx.locate("AB CD EF", 0)?;
            Ok(())
        }
    }

    struct SetWord(u32);

    impl PatchStep for SetWord {
        fn name(&self) -> &str {
            "set word"
        }

        fn apply(&self, ctx: &mut PatchContext) -> Result<()> {
            ctx.image_mut().write_u32(BASE + 4, self.0)
        }
    }

    struct OutOfBounds(Requirement);

    impl PatchStep for OutOfBounds {
        fn name(&self) -> &str {
            "out of bounds"
        }

        fn requirement(&self) -> Requirement {
            self.0
        }

        fn apply(&self, ctx: &mut PatchContext) -> Result<()> {
            ctx.image_mut().write_u32(BASE + 6, 0)
        }
    }

    fn context() -> PatchContext {
        PatchContext::new("test.exe", Image::headless(vec![0; 8], BASE))
    }

    #[test]
    fn test_failed_optional_step_is_rolled_back() {
        let mut ctx = context();
        let outcome = ctx.run_step(&WriteThenFail, FailurePolicy::lenient()).unwrap();
        assert!(outcome.is_warning());
        assert_eq!(ctx.image().as_bytes(), &[0; 8]);
        assert!(ctx.append().is_empty());
        assert_eq!(ctx.steps().len(), 1);
    }

    #[test]
    fn test_strict_policy_escalates_optional_failure() {
        let mut ctx = context();
        let err = ctx.run_step(&WriteThenFail, FailurePolicy::strict()).unwrap_err();
        assert!(matches!(err, Error::OptionalStepFailed { .. }));
    }

    #[test]
    fn test_bounds_error_never_downgraded() {
        let mut ctx = context();
        let err = ctx
            .run_step(&OutOfBounds(Requirement::Optional), FailurePolicy::lenient())
            .unwrap_err();
        match err {
            Error::StepFailed { step, image, source } => {
                assert_eq!(step, "out of bounds");
                assert_eq!(image, "test.exe");
                assert!(matches!(*source, Error::Bounds { .. }));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_steps_run_in_order() {
        let mut ctx = context();
        let steps: Vec<Box<dyn PatchStep>> = vec![Box::new(SetWord(1)), Box::new(SetWord(2))];
        ctx.run_steps(&steps, FailurePolicy::default()).unwrap();
        assert_eq!(ctx.image().read_u32(BASE + 4).unwrap(), 2);
        assert_eq!(ctx.steps().len(), 2);
    }

    #[test]
    fn test_sequence_stops_at_mandatory_failure() {
        let mut ctx = context();
        let steps: Vec<Box<dyn PatchStep>> = vec![
            Box::new(OutOfBounds(Requirement::Mandatory)),
            Box::new(SetWord(7)),
        ];
        assert!(ctx.run_steps(&steps, FailurePolicy::default()).is_err());
        assert_eq!(ctx.image().read_u32(BASE + 4).unwrap(), 0);
    }

    #[test]
    fn test_into_bytes_appends() {
        let mut ctx = context();
        let address = ctx.append_mut().append_aligned(&[9, 9], 4);
        assert_eq!(address, BASE + 8);
        let bytes = ctx.into_bytes();
        assert_eq!(bytes, vec![0, 0, 0, 0, 0, 0, 0, 0, 9, 9]);
    }
}
