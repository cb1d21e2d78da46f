//! Patch command
//!
//! Runs the patch catalogue over an unpacked work directory, in this order:
//! boot executable, main menu overlay, race overlay, VOL replacements, race
//! text table, arcade overlay. A mandatory failure stops the run with the
//! failing file left untouched.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use combiner_core::layout::overlay;
use combiner_core::patches::{TextTableStep, arcade, boot, menu, race};
use combiner_core::{
    DirectoryRecords, FailurePolicy, ImageLayout, ImageReport, PatchStep, SessionReport,
    StepOutcome, boot_executable_name, patch_file,
};
use owo_colors::OwoColorize;
use tracing::{info, warn};

use crate::cli::PatchArgs;
use crate::config::Config;
use crate::discs::WorkDir;
use crate::replace::replace_files;

const OVERLAY: ImageLayout = ImageLayout::Headless {
    base: overlay::BASE_ADDRESS,
};
const TEXT_TABLE: ImageLayout = ImageLayout::Headless { base: 0 };

struct Runner {
    policy: FailurePolicy,
    report: SessionReport,
}

impl Runner {
    fn patch(&mut self, path: &Path, layout: ImageLayout, steps: &[Box<dyn PatchStep + '_>]) -> Result<()> {
        info!("Patching {}...", path.display());
        let image = patch_file(path, layout, steps, self.policy)
            .with_context(|| format!("Failed to patch {}", path.display()))?;
        self.record(image);
        Ok(())
    }

    /// Patch a file whose absence is an optional failure
    fn patch_optional(&mut self, path: &Path, layout: ImageLayout, steps: &[Box<dyn PatchStep + '_>]) -> Result<()> {
        if path.is_file() {
            return self.patch(path, layout, steps);
        }
        if self.policy.optional_failures_fatal {
            bail!("{} not found (use --ignore-errors to skip it)", path.display());
        }
        warn!("{} not found, skipping", path.display());
        Ok(())
    }

    fn record(&mut self, image: ImageReport) {
        for step in image.warnings() {
            if let StepOutcome::Warning(message) = &step.outcome {
                eprintln!(
                    "{} {} ({}): {}",
                    "warning:".yellow().bold(),
                    image.image,
                    step.name,
                    message
                );
            }
        }
        self.report.push(image);
    }
}

pub fn run(config: &Config, args: &PatchArgs) -> Result<()> {
    let work = WorkDir::new(&args.work);
    let discs = work.discs()?;
    let ovl_dir = work.ovl_dir();
    let vol_dir = work.vol_dir();

    let policy = if args.ignore_errors {
        FailurePolicy::lenient()
    } else {
        FailurePolicy::strict()
    };
    let mut runner = Runner {
        policy,
        report: SessionReport::new(),
    };

    if !args.no_fmvs {
        let cnf_path = discs.simulation.join("SYSTEM.CNF");
        let cnf = fs::read_to_string(&cnf_path)
            .with_context(|| format!("Failed to read {}", cnf_path.display()))?;
        let boot_name = boot_executable_name(&cnf)?;
        runner.patch(
            &discs.simulation.join(boot_name),
            ImageLayout::Headed,
            &boot::steps(),
        )?;
    }

    let records = DirectoryRecords::new(&config.resources.menu_entries);
    runner.patch(
        &ovl_dir.join(overlay::MAIN_MENU),
        OVERLAY,
        &menu::steps(&records),
    )?;

    if !args.no_fmvs {
        runner.patch(&ovl_dir.join(overlay::RACE), OVERLAY, &race::steps())?;
    }

    info!("Replacing VOL files...");
    let summary = replace_files(&config.resources.vol_replacements, &vol_dir)
        .context("Failed to replace VOL files")?;
    info!(
        "Replaced {} files, {} already modified",
        summary.copied,
        summary.skipped.len()
    );

    let text_steps: Vec<Box<dyn PatchStep>> = vec![Box::new(TextTableStep)];
    runner.patch_optional(
        &vol_dir.join(".text").join("data-race.txd"),
        TEXT_TABLE,
        &text_steps,
    )?;
    runner.patch_optional(&ovl_dir.join(overlay::ARCADE), OVERLAY, &arcade::steps())?;

    if let Some(path) = &args.report {
        runner
            .report
            .save(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Report saved to {}", path.display());
    }

    let warnings = runner.report.warning_count() + summary.skipped.len();
    if warnings == 0 {
        println!("{}", "Patching completed successfully!".green().bold());
    } else {
        println!(
            "{} with {} warning(s)",
            "Patching completed".yellow().bold(),
            warnings
        );
    }
    Ok(())
}
