//! Gated apply of one namespace's change sets

use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use reconcile::{ApplyReport, ChangeSet, MonitorDescriptor, TestDescriptor, apply};
use synq_client::{Backend, RemoteSink};

use super::differ::{display_breaking_changes, display_changes};
use crate::progress::BatchProgress;

/// Options for execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Show changes without applying them
    pub dry_run: bool,
    /// Skip confirmation prompts
    pub auto_confirm: bool,
    /// Hide spinners
    pub quiet: bool,
}

/// How a namespace ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NoChanges,
    DryRun,
    Declined,
    Applied(ApplyReport),
}

/// Display the change sets, then apply them after the gates pass.
///
/// Breaking changes always fail the namespace, dry run or not.
pub fn execute<B: Backend + ?Sized>(
    backend: &B,
    monitors: &ChangeSet<MonitorDescriptor>,
    tests: &ChangeSet<TestDescriptor>,
    opts: &ExecuteOptions,
) -> Result<Outcome> {
    let namespace = monitors.namespace.as_str();
    display_changes(monitors, tests);

    let mut breaking = monitors.breaking_changes();
    breaking.extend(tests.breaking_changes());
    if !breaking.is_empty() {
        display_breaking_changes(&breaking);
        bail!(
            "namespace '{namespace}' has {} that must be resolved first",
            crate::ui::count(breaking.len(), "breaking change")
        );
    }

    let writes = monitors.summary().total_changes() + tests.summary().total_changes();
    if writes == 0 {
        println!();
        println!("  {} No changes needed", "✓".green());
        return Ok(Outcome::NoChanges);
    }

    if opts.dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
        return Ok(Outcome::DryRun);
    }

    if !opts.auto_confirm {
        let resets = monitors.reset_ids().len();
        if resets > 0 {
            println!();
            println!(
                "  {} {} will lose learned baselines",
                "⚠".yellow(),
                crate::ui::count(resets, "monitor")
            );
        }
        if !confirm_proceed(namespace)? {
            println!();
            println!("  {} Aborted", "✗".red());
            return Ok(Outcome::Declined);
        }
    }

    let report = apply_all(backend, monitors, tests, opts.quiet)?;
    print_summary(&report);
    Ok(Outcome::Applied(report))
}

/// Apply monitors, then tests. Stops at the first failing batch.
pub fn apply_all<B: Backend + ?Sized>(
    backend: &B,
    monitors: &ChangeSet<MonitorDescriptor>,
    tests: &ChangeSet<TestDescriptor>,
    quiet: bool,
) -> Result<ApplyReport> {
    let mut sink = RemoteSink::new(backend);

    let mut progress = BatchProgress::new("monitor", quiet);
    let result = apply(monitors, &mut sink, &mut progress);
    progress.finish();
    let mut report = result.context("Failed to apply monitors")?;

    let mut progress = BatchProgress::new("SQL test", quiet);
    let result = apply(tests, &mut sink, &mut progress);
    progress.finish();
    let test_report = result.with_context(|| {
        format!(
            "Failed to apply SQL tests (monitor changes were applied: {} written)",
            report.total_changes()
        )
    })?;

    report.merge(&test_report);
    Ok(report)
}

/// Confirm with user
fn confirm_proceed(namespace: &str) -> Result<bool> {
    use dialoguer::Confirm;

    let label = if namespace.is_empty() { "default" } else { namespace };
    let confirmed = Confirm::new()
        .with_prompt(format!("Apply changes to namespace '{label}'?"))
        .default(true)
        .interact()?;

    Ok(confirmed)
}

/// Print final summary
fn print_summary(report: &ApplyReport) {
    println!();
    println!("  {} Changes applied successfully!", "✓".green().bold());

    if report.created > 0 {
        println!("    • {} created", report.created);
    }
    if report.updated > 0 {
        println!("    • {} updated", report.updated);
    }
    if report.reset > 0 {
        println!("    • {} reset", report.reset);
    }
    if report.deleted > 0 {
        println!("    • {} deleted", report.deleted);
    }
}
