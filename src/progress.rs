//! Progress indicators
//!
//! Spinners for remote calls and an [`ApplyProgress`] that reports each
//! write batch.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use reconcile::{ApplyProgress, Stage};
use std::time::Duration;

/// Start a spinner with a message
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// A spinner that draws nothing, for `--quiet` and tests
pub fn hidden() -> ProgressBar {
    ProgressBar::hidden()
}

pub fn finish_success(pb: &ProgressBar, msg: &str) {
    pb.finish_and_clear();
    if !pb.is_hidden() {
        println!("{} {}", "✓".green(), msg);
    }
}

pub fn finish_error(pb: &ProgressBar, msg: &str) {
    pb.finish_and_clear();
    eprintln!("{} {}", "✗".red(), msg);
}

/// Reports apply batches on a spinner
pub struct BatchProgress {
    kind: &'static str,
    pb: ProgressBar,
}

impl BatchProgress {
    pub fn new(kind: &'static str, quiet: bool) -> Self {
        let pb = if quiet { hidden() } else { spinner("") };
        Self { kind, pb }
    }

    pub fn finish(self) {
        self.pb.finish_and_clear();
    }
}

fn stage_verb(stage: Stage) -> (&'static str, &'static str) {
    match stage {
        Stage::Create => ("Creating", "Created"),
        Stage::Delete => ("Deleting", "Deleted"),
        Stage::Update => ("Updating", "Updated"),
    }
}

impl ApplyProgress for BatchProgress {
    fn on_stage_start(&mut self, stage: Stage, count: usize) {
        let (verb, _) = stage_verb(stage);
        self.pb
            .set_message(format!("{verb} {}...", crate::ui::count(count, self.kind)));
    }

    fn on_stage_complete(&mut self, stage: Stage, count: usize) {
        let (_, done) = stage_verb(stage);
        let msg = format!("{done} {}", crate::ui::count(count, self.kind));
        if self.pb.is_hidden() {
            log::info!("{msg}");
        } else {
            self.pb.suspend(|| println!("  {} {}", "✓".green(), msg));
        }
    }
}
