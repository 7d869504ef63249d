//! Change set display

use colored::Colorize;
use reconcile::{ChangeSet, ChangeSummary, Entity, MonitorDescriptor, TestDescriptor};
use std::fmt::Write as _;

const RULE: &str = "─────────────────────────────────────────────────────";

/// Render the monitor and test changes of one namespace as a boxed overview
pub fn render_changes(
    monitors: &ChangeSet<MonitorDescriptor>,
    tests: &ChangeSet<TestDescriptor>,
) -> String {
    let mut out = String::new();
    let namespace = namespace_label(&monitors.namespace);

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "┌─ {} {} ─────────────────────┐",
        "Configuration Changes".bold(),
        format!("[{namespace}]").cyan()
    );
    let _ = writeln!(out, "│");

    render_section(&mut out, "Monitors", monitors);
    render_section(&mut out, "SQL Tests", tests);

    let mut summary = monitors.summary();
    summary.merge(&tests.summary());

    let _ = writeln!(out, "├{RULE}┤");
    let _ = writeln!(out, "│ Summary: {}", summary_line(&summary));
    let _ = writeln!(out, "└{RULE}┘");
    out
}

/// Print the overview of one namespace
pub fn display_changes(monitors: &ChangeSet<MonitorDescriptor>, tests: &ChangeSet<TestDescriptor>) {
    print!("{}", render_changes(monitors, tests));
}

fn namespace_label(namespace: &str) -> &str {
    if namespace.is_empty() { "default" } else { namespace }
}

fn summary_line(summary: &ChangeSummary) -> String {
    if summary.total_changes() == 0 && summary.conflicts == 0 && summary.managed_by_app == 0 {
        return format!("no changes ({} unchanged)", summary.unchanged);
    }

    let mut line = format!(
        "{} changes ({} create, {} update, {} delete), {} unchanged",
        summary.total_changes().to_string().bold(),
        summary.create.to_string().green(),
        summary.update.to_string().yellow(),
        summary.delete.to_string().red(),
        summary.unchanged
    );
    if summary.reset > 0 {
        line.push_str(&format!(", {} {}", summary.reset, "require reset".red()));
    }
    if summary.managed_by_app > 0 {
        line.push_str(&format!(", {} taken over from app", summary.managed_by_app));
    }
    if summary.conflicts > 0 {
        line.push_str(&format!(", {} {}", summary.conflicts, "conflicts".red().bold()));
    }
    line
}

fn render_section<T: Entity>(out: &mut String, title: &str, set: &ChangeSet<T>) {
    let summary = set.summary();
    if summary.total_changes() == 0
        && summary.conflicts == 0
        && summary.managed_by_app == 0
        && summary.unchanged == 0
    {
        return;
    }

    let _ = writeln!(out, "│ {}", title.bold());

    for entity in &set.to_create {
        let _ = writeln!(
            out,
            "│   {} {:<30} {}",
            "+".green(),
            crate::ui::truncate(entity.name(), 30),
            entity.monitored_path().dimmed()
        );
    }

    for update in &set.to_update {
        let reset = if update.must_reset {
            format!(" {}", "[RESET REQUIRED]".red().bold())
        } else {
            String::new()
        };
        let transfer = if set.managed_by_app.iter().any(|id| id == update.new.id()) {
            format!(" {}", "(management transfer from app)".yellow())
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "│   {} {:<30} {}{}{}",
            "~".yellow(),
            crate::ui::truncate(update.new.name(), 30),
            update.new.monitored_path().dimmed(),
            reset,
            transfer
        );
        for line in update.diff_text.lines() {
            let colored_line = if line.starts_with('+') {
                line.green().to_string()
            } else if line.starts_with('-') {
                line.red().to_string()
            } else {
                line.dimmed().to_string()
            };
            let _ = writeln!(out, "│       {colored_line}");
        }
    }

    for id in &set.to_delete {
        let _ = writeln!(out, "│   {} {:<30} {}", "-".red(), id, "(will delete)".dimmed());
    }

    for entity in &set.unchanged {
        if set.managed_by_app.iter().any(|id| id == entity.id()) {
            let _ = writeln!(
                out,
                "│   {} {:<30} {}",
                "~".yellow(),
                crate::ui::truncate(entity.name(), 30),
                "(management transfer from app)".yellow()
            );
        }
    }

    for (id, owner) in &set.managed_by_other_namespace {
        let _ = writeln!(
            out,
            "│   {} {:<30} {}",
            "✗".red(),
            id,
            format!("managed by namespace '{}'", namespace_label(owner)).red()
        );
    }

    if !set.unchanged.is_empty() {
        let _ = writeln!(
            out,
            "│   {}",
            format!("{} unchanged", set.unchanged.len()).dimmed()
        );
    }
    let _ = writeln!(out, "│");
}

/// Print the conflicts that block an apply
pub fn display_breaking_changes(breaking: &[String]) {
    if breaking.is_empty() {
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Breaking Changes".red().bold()
    );
    println!("│");
    println!(
        "│  {}  {} cannot be applied:",
        "⚠".yellow(),
        crate::ui::count(breaking.len(), "change")
    );
    println!("│");
    for change in breaking.iter().take(10) {
        println!("│  • {change}");
    }
    if breaking.len() > 10 {
        println!("│  • ... and {} more", breaking.len() - 10);
    }
    println!("│");
    println!("│  Move these definitions to their owning namespace or delete them there first.");
    println!("└{RULE}┘");
}
