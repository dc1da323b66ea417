use colored::Colorize;
use hwp_migration::{ErrorList, MigrationReport, ResourceBounds};
use hwp_store::Change;
use serde_json::{Value, json};
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn error_strings(errors: &ErrorList) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}

pub fn report_json(report: &MigrationReport, changes: &[Change], dry_run: bool) -> Value {
    let phases: Vec<Value> = report
        .phases
        .iter()
        .map(|(phase, outcome)| json!({"phase": phase, "outcome": outcome}))
        .collect();
    json!({
        "dryRun": dry_run,
        "skipped": report.skipped,
        "phases": phases,
        "changes": changes,
        "errors": error_strings(&report.errors),
    })
}

pub fn print_report(report: &MigrationReport, changes: &[Change], dry_run: bool) {
    if let Some(reason) = &report.skipped {
        print_warning(&format!("Migration skipped: {reason}"));
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Phase", "Applied", "Unchanged", "Skipped", "Failed"]);
    for (phase, outcome) in &report.phases {
        builder.push_record([
            phase.to_string(),
            outcome.applied.to_string(),
            outcome.unchanged.to_string(),
            outcome.skipped.to_string(),
            outcome.failed.to_string(),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));

    print_changes(changes, dry_run);
    print_errors(&report.errors);
}

pub fn print_changes(changes: &[Change], dry_run: bool) {
    if changes.is_empty() {
        println!("No changes.");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["Op", "Kind", "Namespace", "Name"]);
    for change in changes {
        builder.push_record([
            change.op.to_string(),
            change.key.kind.to_string(),
            change.key.namespace.clone().unwrap_or_else(|| "-".to_string()),
            change.key.name.clone(),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));
    let label = if dry_run { "Planned changes" } else { "Changes" };
    println!("{}: {}", label.cyan(), changes.len());
}

pub fn print_errors(errors: &ErrorList) {
    if errors.is_empty() {
        print_success("No errors");
        return;
    }
    eprintln!("{}", errors.to_string().red());
}

pub fn print_bounds(bounds: &ResourceBounds) {
    let mut builder = Builder::default();
    builder.push_record(["Key", "Value"]);
    for (key, value) in bounds.to_map() {
        builder.push_record([key, value]);
    }
    println!("{}", builder.build().with(Style::rounded()));
}
