use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use colored::Colorize;
use serde_json::json;
use tracing::info;
use verso_sdk::{
    DiffEntry, DiffResult, Eligibility, FileInfo, SdkConfig, VersionId, VersionManager,
    VersionRecord,
};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(cli.config.as_deref(), cli.root.as_deref())?;
    let mgr = VersionManager::open(config).context("cannot open version store")?;
    let format = cli.format;

    match cli.command {
        Command::Create(args) => cmd_create(&mgr, format, args),
        Command::List(args) => cmd_list(&mgr, format, args),
        Command::Show(args) => cmd_show(&mgr, format, args),
        Command::Restore(args) => cmd_restore(&mgr, format, args),
        Command::Delete(args) => cmd_delete(&mgr, format, args),
        Command::Clear(args) => cmd_clear(&mgr, format, args),
        Command::Compare(args) => cmd_compare(&mgr, format, args),
        Command::Diff(args) => cmd_diff(&mgr, format, args),
        Command::Check(args) => cmd_check(&mgr, format, args),
    }
}

/// Config file first, then `--root` on top.
fn resolve_config(config: Option<&Path>, root: Option<&Path>) -> anyhow::Result<SdkConfig> {
    let mut resolved = match config {
        Some(path) => SdkConfig::load(path)?,
        None => SdkConfig::default(),
    };
    if let Some(root) = root {
        resolved.versions_root = root.to_path_buf();
    }
    Ok(resolved)
}

/// Versions are keyed by path string, so always key by the absolute path.
fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("cannot resolve {}", path.display()))
}

fn parse_id(id: &str) -> anyhow::Result<VersionId> {
    VersionId::parse(id).with_context(|| format!("invalid version id {id:?}"))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn timestamp(ms: u64) -> String {
    DateTime::from_timestamp_millis(ms as i64)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn cmd_create(mgr: &VersionManager, format: OutputFormat, args: CreateArgs) -> anyhow::Result<()> {
    let path = absolute(&args.path)?;
    let record = mgr.create_version(&path, &args.message)?;
    info!(path = %path.display(), id = %record.id, "created version");

    match format {
        OutputFormat::Json => print_json(&record),
        OutputFormat::Text => {
            println!("{} Created version {}", "✓".green().bold(), record.id.as_str().yellow());
            println!("  Size: {} bytes", record.size);
            println!("  Hash: {}", record.content_hash.short_hex().dimmed());
            Ok(())
        }
    }
}

fn cmd_list(mgr: &VersionManager, format: OutputFormat, args: FileArgs) -> anyhow::Result<()> {
    let path = absolute(&args.path)?;
    let records = mgr.list_versions(&path)?;
    info!(path = %path.display(), count = records.len(), "listed versions");

    match format {
        OutputFormat::Json => print_json(&records),
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No versions of {}.", path.display());
                return Ok(());
            }
            for record in &records {
                print_record_line(record);
            }
            Ok(())
        }
    }
}

fn print_record_line(record: &VersionRecord) {
    let comment = if record.comment.is_empty() {
        String::new()
    } else {
        format!("  {}", record.comment)
    };
    println!(
        "{}  {}  {:>9} B{}",
        record.id.as_str().yellow(),
        timestamp(record.created_at).dimmed(),
        record.size,
        comment
    );
}

fn cmd_show(mgr: &VersionManager, format: OutputFormat, args: ShowArgs) -> anyhow::Result<()> {
    let path = absolute(&args.path)?;
    let id = parse_id(&args.id)?;
    let record = if args.verify {
        mgr.verify_version(&path, &id)?
    } else {
        mgr.get_version(&path, &id)?
    };
    let content = if args.content {
        Some(String::from_utf8_lossy(&mgr.get_content(&path, &id)?).into_owned())
    } else {
        None
    };
    info!(path = %path.display(), id = %id, verified = args.verify, "showed version");

    match format {
        OutputFormat::Json => print_json(&json!({ "version": record, "content": content })),
        OutputFormat::Text => {
            println!("Version {}", record.id.as_str().yellow().bold());
            println!("  Path:    {}", record.path);
            println!("  Created: {}", timestamp(record.created_at));
            println!("  Size:    {} bytes", record.size);
            println!("  Hash:    {}", record.content_hash);
            if !record.comment.is_empty() {
                println!("  Comment: {}", record.comment);
            }
            if args.verify {
                println!("  Integrity: {}", "verified".green());
            }
            if let Some(content) = content {
                println!();
                print!("{content}");
                if !content.ends_with('\n') {
                    println!();
                }
            }
            Ok(())
        }
    }
}

fn cmd_restore(mgr: &VersionManager, format: OutputFormat, args: VersionArgs) -> anyhow::Result<()> {
    let path = absolute(&args.path)?;
    let id = parse_id(&args.id)?;
    let backup = mgr.restore(&path, &id)?;
    info!(path = %path.display(), restored = %id, backup = %backup.id, "restored version");

    match format {
        OutputFormat::Json => print_json(&json!({ "restored": id, "backup": backup })),
        OutputFormat::Text => {
            println!("{} Restored {} to {}", "✓".green().bold(), path.display(), id.as_str().yellow());
            println!("  Previous content saved as {}", backup.id.as_str().yellow());
            Ok(())
        }
    }
}

fn cmd_delete(mgr: &VersionManager, format: OutputFormat, args: VersionArgs) -> anyhow::Result<()> {
    let path = absolute(&args.path)?;
    let id = parse_id(&args.id)?;
    mgr.delete_version(&path, &id)?;
    info!(path = %path.display(), id = %id, "deleted version");

    match format {
        OutputFormat::Json => print_json(&json!({ "deleted": id })),
        OutputFormat::Text => {
            println!("Deleted version {}", id.as_str().yellow());
            Ok(())
        }
    }
}

fn cmd_clear(mgr: &VersionManager, format: OutputFormat, args: FileArgs) -> anyhow::Result<()> {
    let path = absolute(&args.path)?;
    let removed = mgr.clear_versions(&path)?;
    info!(path = %path.display(), removed, "cleared versions");

    match format {
        OutputFormat::Json => print_json(&json!({ "cleared": removed })),
        OutputFormat::Text => {
            if removed {
                println!("Cleared all versions of {}", path.display());
            } else {
                println!("No versions of {}.", path.display());
            }
            Ok(())
        }
    }
}

fn cmd_compare(mgr: &VersionManager, format: OutputFormat, args: CompareArgs) -> anyhow::Result<()> {
    let path = absolute(&args.path)?;
    let left = parse_id(&args.left)?;
    let right = parse_id(&args.right)?;
    let cmp = mgr.compare_versions(&path, &left, &right)?;
    info!(path = %path.display(), left = %left, right = %right, "compared versions");

    match format {
        OutputFormat::Json => print_json(&cmp),
        OutputFormat::Text => {
            println!("{} {}", "---".red(), cmp.left.id);
            println!("{} {}", "+++".green(), cmp.right.id);
            print_diff(&cmp.diff);
            Ok(())
        }
    }
}

fn cmd_diff(mgr: &VersionManager, format: OutputFormat, args: DiffArgs) -> anyhow::Result<()> {
    let left = absolute(&args.left)?;
    let right = absolute(&args.right)?;
    let cmp = mgr.compare_files(&left, &right)?;
    info!(left = %left.display(), right = %right.display(), "compared files");

    match format {
        OutputFormat::Json => print_json(&cmp),
        OutputFormat::Text => {
            print_file_header("---".red().to_string(), &cmp.left);
            print_file_header("+++".green().to_string(), &cmp.right);
            print_diff(&cmp.diff);
            Ok(())
        }
    }
}

fn print_file_header(marker: String, info: &FileInfo) {
    println!(
        "{marker} {}  ({} bytes, {})",
        info.path,
        info.size,
        timestamp(info.last_modified)
    );
}

fn print_diff(diff: &DiffResult) {
    for entry in &diff.entries {
        match entry {
            DiffEntry::Unchanged {
                line1,
                line2,
                content,
            } => println!("  {line1:>5} {line2:>5}  {}", content.dimmed()),
            DiffEntry::Removed { line1, content } => {
                println!("{}", format!("- {line1:>5} {:>5}  {content}", "").red())
            }
            DiffEntry::Added { line2, content } => {
                println!("{}", format!("+ {:>5} {line2:>5}  {content}", "").green())
            }
            DiffEntry::Changed { removed, added } => {
                for r in removed {
                    println!("{}", format!("~ {:>5} {:>5}  {}", r.line, "", r.content).red());
                }
                for a in added {
                    println!("{}", format!("~ {:>5} {:>5}  {}", "", a.line, a.content).green());
                }
            }
        }
    }
    if diff.is_identical() {
        println!("{}", "No differences.".green());
    } else {
        println!(
            "{} added, {} removed, {} changed",
            diff.stats.added.to_string().green(),
            diff.stats.removed.to_string().red(),
            diff.stats.changed.to_string().yellow()
        );
    }
}

fn cmd_check(mgr: &VersionManager, format: OutputFormat, args: FileArgs) -> anyhow::Result<()> {
    let path = absolute(&args.path)?;
    let versionable = mgr.check_versionable(&path);
    let comparable = mgr.check_comparable(&path);
    info!(path = %path.display(), %versionable, %comparable, "checked file");

    match format {
        OutputFormat::Json => print_json(&json!({
            "path": path.to_string_lossy(),
            "versionable": versionable.is_eligible(),
            "versionable_reason": versionable.reason(),
            "comparable": comparable.is_eligible(),
            "comparable_reason": comparable.reason(),
        })),
        OutputFormat::Text => {
            println!("{}", path.display());
            print_eligibility("versionable", &versionable);
            print_eligibility("comparable", &comparable);
            Ok(())
        }
    }
}

fn print_eligibility(label: &str, decision: &Eligibility) {
    match decision {
        Eligibility::Eligible => println!("  {} {label}", "✓".green()),
        Eligibility::Ineligible { reason } => {
            println!("  {} not {label}: {reason}", "✗".red())
        }
    }
}
