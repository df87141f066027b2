use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::Args;
use grove::analysis::{self, CheckOptions, ConflictReport, Severity};
use grove::format::OutputFormat;
use tracing::info;

use super::{RepoContext, Selection, parse_jobs, plural};

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub selection: Selection,

    /// Also trial-merge every pair of branches (needs git 2.38+)
    #[arg(long)]
    pub dry_merge: bool,

    /// Maximum git processes at once (default: analysis.jobs, 8)
    #[arg(long, short = 'j', value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    /// Output format: text or json
    #[arg(long, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(ctx: &RepoContext, args: &CheckArgs) -> Result<()> {
    let base = ctx.base(args.selection.base.as_deref())?;
    let branches = ctx.candidates(&args.selection, &base)?;
    let opts = CheckOptions {
        jobs: ctx.jobs(args.jobs),
        dry_merge: args.dry_merge || ctx.config.analysis.dry_merge,
    };

    let report = analysis::check(&ctx.git, &base, &branches, opts)
        .with_context(|| format!("conflict check against '{base}' failed"))?;
    info!(
        overlaps = report.check.overlaps.len(),
        high = report.check.high_count(),
        "check complete"
    );

    match args.format {
        OutputFormat::Json => println!("{}", OutputFormat::to_json(&report)?),
        OutputFormat::Text => print!("{}", render_text(&report)),
    }
    Ok(())
}

fn render_text(report: &ConflictReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Checked {} against {}.",
        plural(report.check.total_branches, "branch"),
        report.base
    );

    if report.check.is_clear() {
        let _ = writeln!(out, "No overlapping files.");
    } else {
        let _ = writeln!(
            out,
            "\n{} touched by more than one branch:",
            plural(report.check.overlaps.len(), "file")
        );
        let width = report
            .check
            .overlaps
            .iter()
            .map(|o| o.file.len())
            .max()
            .unwrap_or(0);
        for overlap in &report.check.overlaps {
            let label = match overlap.severity {
                Severity::High => "HIGH  ",
                Severity::Medium => "MEDIUM",
            };
            let _ = writeln!(
                out,
                "  {label}  {:<width$}  {}",
                overlap.file,
                overlap.branches.join(", ")
            );
        }
    }

    if let Some(error) = &report.dry_merge_error {
        let _ = writeln!(out, "\nDry merge unavailable: {error}");
    }
    if let Some(results) = &report.dry_merges {
        let _ = writeln!(out, "\nDry merges:");
        if results.is_empty() {
            let _ = writeln!(out, "  (fewer than two branches)");
        }
        for r in results {
            if r.has_conflicts {
                let files = if r.conflict_files.is_empty() {
                    "(paths not reported)".to_owned()
                } else {
                    r.conflict_files.join(", ")
                };
                let _ = writeln!(out, "  {} + {}: CONFLICT in {files}", r.branch1, r.branch2);
            } else {
                let _ = writeln!(out, "  {} + {}: clean", r.branch1, r.branch2);
            }
        }
    }
    out
}
