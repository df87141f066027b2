use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::Args;
use grove::analysis::{self, MergeStep, PlanOutcome};
use grove::format::OutputFormat;
use serde::Serialize;

use super::{RepoContext, Selection, parse_jobs, plural};

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub selection: Selection,

    /// Maximum git processes at once (default: analysis.jobs, 8)
    #[arg(long, short = 'j', value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    /// Output format: text or json
    #[arg(long, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// JSON shape of `grove plan`.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum PlanView<'a> {
    NothingToPlan {
        base: &'a str,
        branches: &'a [String],
    },
    Planned {
        base: &'a str,
        steps: &'a [MergeStep],
        isolated: &'a [String],
    },
}

impl<'a> PlanView<'a> {
    fn new(base: &'a str, outcome: &'a PlanOutcome) -> Self {
        match outcome {
            PlanOutcome::NothingToPlan { branches } => Self::NothingToPlan { base, branches },
            PlanOutcome::Planned { plan, isolated } => Self::Planned {
                base,
                steps: &plan.steps,
                isolated,
            },
        }
    }
}

pub fn run(ctx: &RepoContext, args: &PlanArgs) -> Result<()> {
    let base = ctx.base(args.selection.base.as_deref())?;
    let branches = ctx.candidates(&args.selection, &base)?;

    let outcome = analysis::plan_order(&ctx.git, &base, &branches, ctx.jobs(args.jobs))
        .with_context(|| format!("merge planning against '{base}' failed"))?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", OutputFormat::to_json(&PlanView::new(&base, &outcome))?);
        }
        OutputFormat::Text => print!("{}", render_text(&base, &outcome)),
    }
    Ok(())
}

fn render_text(base: &str, outcome: &PlanOutcome) -> String {
    let mut out = String::new();
    match outcome {
        PlanOutcome::NothingToPlan { branches } => {
            let _ = writeln!(
                out,
                "Nothing to plan: need at least two branches besides {base}, found {}.",
                branches.len()
            );
        }
        PlanOutcome::Planned { plan, isolated } => {
            if plan.steps.is_empty() {
                let _ = writeln!(out, "No branches share files; merge in any order.");
            } else {
                let _ = writeln!(out, "Recommended merge order into {base}:");
                let width = plan.steps.iter().map(|s| s.branch.len()).max().unwrap_or(0);
                for (i, step) in plan.steps.iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "  {}. {:<width$}  ({} shared with later branches)",
                        i + 1,
                        step.branch,
                        plural(step.overlap_count, "file")
                    );
                }
            }
            if !isolated.is_empty() {
                let _ = writeln!(out, "\nIndependent (no shared files):");
                for branch in isolated {
                    let _ = writeln!(out, "  {branch}");
                }
            }
        }
    }
    out
}
