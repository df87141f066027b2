use anyhow::Result;
use clap::Args;
use grove::format::OutputFormat;
use serde::Serialize;

use super::{RepoContext, Selection};

#[derive(Args, Debug)]
pub struct BranchesArgs {
    /// Base branch (default: [repo] branch in .grove.toml, then origin/HEAD, then main)
    #[arg(long, short = 'b')]
    pub base: Option<String>,

    /// Output format: text or json
    #[arg(long, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct BranchesView<'a> {
    base: &'a str,
    branches: &'a [String],
}

pub fn run(ctx: &RepoContext, args: &BranchesArgs) -> Result<()> {
    let base = ctx.base(args.base.as_deref())?;
    let selection = Selection {
        branches: Vec::new(),
        base: Some(base.clone()),
    };
    let branches = ctx.candidates(&selection, &base)?;

    match args.format {
        OutputFormat::Json => {
            let view = BranchesView {
                base: &base,
                branches: &branches,
            };
            println!("{}", OutputFormat::to_json(&view)?);
        }
        OutputFormat::Text => {
            if branches.is_empty() {
                eprintln!("No worktree branches besides {base}.");
            }
            for branch in &branches {
                println!("{branch}");
            }
        }
    }
    Ok(())
}
