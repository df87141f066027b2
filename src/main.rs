use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};

mod commands;

use commands::RepoContext;

/// Conflict detection and merge ordering for git worktrees
///
/// grove looks at every branch checked out in a worktree of the current
/// repository, finds the files two or more of them changed since they left
/// the base branch, and recommends an order to merge them in. Nothing is
/// written to the repository.
///
/// QUICK START:
///
///   grove branches              # what would be analyzed
///   grove check                 # shared files, by severity
///   grove check --dry-merge     # also trial-merge every pair
///   grove plan                  # least contested branch first
///
/// CONFIGURATION:
///
///   .grove.toml at the repository root:
///
///   [repo]
///   branch = "main"
///
///   [analysis]
///   jobs = 8
///   dry_merge = false
#[derive(Parser)]
#[command(name = "grove")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'grove <command> --help' for more information on a specific command.")]
struct Cli {
    /// Run as if grove was started in <DIR>
    #[arg(short = 'C', global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug). GROVE_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report files changed by more than one branch
    ///
    /// Each candidate branch is diffed against the point where it left the
    /// base branch (three-dot diff), so changes landing on the base later are
    /// never blamed on the branch. A file touched by two branches is medium
    /// severity; three or more is high.
    ///
    /// With --dry-merge every pair of branches is also merged in memory
    /// (`git merge-tree`, git 2.38+) to show which shared files really
    /// conflict. If that is not possible the overlap report is still shown.
    Check(commands::check::CheckArgs),

    /// Recommend an order to merge branches in
    ///
    /// Repeatedly picks the branch sharing the fewest files with the branches
    /// still waiting, so contested work lands after the easy wins have
    /// shrunk its conflicts. Branches sharing nothing are listed separately.
    Plan(commands::plan::PlanArgs),

    /// List the branches check and plan would analyze
    ///
    /// Every branch checked out in a worktree, except the base branch,
    /// detached or bare worktrees, and worktrees whose directory is gone.
    Branches(commands::branches::BranchesArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _telemetry = grove::telemetry::init(cli.verbose);

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "grove", &mut std::io::stdout());
        return Ok(());
    }

    let start = cli.directory.unwrap_or_else(|| PathBuf::from("."));
    let ctx = RepoContext::open(&start)?;

    match cli.command {
        Commands::Check(ref args) => commands::check::run(&ctx, args),
        Commands::Plan(ref args) => commands::plan::run(&ctx, args),
        Commands::Branches(ref args) => commands::branches::run(&ctx, args),
        Commands::Completions { .. } => Ok(()),
    }
}
