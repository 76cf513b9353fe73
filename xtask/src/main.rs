use std::process::Command;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for softraster")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every gate: fmt, clippy, tests, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates, warnings denied
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Run the rasterizer benchmarks
    Bench,
}

/// One cargo invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Fmt,
    Clippy,
    Test,
    Doc,
    Bench,
}

impl Commands {
    fn steps(&self) -> &'static [Step] {
        match self {
            Commands::Check => &[Step::Fmt, Step::Clippy, Step::Test, Step::Doc],
            Commands::Fmt => &[Step::Fmt],
            Commands::Clippy => &[Step::Clippy],
            Commands::Test => &[Step::Test],
            Commands::Doc => &[Step::Doc],
            Commands::Bench => &[Step::Bench],
        }
    }
}

impl Step {
    fn args(self) -> &'static [&'static str] {
        match self {
            Step::Fmt => &["fmt", "--all", "--", "--check"],
            Step::Clippy => &[
                "clippy",
                "--workspace",
                "--all-targets",
                "--",
                "-D",
                "warnings",
            ],
            Step::Test => &["test", "--workspace"],
            Step::Doc => &["doc", "--workspace", "--no-deps"],
            Step::Bench => &["bench", "-p", "softraster-raster"],
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    for &step in cli.command.steps() {
        run(step)?;
    }
    Ok(())
}

fn run(step: Step) -> Result<()> {
    let args = step.args();
    println!("==> Running cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {} failed", args[0]);
    }
    Ok(())
}
