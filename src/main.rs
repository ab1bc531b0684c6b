use ailang::config::Config;
use ailang::context::AppContext;
use ailang::{onboarding, repl};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ailang",
    about = "Turn plain-language program descriptions into compiled Go programs",
    version
)]
struct Args {
    /// Workspace directory where project folders are created (defaults to the current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Use an alternate config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Re-run the provider setup wizard before starting
    #[arg(long)]
    setup: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let workspace = args
        .path
        .canonicalize()
        .with_context(|| format!("Invalid workspace path: {}", args.path.display()))?;

    let config_path = args
        .config
        .or_else(Config::default_path)
        .unwrap_or_else(|| workspace.join("ailang.json"));
    let config = Config::load(&config_path);

    let mut ctx = AppContext::new(config, config_path, workspace);

    if args.setup || onboarding::is_first_run(&ctx.config) {
        onboarding::run_onboarding(&mut ctx)?;
    }

    repl::run(&mut ctx).await
}
