//! Line-oriented command dispatcher
//!
//! Commands are case-insensitive; operands (paths, keys) keep their case.
//! Every command's errors are caught, printed, and followed by a best-effort
//! plain-language explanation from the configured provider; the loop itself
//! never dies to an error.

use crate::build::build_flow;
use crate::context::AppContext;
use crate::llm::{prompts, Provider, ProviderClient};
use crate::onboarding;
use crate::project::{self, Project};
use crate::session;
use crate::util::{prompt_line, truncate};
use anyhow::{bail, ensure, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Make { path: PathBuf },
    Interactive,
    Clean,
    Config { provider: Provider, key: String },
    SwitchProvider { provider: Provider },
    Model,
    Status,
    Help,
    Exit,
}

/// Parse one input line. The error string is a user-facing message.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_ascii_lowercase().as_str() {
        "make" => {
            if rest.is_empty() {
                return Err("Usage: make <file.ail>".to_string());
            }
            Ok(Command::Make {
                path: PathBuf::from(rest),
            })
        }
        "config" => {
            let Some((provider, key)) = rest.split_once(char::is_whitespace) else {
                return Err("Usage: config <hf|or> <key>".to_string());
            };
            let provider = Provider::parse(provider)
                .ok_or_else(|| format!("Unknown provider '{}'. Use 'hf' or 'or'.", provider))?;
            Ok(Command::Config {
                provider,
                key: key.trim().to_string(),
            })
        }
        "provider" => {
            if rest.is_empty() {
                return Err("Usage: provider <hf|or>".to_string());
            }
            let provider = Provider::parse(rest)
                .ok_or_else(|| format!("Unknown provider '{}'. Use 'hf' or 'or'.", rest))?;
            Ok(Command::SwitchProvider { provider })
        }
        simple if rest.is_empty() => match simple {
            "interactive" => Ok(Command::Interactive),
            "clean" => Ok(Command::Clean),
            "model" => Ok(Command::Model),
            "status" => Ok(Command::Status),
            "help" => Ok(Command::Help),
            "exit" => Ok(Command::Exit),
            _ => Err("Invalid command. Type 'help' for the help menu.".to_string()),
        },
        _ => Err("Invalid command. Type 'help' for the help menu.".to_string()),
    }
}

/// Read-eval-print loop. Returns on `exit` or EOF.
pub async fn run(ctx: &mut AppContext) -> Result<()> {
    println!(
        "ailang {} - type 'help' for the command list",
        env!("CARGO_PKG_VERSION")
    );

    loop {
        let prompt = format!("ailang at {} -> ", ctx.workspace.display());
        let Some(line) = prompt_line(&prompt)? else {
            println!();
            break;
        };
        if line.is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("  ✗ {}", message);
                continue;
            }
        };

        if command == Command::Exit {
            break;
        }

        if let Err(err) = dispatch(ctx, command).await {
            report_error(ctx, &err).await;
        }
    }

    Ok(())
}

async fn dispatch(ctx: &mut AppContext, command: Command) -> Result<()> {
    match command {
        Command::Make { path } => cmd_make(ctx, &path).await,
        Command::Interactive => cmd_interactive(ctx).await,
        Command::Clean => cmd_clean(ctx),
        Command::Config { provider, key } => cmd_config(ctx, provider, key),
        Command::SwitchProvider { provider } => cmd_provider(ctx, provider),
        Command::Model => cmd_model(ctx),
        Command::Status => cmd_status(ctx),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Exit => Ok(()),
    }
}

/// Print the error, then try to have the configured provider explain it in
/// plain language. The explanation is best-effort: if that call fails too,
/// the raw error above stands alone.
async fn report_error(ctx: &AppContext, err: &anyhow::Error) {
    eprintln!("  ✗ Error: {:#}", err);

    let Ok(client) = ProviderClient::from_config(&ctx.config) else {
        return;
    };
    let prompt = prompts::explain_error_prompt(&truncate(&format!("{:#}", err), 2000));
    if let Ok(explanation) = client.generate(&prompt).await {
        let explanation = explanation.trim();
        if !explanation.is_empty() {
            println!("  {}", explanation);
        }
    }
}

/// Make sure a provider is selected and its key is present, prompting and
/// persisting as needed, then build a client for it.
fn ensure_client(ctx: &mut AppContext) -> Result<ProviderClient> {
    if ctx.config.provider.is_none() {
        onboarding::run_onboarding(ctx)?;
    }
    let provider = ctx
        .config
        .provider
        .context("No provider selected. Use 'provider hf' or 'provider or'.")?;
    onboarding::ensure_api_key(ctx, provider)?;
    ProviderClient::from_config(&ctx.config)
}

/// The whole file is the prompt; only the extension is fixed.
fn read_description(input: &Path) -> Result<String> {
    ensure!(
        input.extension().and_then(|e| e.to_str()) == Some("ail"),
        "Only .ail files are supported"
    );
    fs::read_to_string(input).with_context(|| format!("File not found: {}", input.display()))
}

/// Generate initial source from a description and register the project.
async fn generate_project(
    ctx: &mut AppContext,
    client: &ProviderClient,
    description: &str,
    name: &str,
) -> Result<Project> {
    println!();
    println!(
        "Converting English to Golang with {}...",
        client.provider().label()
    );
    let raw = client.generate(&prompts::generate_prompt(description)).await?;

    let project = project::materialize(&ctx.workspace, name, &raw)?;
    println!("  ✓ Golang code saved to {}", project.source_path().display());

    ctx.config.record_project_dir(project.dir.clone());
    ctx.save_config()?;
    Ok(project)
}

async fn cmd_make(ctx: &mut AppContext, path: &Path) -> Result<()> {
    let description = read_description(path)?;
    let mut client = ensure_client(ctx)?;
    let Some(name) = prompt_line("\nEnter the name for your project: ")? else {
        bail!("Input closed before a project name was given");
    };
    let project = generate_project(ctx, &client, &description, &name).await?;
    build_flow(&mut client, &project).await?;
    Ok(())
}

async fn cmd_interactive(ctx: &mut AppContext) -> Result<()> {
    let Some(path) = prompt_line("Path to the .ail description file: ")? else {
        bail!("Input closed before a file was given");
    };
    let description = read_description(Path::new(&path))?;
    let mut client = ensure_client(ctx)?;
    let Some(name) = prompt_line("Enter the name for your project: ")? else {
        bail!("Input closed before a project name was given");
    };
    let project = generate_project(ctx, &client, &description, &name).await?;
    session::run_session(&mut client, &project).await
}

fn cmd_clean(ctx: &mut AppContext) -> Result<()> {
    let report = project::clean_projects(&mut ctx.config);

    for dir in &report.removed {
        println!("  ✓ Removed {}", dir.display());
    }
    for dir in &report.missing {
        println!("  Warning: {} not found, skipping", dir.display());
    }
    for (dir, err) in &report.failed {
        println!("  ✗ Failed to remove {}: {}", dir.display(), err);
    }
    println!(
        "  Deleted {} of {} known project directories.",
        report.removed.len(),
        report.removed.len() + report.missing.len() + report.failed.len()
    );

    ctx.save_config()?;
    Ok(())
}

fn cmd_config(ctx: &mut AppContext, provider: Provider, key: String) -> Result<()> {
    ctx.config.set_api_key(provider, key);
    ctx.save_config()?;
    println!("  ✓ {} API key saved", provider.label());
    Ok(())
}

fn cmd_provider(ctx: &mut AppContext, provider: Provider) -> Result<()> {
    ctx.config.provider = Some(provider);
    onboarding::ensure_api_key(ctx, provider)?;
    ctx.save_config()?;
    println!(
        "  ✓ Provider changed to {}. Using model: {}",
        provider.label(),
        ctx.config.model(provider)
    );
    Ok(())
}

fn cmd_model(ctx: &mut AppContext) -> Result<()> {
    let provider = ctx
        .config
        .provider
        .context("No provider selected. Use 'provider hf' or 'provider or'.")?;

    println!(
        "  Current {} model: {}",
        provider.label(),
        ctx.config.model(provider)
    );
    let Some(model_id) = prompt_line("  New model ID (blank to keep): ")? else {
        return Ok(());
    };
    if model_id.is_empty() {
        println!("  Model unchanged.");
        return Ok(());
    }

    ctx.config.set_model(provider, model_id.clone());
    ctx.save_config()?;
    println!("  ✓ {} model changed to: {}", provider.label(), model_id);
    Ok(())
}

fn cmd_status(ctx: &AppContext) -> Result<()> {
    match ctx.config.provider {
        Some(provider) => {
            println!("  Current provider: {}", provider.label());
            println!("  Current model: {}", ctx.config.model(provider));
        }
        None => println!("  Current provider: not selected"),
    }
    println!(
        "  HuggingFace API key: {}",
        if ctx.config.hf_api_key.is_empty() { "Not set" } else { "Set" }
    );
    println!(
        "  OpenRouter API key: {}",
        if ctx.config.openrouter_api_key.is_empty() { "Not set" } else { "Set" }
    );
    println!("  Known projects: {}", ctx.config.project_dirs.len());
    Ok(())
}

fn print_help() {
    println!();
    println!("  Commands:");
    println!("    make <file.ail>  - Turn a description file into a built Go program");
    println!("    interactive      - Generate, then refine iteratively before building");
    println!("    clean            - Remove all recorded project directories");
    println!("    config hf <key>  - Set the HuggingFace API key");
    println!("    config or <key>  - Set the OpenRouter API key");
    println!("    provider <name>  - Switch provider (hf or or)");
    println!("    model            - Change the active provider's model");
    println!("    status           - Show provider, model, and key status");
    println!("    help             - Show this help message");
    println!("    exit             - Exit the program");
    println!();
}
