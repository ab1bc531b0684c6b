//! First-run provider setup
//!
//! Picks one of the two providers and collects its API key before the first
//! generation call. Also used by `provider <name>` and by any command that
//! finds the active provider's key missing.

use crate::config::Config;
use crate::context::AppContext;
use crate::llm::Provider;
use crate::util::prompt_line;
use anyhow::{bail, Result};

/// First run = no provider has ever been selected.
pub fn is_first_run(config: &Config) -> bool {
    config.provider.is_none()
}

/// Interactive provider selection. An invalid choice falls back to
/// HuggingFace with a warning.
pub fn run_onboarding(ctx: &mut AppContext) -> Result<()> {
    println!();
    println!("  Welcome to ailang!");
    println!("  Please select which AI provider you want to use:");
    println!("    [1] HuggingFace");
    println!("    [2] OpenRouter");
    println!();

    let provider = match prompt_line("  Enter your choice (1 or 2): ")? {
        Some(choice) => match choice.as_str() {
            "1" => Provider::HuggingFace,
            "2" => Provider::OpenRouter,
            _ => {
                println!("  Warning: Invalid choice. Defaulting to HuggingFace.");
                Provider::HuggingFace
            }
        },
        None => {
            println!("  Warning: No choice made. Defaulting to HuggingFace.");
            Provider::HuggingFace
        }
    };

    ctx.config.provider = Some(provider);
    ensure_api_key(ctx, provider)?;
    ctx.save_config()?;
    println!("  ✓ Configuration saved");
    Ok(())
}

/// Prompt for and persist the provider's API key if it is empty. A provider
/// cannot be used without one.
pub fn ensure_api_key(ctx: &mut AppContext, provider: Provider) -> Result<()> {
    if !ctx.config.api_key(provider).is_empty() {
        return Ok(());
    }

    let key = prompt_line(&format!(
        "  Please enter your {} API key: ",
        provider.label()
    ))?
    .unwrap_or_default();

    if key.is_empty() {
        bail!(
            "An API key is required before {} can be used. Set one with 'config {} <key>'.",
            provider.label(),
            provider.token()
        );
    }

    ctx.config.set_api_key(provider, key);
    ctx.save_config()?;
    println!("  ✓ API key saved");
    Ok(())
}
