//! Interactive refinement session
//!
//! A fixed vocabulary of natural-language edits over one generated source
//! file between build attempts. Every model-driven edit replaces the whole
//! file; there is no diffing or partial merge. `done` hands the file to the
//! build-and-repair loop and leaves the session.

use crate::build::build_flow;
use crate::llm::client::Prompt;
use crate::llm::parse::clean_generated_code;
use crate::llm::{prompts, ProviderClient};
use crate::project::Project;
use crate::util::prompt_line;
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Show,
    Modify,
    Optimize,
    Add,
    Explain,
    Done,
    Help,
}

/// Parse a session command, case-insensitive.
pub fn parse_session_command(line: &str) -> Option<SessionCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "show" => Some(SessionCommand::Show),
        "modify" => Some(SessionCommand::Modify),
        "optimize" => Some(SessionCommand::Optimize),
        "add" => Some(SessionCommand::Add),
        "explain" => Some(SessionCommand::Explain),
        "done" => Some(SessionCommand::Done),
        "help" => Some(SessionCommand::Help),
        _ => None,
    }
}

pub async fn run_session(client: &mut ProviderClient, project: &Project) -> Result<()> {
    println!();
    println!(
        "  Interactive session for '{}'. Type 'help' for the command list.",
        project.name
    );

    loop {
        let Some(line) = prompt_line(&format!("[{}] -> ", project.name))? else {
            // EOF leaves the session without building
            println!();
            break;
        };
        if line.is_empty() {
            continue;
        }

        let Some(command) = parse_session_command(&line) else {
            println!("  ✗ Unknown command '{}'. Type 'help' for the command list.", line);
            continue;
        };

        match command {
            SessionCommand::Show => match project.read_source() {
                Ok(source) => println!("{}", source),
                Err(e) => eprintln!("  ✗ Error: {:#}", e),
            },
            SessionCommand::Modify => {
                let Some(instruction) = prompt_line("  Describe the change: ")? else {
                    continue;
                };
                if instruction.is_empty() {
                    println!("  Nothing to do.");
                    continue;
                }
                if let Err(e) = edit_with(client, project, |source: &str| {
                    prompts::modify_prompt(source, &instruction)
                })
                .await
                {
                    eprintln!("  ✗ Error: {:#}", e);
                }
            }
            SessionCommand::Optimize => {
                if let Err(e) = edit_with(client, project, prompts::optimize_prompt).await {
                    eprintln!("  ✗ Error: {:#}", e);
                }
            }
            SessionCommand::Add => {
                let Some(feature) = prompt_line("  Describe the feature: ")? else {
                    continue;
                };
                if feature.is_empty() {
                    println!("  Nothing to do.");
                    continue;
                }
                if let Err(e) = edit_with(client, project, |source: &str| {
                    prompts::add_prompt(source, &feature)
                })
                .await
                {
                    eprintln!("  ✗ Error: {:#}", e);
                }
            }
            SessionCommand::Explain => {
                if let Err(e) = explain(client, project).await {
                    eprintln!("  ✗ Error: {:#}", e);
                }
            }
            SessionCommand::Help => print_session_help(),
            SessionCommand::Done => {
                build_flow(client, project).await?;
                break;
            }
        }
    }

    Ok(())
}

/// One provider call whose cleaned response overwrites the source file.
async fn edit_with(
    client: &mut ProviderClient,
    project: &Project,
    make_prompt: impl FnOnce(&str) -> Prompt,
) -> Result<()> {
    let source = project.read_source()?;
    let prompt = make_prompt(&source);

    println!("  Asking {}...", client.provider().label());
    let raw = client.generate(&prompt).await?;
    let code = clean_generated_code(&raw);
    anyhow::ensure!(!code.is_empty(), "Model returned no code");

    project.write_source(&code)?;
    println!("  ✓ Updated {}", project.source_path().display());
    Ok(())
}

async fn explain(client: &mut ProviderClient, project: &Project) -> Result<()> {
    let source = project.read_source()?;
    let explanation = client
        .generate(&prompts::explain_code_prompt(&source))
        .await?;
    println!();
    println!("{}", explanation.trim());
    println!();
    Ok(())
}

fn print_session_help() {
    println!();
    println!("  Session commands:");
    println!("    show      - Print the current source");
    println!("    modify    - Describe a change; the model rewrites the file");
    println!("    optimize  - Ask the model to optimize the program");
    println!("    add       - Describe a feature; the model adds it");
    println!("    explain   - Plain-English walkthrough of the program");
    println!("    done      - Build (with the repair loop) and leave the session");
    println!("    help      - Show this message");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vocabulary() {
        assert_eq!(parse_session_command("show"), Some(SessionCommand::Show));
        assert_eq!(parse_session_command("MODIFY"), Some(SessionCommand::Modify));
        assert_eq!(
            parse_session_command("  optimize  "),
            Some(SessionCommand::Optimize)
        );
        assert_eq!(parse_session_command("Add"), Some(SessionCommand::Add));
        assert_eq!(parse_session_command("explain"), Some(SessionCommand::Explain));
        assert_eq!(parse_session_command("done"), Some(SessionCommand::Done));
        assert_eq!(parse_session_command("help"), Some(SessionCommand::Help));
    }

    #[test]
    fn test_parse_rejects_unknown_and_compound() {
        assert_eq!(parse_session_command("quit"), None);
        assert_eq!(parse_session_command("modify this"), None);
        assert_eq!(parse_session_command(""), None);
    }
}
