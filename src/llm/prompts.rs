//! Prompt templates for generation, repair, and refinement.

use crate::llm::client::Prompt;

pub const CODEGEN_SYSTEM: &str = "You are an expert Golang developer.";

pub const EXPLAIN_SYSTEM: &str =
    "You explain errors from developer tools in one or two plain sentences, without jargon.";

/// Initial generation from a plain-language description.
pub fn generate_prompt(description: &str) -> Prompt {
    let user = format!(
        r#"Convert the following English description into clean, efficient, and idiomatic Golang code. The code should:
1. Follow Go best practices and conventions
2. Include proper error handling
3. Be well-documented with comments
4. Use appropriate data structures and algorithms
5. Be production-ready and performant

English description:
{description}

Generate only the Golang code without any explanations. The code should be complete and ready to compile:"#
    );
    Prompt {
        system: CODEGEN_SYSTEM,
        user,
    }
}

/// Repair round: compiler diagnostics plus the current source.
pub fn debug_prompt(diagnostics: &str, source: &str) -> Prompt {
    let user = format!(
        r#"Debug and fix the following Go code that has compilation errors.

ERROR MESSAGE:
{diagnostics}

CURRENT CODE:
{source}

Provide ONLY the complete fixed code without any explanations or markdown formatting. The code should be ready to compile:"#
    );
    Prompt {
        system: CODEGEN_SYSTEM,
        user,
    }
}

/// Apply a free-form change request to the whole file.
pub fn modify_prompt(source: &str, instruction: &str) -> Prompt {
    let user = format!(
        r#"Modify the following Go program as requested.

REQUEST:
{instruction}

CURRENT CODE:
{source}

Provide ONLY the complete updated code without any explanations. The code should be ready to compile:"#
    );
    Prompt {
        system: CODEGEN_SYSTEM,
        user,
    }
}

pub fn optimize_prompt(source: &str) -> Prompt {
    let user = format!(
        r#"Optimize the following Go program for performance and clarity while preserving its behavior.

CURRENT CODE:
{source}

Provide ONLY the complete optimized code without any explanations. The code should be ready to compile:"#
    );
    Prompt {
        system: CODEGEN_SYSTEM,
        user,
    }
}

pub fn add_prompt(source: &str, feature: &str) -> Prompt {
    let user = format!(
        r#"Add the following feature to this Go program.

FEATURE:
{feature}

CURRENT CODE:
{source}

Provide ONLY the complete updated code including the new feature, without any explanations. The code should be ready to compile:"#
    );
    Prompt {
        system: CODEGEN_SYSTEM,
        user,
    }
}

/// Walkthrough of the current program, for the session's `explain` command.
pub fn explain_code_prompt(source: &str) -> Prompt {
    let user = format!(
        r#"Explain what the following Go program does, section by section, in plain English.

CODE:
{source}"#
    );
    Prompt {
        system: EXPLAIN_SYSTEM,
        user,
    }
}

/// Best-effort plain-language explanation of a tool error.
pub fn explain_error_prompt(error_text: &str) -> Prompt {
    let user = format!(
        r#"This error came up while generating and building a Go program. Briefly explain what it means and what to try next:

{error_text}"#
    );
    Prompt {
        system: EXPLAIN_SYSTEM,
        user,
    }
}
