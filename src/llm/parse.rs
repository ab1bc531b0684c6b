//! Post-processing of generated code
//!
//! Model responses usually wrap the program in a Markdown code fence, often
//! with prose above and below. Only the code may reach the source file.

/// Strip Markdown fences from a model response.
///
/// When the text contains a fenced block (``` with an optional language
/// tag), the first block's inner content is returned and everything around
/// it is dropped. Fence-less responses come back trimmed, unchanged.
pub fn clean_generated_code(raw: &str) -> String {
    let mut inner: Vec<&str> = Vec::new();
    let mut in_fence = false;

    for line in raw.lines() {
        if line.trim_start().starts_with("```") {
            if in_fence {
                // closing fence of the first block: done
                return inner.join("\n").trim().to_string();
            }
            in_fence = true;
            continue;
        }
        if in_fence {
            inner.push(line);
        }
    }

    if in_fence {
        // opening fence without a closing one: keep what followed it
        return inner.join("\n").trim().to_string();
    }

    raw.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNIPPET: &str = "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(\"hello world\")\n}";

    #[test]
    fn test_fenced_go_block_with_prose_yields_inner_code_only() {
        let raw = format!(
            "Here is the program you asked for:\n\n```go\n{}\n```\n\nLet me know if you need changes.",
            SNIPPET
        );
        let cleaned = clean_generated_code(&raw);
        assert_eq!(cleaned, SNIPPET);
        assert!(!cleaned.contains("```"));
        assert!(!cleaned.contains("Here is"));
    }

    #[test]
    fn test_golang_language_tag() {
        let raw = format!("```golang\n{}\n```", SNIPPET);
        assert_eq!(clean_generated_code(&raw), SNIPPET);
    }

    #[test]
    fn test_bare_fences() {
        let raw = format!("```\n{}\n```", SNIPPET);
        assert_eq!(clean_generated_code(&raw), SNIPPET);
    }

    #[test]
    fn test_fenceless_response_passes_through_trimmed() {
        let raw = format!("\n{}\n", SNIPPET);
        assert_eq!(clean_generated_code(&raw), SNIPPET);
    }

    #[test]
    fn test_single_line_without_fences_survives() {
        // the historical drop-first-and-last-line variant destroyed this case
        assert_eq!(clean_generated_code("package main"), "package main");
    }

    #[test]
    fn test_unterminated_fence_keeps_code() {
        let raw = format!("```go\n{}", SNIPPET);
        assert_eq!(clean_generated_code(&raw), SNIPPET);
    }

    #[test]
    fn test_only_first_block_is_taken() {
        let raw = "```go\nfirst\n```\nprose\n```go\nsecond\n```";
        assert_eq!(clean_generated_code(raw), "first");
    }

    #[test]
    fn test_indented_fence_markers() {
        let raw = "  ```go\npackage main\n  ```";
        assert_eq!(clean_generated_code(raw), "package main");
    }
}
