//! Prompt assembly
//!
//! Flattens a buffer into the text handed to the host: inactive lines, blank
//! lines and inline comments are dropped and every kept line ends in a comma.

/// Assemble the prompt text for `buffer`, optionally preceded by `prefix`.
pub fn assemble_prompt(buffer: &str, prefix: Option<&str>) -> String {
    let body = buffer
        .split('\n')
        .filter_map(render_line)
        .collect::<Vec<_>>()
        .join("\n");

    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}\n{body}"),
        _ => body,
    }
}

fn render_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") {
        return None;
    }

    let kept = match line.find("//") {
        Some(at) => line[..at].trim_end(),
        None => line,
    };
    if kept.trim().ends_with(',') {
        Some(kept.to_string())
    } else {
        Some(format!("{kept}, "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_skips_inactive_and_blank() {
        let buffer = "a\n// b\n\n   \n// , // section\n// disabled phrase 20250101120000\nc,";
        assert_eq!(assemble_prompt(buffer, None), "a, \nc,");
    }

    #[test]
    fn test_inline_comment_removed() {
        assert_eq!(assemble_prompt("(a:1.20), // sharp", None), "(a:1.20),");
        assert_eq!(assemble_prompt("b // soft", None), "b, ");
    }

    #[test]
    fn test_indent_kept() {
        assert_eq!(assemble_prompt("  a", None), "  a, ");
    }

    #[test]
    fn test_prefix() {
        assert_eq!(assemble_prompt("a", Some("masterpiece")), "masterpiece\na, ");
        assert_eq!(assemble_prompt("a", Some("")), "a, ");
        assert_eq!(assemble_prompt("", Some("p")), "p\n");
    }
}
