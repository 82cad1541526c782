//! Splitting a raw input line into command arguments.

use std::ops::Deref;

/// Characters that separate tokens. Runs of them count as one separator.
pub const DELIMITERS: [char; 3] = [' ', '\t', '\n'];

/// The ordered, non-empty tokens of one input line.
///
/// The first token is the command name. The vector lives for a single
/// dispatch cycle and owns its strings, so nothing has to be released by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentVector {
    tokens: Vec<String>,
}

impl ArgumentVector {
    /// The command name, if the line had any tokens.
    pub fn program(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Everything after the command name.
    pub fn operands(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or_default()
    }

    /// Borrowed view of the operands, the shape builtin parsers take.
    pub fn operand_strs(&self) -> Vec<&str> {
        self.operands().iter().map(String::as_str).collect()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.tokens
    }
}

impl Deref for ArgumentVector {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.tokens
    }
}

/// Split `line` on spaces, tabs and newlines.
///
/// Leading, trailing and repeated delimiters never produce empty tokens. At
/// most `max_args` tokens are kept; the rest of the line is silently dropped.
///
/// # Arguments
/// * `line` - The raw input line, with or without its line break.
/// * `max_args` - Upper bound on the number of tokens returned.
///
/// # Returns
/// The tokens in input order. A blank line yields an empty vector.
pub fn split_into_tokens(line: &str, max_args: usize) -> ArgumentVector {
    let mut words = line.split(DELIMITERS).filter(|token| !token.is_empty());
    let tokens: Vec<String> = words.by_ref().take(max_args).map(str::to_owned).collect();

    let dropped = words.count();
    if dropped > 0 {
        tracing::debug!(max_args, dropped, "dropping tokens past the argument limit");
    }

    ArgumentVector { tokens }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        split_into_tokens(line, 64).into_inner()
    }

    #[test]
    fn test_simple_command_line() {
        assert_eq!(tokens("ls -l /tmp"), vec!["ls", "-l", "/tmp"]);
    }

    #[test]
    fn test_irregular_spacing_yields_no_empty_tokens() {
        assert_eq!(tokens("  a   b "), vec!["a", "b"]);
    }

    #[test]
    fn test_tabs_and_newlines_are_delimiters() {
        assert_eq!(tokens("echo\thello\t\tworld\n"), vec!["echo", "hello", "world"]);
        assert_eq!(tokens("a\nb"), vec!["a", "b"]);
    }

    #[test]
    fn test_blank_lines_yield_empty_vector() {
        for line in ["", " ", "\t \n", "\n"] {
            let argv = split_into_tokens(line, 64);
            assert!(argv.is_empty(), "expected no tokens for {:?}", line);
            assert_eq!(argv.program(), None);
        }
    }

    #[test]
    fn test_other_whitespace_is_part_of_a_token() {
        // Only space, tab and newline split; carriage returns and the like stay.
        assert_eq!(tokens("a\rb c"), vec!["a\rb", "c"]);
    }

    #[test]
    fn test_tokens_past_the_limit_are_dropped() {
        let line = (0..70).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let argv = split_into_tokens(&line, 64);
        assert_eq!(argv.len(), 64);
        assert_eq!(argv.last().map(String::as_str), Some("63"));

        let argv = split_into_tokens("a b c d", 2);
        assert_eq!(argv.into_inner(), vec!["a", "b"]);
    }

    #[test]
    fn test_program_and_operands() {
        let argv = split_into_tokens("cd /tmp extra", 64);
        assert_eq!(argv.program(), Some("cd"));
        assert_eq!(argv.operands(), ["/tmp".to_string(), "extra".to_string()]);
        assert_eq!(argv.operand_strs(), vec!["/tmp", "extra"]);

        let argv = split_into_tokens("pwd", 64);
        assert!(argv.operands().is_empty());
    }
}
