//! Whitespace tokenizer.
//!
//! A command line is split on spaces, tabs, and newlines. There is no quoting
//! and no expansion; redirection operators must stand alone as words.

/// Characters that separate words.
const DELIMITERS: &[char] = &[' ', '\t', '\n', '\r'];

/// Split one line of input into word tokens.
///
/// An empty result means the line was blank and the iteration is a no-op.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split(DELIMITERS)
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}
