//! Redirection parser.
//!
//! Turns the flat word list of one command line into a [`CommandLine`]:
//! the clean argument vector plus the redirections and the background flag.
//!
//! Recognized anywhere among the words:
//!
//! | Words       | Meaning                          |
//! |-------------|----------------------------------|
//! | `< file`    | read standard input from `file`  |
//! | `> file`    | write standard output, truncate  |
//! | `>> file`   | write standard output, append    |
//! | trailing `&`| run in the background            |

use std::path::PathBuf;

use thiserror::Error;

/// Input redirection operator.
pub const REDIRECT_IN: &str = "<";
/// Output redirection operator (truncate).
pub const REDIRECT_OUT: &str = ">";
/// Output redirection operator (append).
pub const REDIRECT_APPEND: &str = ">>";
/// Background marker.
pub const BACKGROUND: &str = "&";

/// Syntax errors in a command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("syntax error: multiple input files")]
    MultipleInputs,
    #[error("syntax error: multiple output files")]
    MultipleOutputs,
    #[error("syntax error: no input file")]
    MissingInputFile,
    #[error("syntax error: no output file")]
    MissingOutputFile,
    #[error("syntax error: input file is redirection symbol")]
    InputIsOperator,
    #[error("syntax error: output file is redirection symbol")]
    OutputIsOperator,
    #[error("syntax error: no command")]
    MissingCommand,
}

/// Where standard output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRedirect {
    pub path: PathBuf,
    /// Append instead of truncating.
    pub append: bool,
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Program followed by its arguments; never empty.
    pub argv: Vec<String>,
    pub input: Option<PathBuf>,
    pub output: Option<OutputRedirect>,
    /// False when the line ended in `&`.
    pub foreground: bool,
}

impl CommandLine {
    /// The program word (first element of `argv`).
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments after the program word.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

fn is_operator(word: &str) -> bool {
    matches!(word, REDIRECT_IN | REDIRECT_OUT | REDIRECT_APPEND)
}

/// Parse the words of one command line.
pub fn parse<S: AsRef<str>>(words: &[S]) -> Result<CommandLine, ParseError> {
    let mut argv = Vec::with_capacity(words.len());
    let mut input = None;
    let mut output: Option<OutputRedirect> = None;

    let mut iter = words.iter().map(AsRef::as_ref);
    while let Some(word) = iter.next() {
        match word {
            REDIRECT_IN => {
                if input.is_some() {
                    return Err(ParseError::MultipleInputs);
                }
                let file = iter.next().ok_or(ParseError::MissingInputFile)?;
                if is_operator(file) {
                    return Err(ParseError::InputIsOperator);
                }
                input = Some(PathBuf::from(file));
            }
            REDIRECT_OUT | REDIRECT_APPEND => {
                if output.is_some() {
                    return Err(ParseError::MultipleOutputs);
                }
                let file = iter.next().ok_or(ParseError::MissingOutputFile)?;
                if is_operator(file) {
                    return Err(ParseError::OutputIsOperator);
                }
                output = Some(OutputRedirect {
                    path: PathBuf::from(file),
                    append: word == REDIRECT_APPEND,
                });
            }
            _ => argv.push(word.to_string()),
        }
    }

    let foreground = match argv.last() {
        Some(last) if last == BACKGROUND => {
            argv.pop();
            false
        }
        _ => true,
    };

    if argv.is_empty() {
        return Err(ParseError::MissingCommand);
    }

    Ok(CommandLine {
        argv,
        input,
        output,
        foreground,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    #[test]
    fn plain_command() {
        let cmd = parse(&words("/bin/ls -l /tmp")).unwrap();
        assert_eq!(cmd.argv, vec!["/bin/ls", "-l", "/tmp"]);
        assert_eq!(cmd.program(), "/bin/ls");
        assert_eq!(cmd.args(), ["-l", "/tmp"]);
        assert!(cmd.input.is_none());
        assert!(cmd.output.is_none());
        assert!(cmd.foreground);
    }

    #[test]
    fn redirections_anywhere() {
        let cmd = parse(&words("> out sort < in -r")).unwrap();
        assert_eq!(cmd.argv, vec!["sort", "-r"]);
        assert_eq!(cmd.input, Some(PathBuf::from("in")));
        assert_eq!(
            cmd.output,
            Some(OutputRedirect { path: PathBuf::from("out"), append: false })
        );
    }

    #[test]
    fn append_and_background() {
        let cmd = parse(&words("echo hi >> log &")).unwrap();
        assert_eq!(cmd.argv, vec!["echo", "hi"]);
        assert!(cmd.output.unwrap().append);
        assert!(!cmd.foreground);
    }

    #[test]
    fn ampersand_only_counts_when_trailing() {
        let cmd = parse(&words("echo & hi")).unwrap();
        assert_eq!(cmd.argv, vec!["echo", "&", "hi"]);
        assert!(cmd.foreground);
    }

    #[test]
    fn ampersand_trailing_after_redirect_removal() {
        let cmd = parse(&words("sleep 1 & > out")).unwrap();
        assert_eq!(cmd.argv, vec!["sleep", "1"]);
        assert!(!cmd.foreground);
    }

    #[test]
    fn lone_ampersand_has_no_command() {
        assert_eq!(parse(&words("&")), Err(ParseError::MissingCommand));
        assert_eq!(parse(&words("< in")), Err(ParseError::MissingCommand));
    }
}
