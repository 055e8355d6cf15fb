//! ExecResult: the outcome of executing one command line.

/// The result of executing a builtin or launching a program.
///
/// `out` is destined for standard output and `err` for standard error. The
/// kernel never writes to either stream itself; the REPL renders results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Exit code. 0 means success.
    pub code: i64,
    /// Text for standard output.
    pub out: String,
    /// Text for standard error (diagnostics and job status lines).
    pub err: String,
}

impl ExecResult {
    /// Create a successful result with output.
    pub fn success(out: impl Into<String>) -> Self {
        Self {
            code: 0,
            out: out.into(),
            err: String::new(),
        }
    }

    /// Create a failed result with an error message.
    pub fn failure(code: i64, err: impl Into<String>) -> Self {
        Self {
            code,
            out: String::new(),
            err: err.into(),
        }
    }

    /// Create a result from raw output streams.
    pub fn from_output(code: i64, out: impl Into<String>, err: impl Into<String>) -> Self {
        Self {
            code,
            out: out.into(),
            err: err.into(),
        }
    }

    /// True if the exit code is 0.
    pub fn ok(&self) -> bool {
        self.code == 0
    }

    /// Append one line to `err`.
    pub fn push_err_line(&mut self, line: impl AsRef<str>) {
        self.err.push_str(line.as_ref());
        self.err.push('\n');
    }

    /// Builder form of [`push_err_line`](Self::push_err_line).
    pub fn with_err_line(mut self, line: impl AsRef<str>) -> Self {
        self.push_err_line(line);
        self
    }
}
