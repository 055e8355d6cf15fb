//! Program path helpers.

use std::path::{Path, PathBuf};

/// Resolve a bare program name through a `PATH`-style search list.
///
/// Returns the first regular file with any execute bit set.
pub fn resolve_in_path(name: &str, path_var: &str) -> Option<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    for dir in path_var.split(':') {
        if dir.is_empty() {
            continue;
        }

        let candidate = Path::new(dir).join(name);
        match candidate.metadata() {
            Ok(meta) if meta.is_file() && meta.permissions().mode() & 0o111 != 0 => {
                return Some(candidate);
            }
            _ => {}
        }
    }

    None
}

/// Locate the program a command word refers to.
///
/// Words containing `/` are taken as paths verbatim; anything else goes
/// through `path_var`.
pub fn locate_program(word: &str, path_var: &str) -> Option<PathBuf> {
    if word.contains('/') {
        Some(PathBuf::from(word))
    } else {
        resolve_in_path(word, path_var)
    }
}

/// Final path segment of a program path, used as `argv[0]` and job name.
pub fn basename(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_cases() {
        assert_eq!(basename("/bin/ls"), "ls");
        assert_eq!(basename("ls"), "ls");
        assert_eq!(basename("./tools/run.sh"), "run.sh");
        assert_eq!(basename("/usr/bin/"), "bin");
        assert_eq!(basename("/"), "/");
    }

    #[test]
    fn resolves_sh_in_path() {
        let found = resolve_in_path("sh", "/nonexistent:/bin:/usr/bin").unwrap();
        assert!(found.ends_with("sh"));
    }

    #[test]
    fn unresolved_name() {
        assert_eq!(resolve_in_path("definitely_not_a_real_command_12345", "/bin:/usr/bin"), None);
        assert_eq!(resolve_in_path("sh", ""), None);
    }

    #[test]
    fn slash_words_bypass_search() {
        assert_eq!(locate_program("./x", ""), Some(PathBuf::from("./x")));
    }
}
