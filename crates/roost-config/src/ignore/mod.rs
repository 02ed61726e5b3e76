//! Ignore file handling.
//!
//! `.roostignore` follows the familiar gitignore shape: one pattern per
//! line, `#` comments, `!` negations, and an extra `extends <glob>` line
//! that pulls other ignore files in. Patterns are matched against
//! project-relative paths with forward slashes.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::error;

use roost_core::error::{RoostError, RoostResult};

/// Filename probed by [`default_ignore`]
pub const DEFAULT_IGNORE: &str = ".roostignore";

/// Parsed ignore rules
#[derive(Debug, Clone, Default)]
pub struct Ignore {
    pub accepts: Vec<Pattern>,
    pub denies: Vec<Pattern>,
    extends: Vec<String>,
}

impl Ignore {
    /// True when `path` is denied and not re-accepted by a negation
    pub fn is_ignored(&self, path: &str) -> bool {
        let denied = self.denies.iter().any(|pattern| pattern.matches(path));
        denied && !self.accepts.iter().any(|pattern| pattern.matches(path))
    }
}

/// Find the default ignore file in `dir`, if any
pub fn default_ignore(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(DEFAULT_IGNORE);
    path.exists().then_some(path)
}

/// Read the ignore file at `path` and expand its `extends` lines relative
/// to `root`
pub fn read_ignore(path: &Path, root: &Path) -> RoostResult<Ignore> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| RoostError::io(format!("failed to read {}", path.display()), e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut ignore = parse_ignore(&data, &name);
    extend_ignore(&mut ignore, root)?;
    Ok(ignore)
}

/// Pull in every ignore file referenced by an `extends` line. Referencing
/// a `.gitignore` also denies the `.git` directory itself.
fn extend_ignore(ignore: &mut Ignore, root: &Path) -> RoostResult<()> {
    while let Some(reference) = ignore.extends.pop() {
        if reference.ends_with(".gitignore") {
            if let Ok(pattern) = Pattern::new(".git*/**") {
                ignore.denies.push(pattern);
            }
        }
        let full_pattern = root.join(&reference).to_string_lossy().into_owned();
        let paths = glob::glob(&full_pattern).map_err(|e| RoostError::FileMatching {
            pattern: reference.clone(),
            reason: format!("is invalid: {e}"),
        })?;
        for path in paths.filter_map(Result::ok) {
            let nested = read_ignore(&path, root)?;
            ignore.accepts.extend(nested.accepts);
            ignore.denies.extend(nested.denies);
        }
    }
    Ok(())
}

/// Parse ignore rules from text. Malformed pattern lines are logged and
/// skipped.
pub fn parse_ignore(data: &str, name: &str) -> Ignore {
    let mut ignore = Ignore::default();

    for (index, raw) in data.lines().enumerate() {
        let line = raw.trim_start();
        // Blank lines match nothing and separate sections for readability
        if line.is_empty() {
            continue;
        }
        // A leading # is a comment; escape the first hash to match it
        if line.starts_with('#') {
            continue;
        }
        let accepts = line.starts_with('!');
        let extends = line.starts_with("extends ");

        // Unquoted whitespace is dropped; a backslash escapes the next
        // character
        let mut line = clean_line(line);
        if accepts {
            line.remove(0);
        }
        if extends {
            ignore.extends.push(line["extends".len()..].to_string());
            continue;
        }

        // A bare name may match at any depth; a pattern with an inner
        // separator is anchored to the ignore file's directory
        if line.trim_end_matches('/').split('/').count() == 1 {
            line = format!("**/{line}");
        }
        // A trailing separator matches the directory's contents
        if line.ends_with('/') {
            line = format!("{line}**");
        }

        match Pattern::new(&line) {
            Ok(pattern) => {
                if accepts {
                    ignore.accepts.push(pattern);
                } else {
                    ignore.denies.push(pattern);
                }
            },
            Err(err) => {
                error!("parsing {name}: error at line {}: {err}", index + 1);
            },
        }
    }

    ignore
}

/// Drop unescaped whitespace and resolve backslash escapes
fn clean_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            },
            c if c.is_whitespace() => {},
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_and_blanks_are_skipped() {
        let ignore = parse_ignore("# header\n\n   \nnode_modules\n", "test");
        assert_eq!(ignore.denies.len(), 1);
        assert!(ignore.accepts.is_empty());
    }

    #[test]
    fn test_bare_names_match_at_any_depth() {
        let ignore = parse_ignore("node_modules\n", "test");
        assert!(ignore.is_ignored("node_modules"));
        assert!(ignore.is_ignored("vendor/node_modules"));
        assert!(!ignore.is_ignored("src/mod.ts"));
    }

    #[test]
    fn test_directory_patterns_match_contents() {
        let ignore = parse_ignore("build/\n", "test");
        assert!(ignore.is_ignored("build/out.js"));
        assert!(ignore.is_ignored("target/build/out.js"));
    }

    #[test]
    fn test_negation_wins_over_deny() {
        let ignore = parse_ignore("*.ts\n!mod.ts\n", "test");
        assert!(ignore.is_ignored("src/util.ts"));
        assert!(!ignore.is_ignored("mod.ts"));
    }

    #[test]
    fn test_anchored_patterns_stay_anchored() {
        let ignore = parse_ignore("src/generated/*.ts\n", "test");
        assert!(ignore.is_ignored("src/generated/api.ts"));
        assert!(!ignore.is_ignored("other/src/generated/api.ts"));
    }

    #[test]
    fn test_escaped_spaces_survive_cleaning() {
        let ignore = parse_ignore("my\\ file.ts\n", "test");
        assert!(ignore.is_ignored("my file.ts"));
    }

    #[test]
    fn test_malformed_patterns_are_skipped() {
        let ignore = parse_ignore("[broken\nnode_modules\n", "test");
        assert_eq!(ignore.denies.len(), 1);
        assert!(ignore.is_ignored("node_modules"));
    }

    #[test]
    fn test_extends_pulls_in_referenced_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "target\n").unwrap();
        std::fs::write(dir.path().join(DEFAULT_IGNORE), "extends .gitignore\ndist\n").unwrap();

        let path = default_ignore(dir.path()).unwrap();
        let ignore = read_ignore(&path, dir.path()).unwrap();
        assert!(ignore.is_ignored("dist"));
        assert!(ignore.is_ignored("target"));
        assert!(ignore.is_ignored(".git/config"));
        assert!(!ignore.is_ignored("mod.ts"));
    }
}
