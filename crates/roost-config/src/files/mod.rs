//! File selection for publishing.
//!
//! With an explicit `files` list in the config, every glob is expanded
//! relative to the project root and must match something. Without one,
//! the whole project tree is walked and filtered through the ignore
//! rules. Matched files are read back base64-encoded as upload pieces.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use indexmap::IndexMap;
use walkdir::WalkDir;

use roost_core::error::{RoostError, RoostResult};

use crate::ignore::Ignore;
use crate::Config;

/// A file selected for publishing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    /// Absolute location on disk
    pub full_path: PathBuf,
    /// Project-relative path with a leading slash and forward separators,
    /// as the registry stores it
    pub path: String,
}

/// Select the files to publish from `root`
pub fn match_files(config: &Config, ignore: &Ignore, root: &Path) -> RoostResult<Vec<MatchedFile>> {
    let mut matched = Vec::new();

    if let Some(files) = &config.files {
        let mut patterns: Vec<String> = Vec::with_capacity(files.len() + 1);
        if let Some(entry) = &config.entry {
            patterns.push(entry.clone());
        }
        patterns.extend(files.iter().cloned());

        for pattern in &patterns {
            let full_pattern = root.join(pattern).to_string_lossy().into_owned();
            let paths: Vec<PathBuf> = glob::glob(&full_pattern)
                .map_err(|e| RoostError::FileMatching {
                    pattern: pattern.clone(),
                    reason: format!("is invalid: {e}"),
                })?
                .filter_map(Result::ok)
                .filter(|path| path.is_file())
                .collect();

            if paths.is_empty() {
                return Err(RoostError::FileMatching {
                    pattern: pattern.clone(),
                    reason: "did not match any file; there may be a typo in the path".to_string(),
                });
            }
            for full_path in paths {
                matched.push(to_matched(root, full_path));
            }
        }
    } else {
        for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            matched.push(to_matched(root, entry.into_path()));
        }
    }

    let entry_path = config.entry.as_deref().map(normalize_entry);
    matched.retain(|file| {
        // the entry file is always published, ignore rules notwithstanding
        if Some(&file.path) == entry_path.as_ref() {
            return true;
        }
        !ignore.is_ignored(file.path.trim_start_matches('/'))
    });
    matched.dedup();

    Ok(matched)
}

/// Check that the entry file survived matching; publishing without the
/// entry would produce a module nobody can import.
pub fn check_entry(config: &Config, matched: &[MatchedFile]) -> RoostResult<String> {
    let entry = normalize_entry(config.entry.as_deref().unwrap_or("mod.ts"));
    if matched.iter().any(|file| file.path == entry) {
        Ok(entry)
    } else {
        Err(RoostError::ConfigValidation {
            field: "entry".to_string(),
            reason: format!("{entry} was not found among the files to publish"),
        })
    }
}

/// Read every matched file, base64-encoded, keyed by registry path
pub fn read_pieces(matched: &[MatchedFile]) -> RoostResult<IndexMap<String, String>> {
    let mut pieces = IndexMap::with_capacity(matched.len());
    for file in matched {
        let bytes = std::fs::read(&file.full_path)
            .map_err(|e| RoostError::io(format!("failed to read {}", file.full_path.display()), e))?;
        pieces.insert(file.path.clone(), STANDARD.encode(bytes));
    }
    Ok(pieces)
}

/// Entry spellings like `./mod.ts` and `mod.ts` all map to `/mod.ts`
fn normalize_entry(entry: &str) -> String {
    let trimmed = entry.trim_start_matches('.').trim_start_matches('/');
    format!("/{trimmed}")
}

fn to_matched(root: &Path, full_path: PathBuf) -> MatchedFile {
    let relative = full_path
        .strip_prefix(root)
        .unwrap_or(&full_path)
        .to_string_lossy()
        .replace('\\', "/");
    MatchedFile {
        path: format!("/{relative}"),
        full_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ignore::parse_ignore;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("mod.ts"), "export {};\n").unwrap();
        std::fs::write(dir.path().join("src/util.ts"), "export const u = 1;\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "scratch\n").unwrap();
        dir
    }

    #[test]
    fn test_explicit_globs_are_expanded() {
        let dir = project();
        let config = Config {
            entry: Some("mod.ts".to_string()),
            files: Some(vec!["src/**/*.ts".to_string()]),
            ..Default::default()
        };

        let matched = match_files(&config, &Ignore::default(), dir.path()).unwrap();
        let paths: Vec<&str> = matched.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["/mod.ts", "/src/util.ts"]);
    }

    #[test]
    fn test_unmatched_glob_is_an_error() {
        let dir = project();
        let config = Config {
            files: Some(vec!["missing/**/*.ts".to_string()]),
            ..Default::default()
        };

        let result = match_files(&config, &Ignore::default(), dir.path());
        assert!(matches!(result, Err(RoostError::FileMatching { .. })));
    }

    #[test]
    fn test_walk_applies_ignore_rules() {
        let dir = project();
        let config = Config {
            entry: Some("mod.ts".to_string()),
            ..Default::default()
        };
        let ignore = parse_ignore("*.txt\n", "test");

        let matched = match_files(&config, &ignore, dir.path()).unwrap();
        let mut paths: Vec<&str> = matched.iter().map(|f| f.path.as_str()).collect();
        paths.sort();
        assert_eq!(paths, vec!["/mod.ts", "/src/util.ts"]);
    }

    #[test]
    fn test_entry_survives_its_own_ignore_rule() {
        let dir = project();
        let config = Config {
            entry: Some("mod.ts".to_string()),
            ..Default::default()
        };
        let ignore = parse_ignore("*.ts\n", "test");

        let matched = match_files(&config, &ignore, dir.path()).unwrap();
        let mut paths: Vec<&str> = matched.iter().map(|f| f.path.as_str()).collect();
        paths.sort();
        assert_eq!(paths, vec!["/mod.ts", "/notes.txt"]);
    }

    #[test]
    fn test_check_entry() {
        let dir = project();
        let config = Config {
            entry: Some("./mod.ts".to_string()),
            ..Default::default()
        };
        let matched = match_files(&config, &Ignore::default(), dir.path()).unwrap();
        assert_eq!(check_entry(&config, &matched).unwrap(), "/mod.ts");

        let missing = Config {
            entry: Some("main.ts".to_string()),
            ..Default::default()
        };
        assert!(check_entry(&missing, &matched).is_err());
    }

    #[test]
    fn test_read_pieces_encodes_contents() {
        let dir = project();
        let config = Config {
            entry: Some("mod.ts".to_string()),
            files: Some(vec![]),
            ..Default::default()
        };
        let matched = match_files(&config, &Ignore::default(), dir.path()).unwrap();
        let pieces = read_pieces(&matched).unwrap();

        assert_eq!(
            pieces.get("/mod.ts").map(String::as_str),
            Some(STANDARD.encode("export {};\n").as_str())
        );
    }
}
