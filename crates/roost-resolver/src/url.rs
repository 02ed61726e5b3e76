//! Canonical URL normalization.
//!
//! Every module is identified by a single canonical string: either an
//! `http(s)://` URL or a `file://` URL with forward slashes and
//! percent-encoded reserved characters. The memo table and cycle detector
//! key on string equality, so two spellings of the same resource must
//! normalize to the identical string.

use std::path::{Component, Path, PathBuf};

use roost_core::error::{RoostError, RoostResult};
use url::Url;

/// True when the specifier is already an absolute remote URL.
pub fn is_remote(specifier: &str) -> bool {
    specifier.starts_with("http://") || specifier.starts_with("https://")
}

/// Resolve any specifier, relative path or remote URL, into its canonical
/// form. `base` is the canonical URL of the importing module, or empty for
/// a top-level entry.
///
/// Normalization is idempotent: a canonical URL resolves to itself.
pub fn resolve_url(specifier: &str, base: &str) -> RoostResult<String> {
    if is_remote(specifier) || specifier.starts_with("file://") {
        return Ok(specifier.to_string());
    }
    if is_remote(base) {
        let joined = Url::parse(base)
            .and_then(|b| b.join(specifier))
            .map_err(|e| invalid(specifier, base, e))?;
        return Ok(joined.into());
    }
    if specifier.is_empty() && base.is_empty() {
        return Err(RoostError::InvalidSpecifier {
            specifier: String::new(),
            base: String::new(),
            reason: "empty specifier without a base".to_string(),
        });
    }
    file_url(specifier, base)
}

/// Convert a filesystem path into a `file://` URL, resolving relative paths
/// against `base` (when it is a file URL) or the working directory.
pub fn file_url(path: &str, base: &str) -> RoostResult<String> {
    if base.starts_with("file:///") && !Path::new(path).is_absolute() {
        let joined = Url::parse(base)
            .and_then(|b| b.join(path))
            .map_err(|e| invalid(path, base, e))?;
        return Ok(joined.into());
    }

    let cleaned = path.replace('\\', "/");
    let absolute = if Path::new(&cleaned).is_absolute() {
        normalize_path(Path::new(&cleaned))
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| RoostError::io("failed to read working directory".to_string(), e))?;
        normalize_path(&cwd.join(&cleaned))
    };

    let mut flat = absolute.to_string_lossy().replace('\\', "/");
    // Windows drive letters come out without a root slash
    if !flat.starts_with('/') {
        flat.insert(0, '/');
    }

    Ok(format!("file://{}", encode_path(&flat)))
}

/// Resolve `.` and `..` components lexically
fn normalize_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                if matches!(parts.last(), Some(Component::Normal(_))) {
                    parts.pop();
                } else if !matches!(
                    parts.last(),
                    Some(Component::RootDir) | Some(Component::Prefix(_))
                ) {
                    parts.push(component);
                }
            },
            other => parts.push(other),
        }
    }

    parts.iter().collect()
}

/// Percent-encode a path for use inside a `file://` URL. Mirrors the
/// reserved set browsers keep unescaped in URLs, except `?` and `#`,
/// which would otherwise start a query or fragment.
fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b';'
            | b','
            | b'/'
            | b':'
            | b'@'
            | b'&'
            | b'='
            | b'+'
            | b'$'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            other => {
                out.push('%');
                out.push_str(&format!("{other:02X}"));
            },
        }
    }
    out
}

fn invalid(specifier: &str, base: &str, err: url::ParseError) -> RoostError {
    RoostError::InvalidSpecifier {
        specifier: specifier.to_string(),
        base: base.to_string(),
        reason: err.to_string(),
    }
}
