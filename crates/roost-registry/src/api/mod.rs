//! Registry API payload types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Module metadata as returned by `GET /api/package/{name}`.
///
/// Version strings are reported exactly as the registry stores them; the
/// client never compares or increments them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Module {
    /// Module name
    pub name: String,
    /// Owning account
    pub owner: String,
    /// Gallery description
    pub description: Option<String>,
    /// Source repository link
    pub repository: Option<String>,
    /// Most recently published version, as `name@version`
    #[serde(rename = "latestVersion")]
    pub latest_version: Option<String>,
    /// Most recently published stable version, as `name@version`
    #[serde(rename = "latestStableVersion")]
    pub latest_stable_version: Option<String>,
    /// Every published upload, as `name@version`
    #[serde(rename = "packageUploadNames", default)]
    pub package_upload_names: Vec<String>,
}

impl Module {
    /// Whether `name@version` has already been published
    pub fn has_upload(&self, name_version: &str) -> bool {
        self.package_upload_names
            .iter()
            .any(|upload| upload == name_version)
    }
}

/// Manifest sent to `POST /api/publish`
#[derive(Debug, Clone, Serialize)]
pub struct PublishRequest {
    pub name: String,
    pub description: Option<String>,
    pub repository: Option<String>,
    pub version: String,
    pub unlisted: bool,
    pub upload: bool,
    pub entry: String,
    pub latest: bool,
    pub stable: bool,
}

/// Upload authorization returned by `POST /api/publish`
#[derive(Debug, Clone, Deserialize)]
pub struct PublishResponse {
    pub token: String,
    pub name: String,
    pub version: String,
    pub owner: String,
}

/// Body of `POST /api/piece`
#[derive(Debug, Clone, Serialize)]
pub struct PiecesRequest {
    /// Project-relative path -> base64-encoded contents
    pub pieces: IndexMap<String, String>,
    pub end: bool,
}

/// Hosted file listing returned by `POST /api/piece`
#[derive(Debug, Clone, Deserialize)]
pub struct PiecesResponse {
    pub name: String,
    /// Project-relative path -> hosted identifier
    pub files: IndexMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_decoding_tolerates_missing_fields() {
        let module: Module = serde_json::from_str(
            r#"{"name": "wren", "owner": "roost", "description": null}"#,
        )
        .unwrap();
        assert_eq!(module.name, "wren");
        assert!(module.package_upload_names.is_empty());
        assert!(module.latest_version.is_none());
    }

    #[test]
    fn test_has_upload_is_exact_match() {
        let module: Module = serde_json::from_str(
            r#"{
                "name": "wren",
                "owner": "roost",
                "packageUploadNames": ["wren@0.1.0", "wren@0.2.0"]
            }"#,
        )
        .unwrap();
        assert!(module.has_upload("wren@0.2.0"));
        assert!(!module.has_upload("wren@0.2"));
        assert!(!module.has_upload("wren@0.3.0"));
    }
}
