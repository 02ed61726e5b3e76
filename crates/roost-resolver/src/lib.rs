//! Dependency-tree resolution engine for roost modules.
//!
//! Given an entry module (local file or remote URL), this crate discovers
//! every statically-imported dependency, builds a tree of those imports,
//! detects cycles, folds repeated subtrees, and reports unresolvable
//! imports, fetching concurrently along the way.

pub mod extract;
pub mod fetch;
pub mod tree;
pub mod url;

// Re-export main types
pub use fetch::SourceFetcher;
pub use tree::{DependencyReport, ImportPath, ResolveFailure, TreeBuilder, TreeNode};
pub use url::{file_url, resolve_url};
