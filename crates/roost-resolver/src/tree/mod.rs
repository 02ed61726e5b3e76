//! Dependency tree construction.
//!
//! The builder walks the import graph starting from an entry module,
//! fetching every statically-imported dependency and assembling a tree of
//! the results. All imports of a module are resolved concurrently; the
//! resulting `imports` list still follows source-extraction order. Repeat
//! references are folded (or, with `full_tree`, expanded from the already
//! resolved subtree), cycles are cut with a marker node, and a failed
//! branch never takes its siblings down with it.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures::future::{join_all, ready, BoxFuture};
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::debug;

use roost_core::error::RoostResult;

use crate::extract::extract_imports;
use crate::fetch::SourceFetcher;
use crate::url::resolve_url;

/// Identity of a node in the dependency tree: a canonical URL, or a marker
/// standing in for a subtree that was not expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportPath {
    /// A resolved module URL
    Url(String),
    /// The target is an ancestor of this branch
    Circular,
    /// The target was already resolved elsewhere in the tree
    Redundant,
    /// Fetching or resolving the target failed
    Error(String),
}

impl ImportPath {
    /// True for marker variants, which never carry children
    pub fn is_marker(&self) -> bool {
        !matches!(self, ImportPath::Url(_))
    }
}

impl fmt::Display for ImportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportPath::Url(url) => write!(f, "{url}"),
            ImportPath::Circular => write!(f, "[Circular]"),
            ImportPath::Redundant => write!(f, "[Redundant]"),
            ImportPath::Error(detail) => write!(f, "[Error: {detail}]"),
        }
    }
}

/// One node of the dependency tree. `imports` lists the node's direct
/// static dependencies in source-extraction order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub path: ImportPath,
    pub imports: Vec<TreeNode>,
}

/// A dependency that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveFailure {
    /// Canonical URL, or the raw specifier when normalization itself failed
    pub url: String,
    pub detail: String,
}

/// Outcome of a full traversal
#[derive(Debug, Clone)]
pub struct DependencyReport {
    /// Single root node whose path is the normalized entry URL
    pub tree: Vec<TreeNode>,
    /// Whether any cycle was found anywhere in the traversal
    pub circular: bool,
    /// Number of distinct URLs for which a resolution was started
    pub count: usize,
    /// Every failed fetch/resolution, in observation order
    pub errors: Vec<ResolveFailure>,
}

type ProgressCallback = Box<dyn Fn(usize) + Send + Sync>;
type Extractor = Box<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// Builds dependency trees. Configure once, then call [`TreeBuilder::build`]
/// per entry; every build uses its own traversal state, so concurrent
/// builds do not interfere.
pub struct TreeBuilder {
    fetcher: SourceFetcher,
    full_tree: bool,
    extractor: Extractor,
    on_found: Option<ProgressCallback>,
    on_resolved: Option<ProgressCallback>,
}

impl TreeBuilder {
    pub fn new() -> RoostResult<Self> {
        Ok(Self {
            fetcher: SourceFetcher::new()?,
            full_tree: false,
            extractor: Box::new(|source| extract_imports(source)),
            on_found: None,
            on_resolved: None,
        })
    }

    /// Expand repeated subtrees instead of folding them into `[Redundant]`
    /// markers. Trees with heavily shared dependencies grow accordingly.
    pub fn full_tree(mut self, full: bool) -> Self {
        self.full_tree = full;
        self
    }

    /// Invoked with the running total of discovered imports each time a new
    /// URL enters resolution. Must not panic.
    pub fn on_found(mut self, callback: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_found = Some(Box::new(callback));
        self
    }

    /// Invoked with the running total of completed (or failed) resolutions.
    /// Must not panic.
    pub fn on_resolved(mut self, callback: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_resolved = Some(Box::new(callback));
        self
    }

    /// Replace the default import extractor
    pub fn extractor(
        mut self,
        extractor: impl Fn(&str) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Resolve `entry` (a path or URL) and every static import reachable
    /// from it. Only a failure on the entry itself aborts the build; any
    /// deeper failure is captured in the tree and the error list.
    pub async fn build(&self, entry: &str) -> RoostResult<DependencyReport> {
        let root = resolve_url(entry, "")?;
        debug!(entry, url = %root, "resolving dependency tree");

        let ctx = ResolveCtx::default();
        ctx.memo.lock().insert(root.clone(), MemoState::InProgress);
        self.note_found(&ctx);

        let nodes = self.resolve_node(&ctx, root.clone(), Vec::new()).await?;

        let ResolveCtx {
            memo,
            circular,
            found,
            resolved: _,
            errors,
        } = ctx;
        let memo = memo.into_inner();
        let mut circular = circular.into_inner();
        let mut visiting = Vec::new();
        let imports = materialize(&memo, &nodes, &mut visiting, &mut circular);

        Ok(DependencyReport {
            tree: vec![TreeNode {
                path: ImportPath::Url(root),
                imports,
            }],
            circular,
            count: found.into_inner(),
            errors: errors.into_inner(),
        })
    }

    /// Resolve one module and return its import nodes. The memo entry for
    /// `url` must already exist; it is finalized here once the outcome is
    /// known.
    fn resolve_node<'a>(
        &'a self,
        ctx: &'a ResolveCtx,
        url: String,
        parents: Vec<String>,
    ) -> BoxFuture<'a, RoostResult<Vec<RawNode>>> {
        async move {
            let outcome = self.resolve_imports(ctx, &url, parents).await;

            match &outcome {
                Ok(nodes) => {
                    ctx.memo
                        .lock()
                        .insert(url.clone(), MemoState::Resolved(nodes.clone()));
                },
                Err(err) => {
                    ctx.memo.lock().insert(url.clone(), MemoState::Failed);
                    ctx.errors.lock().push(ResolveFailure {
                        url: url.clone(),
                        detail: err.to_string(),
                    });
                },
            }

            let completed = ctx.resolved.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(callback) = &self.on_resolved {
                callback(completed);
            }

            outcome
        }
        .boxed()
    }

    async fn resolve_imports(
        &self,
        ctx: &ResolveCtx,
        url: &str,
        parents: Vec<String>,
    ) -> RoostResult<Vec<RawNode>> {
        let source = self.fetcher.fetch(url).await?;
        let specifiers = (self.extractor)(&source);
        debug!(url, imports = specifiers.len(), "extracted imports");

        // Ancestor chain for this branch, current module first
        let mut chain = Vec::with_capacity(parents.len() + 1);
        chain.push(url.to_string());
        chain.extend(parents);

        // Classify every specifier in source order before any child
        // resolution starts, so discovery notifications and memo
        // registration happen in extraction order.
        let plans: Vec<ChildPlan> = specifiers
            .iter()
            .map(|raw| self.classify(ctx, raw, url, &chain))
            .collect();

        let children: Vec<BoxFuture<'_, RawNode>> = plans
            .into_iter()
            .map(|plan| self.child_future(ctx, plan, &chain))
            .collect();

        // Children settle concurrently; join_all keeps input order, so the
        // imports list matches the specifier order no matter which fetch
        // finishes first.
        Ok(join_all(children).await)
    }

    fn classify(&self, ctx: &ResolveCtx, raw: &str, base: &str, chain: &[String]) -> ChildPlan {
        let resolved = match resolve_url(raw, base) {
            Ok(url) => url,
            Err(err) => {
                let detail = err.to_string();
                ctx.errors.lock().push(ResolveFailure {
                    url: raw.to_string(),
                    detail: detail.clone(),
                });
                return ChildPlan::Invalid { detail };
            },
        };

        if chain.iter().any(|ancestor| ancestor == &resolved) {
            ctx.circular.store(true, Ordering::SeqCst);
            return ChildPlan::Circular;
        }

        // Single locked check-then-insert: concurrent branches discovering
        // the same URL must agree on exactly one resolver.
        let mut memo = ctx.memo.lock();
        if memo.contains_key(&resolved) {
            return if self.full_tree {
                ChildPlan::Reuse(resolved)
            } else {
                ChildPlan::Redundant
            };
        }
        memo.insert(resolved.clone(), MemoState::InProgress);
        drop(memo);

        self.note_found(ctx);
        ChildPlan::Resolve(resolved)
    }

    fn child_future<'a>(
        &'a self,
        ctx: &'a ResolveCtx,
        plan: ChildPlan,
        chain: &[String],
    ) -> BoxFuture<'a, RawNode> {
        match plan {
            ChildPlan::Circular => ready(RawNode::leaf(ImportPath::Circular)).boxed(),
            ChildPlan::Redundant => ready(RawNode::leaf(ImportPath::Redundant)).boxed(),
            ChildPlan::Invalid { detail } => {
                ready(RawNode::leaf(ImportPath::Error(detail))).boxed()
            },
            ChildPlan::Reuse(url) => ready(RawNode {
                path: ImportPath::Url(url.clone()),
                imports: RawImports::Shared(url),
            })
            .boxed(),
            ChildPlan::Resolve(url) => {
                let parents = chain.to_vec();
                async move {
                    match self.resolve_node(ctx, url.clone(), parents).await {
                        Ok(nodes) => RawNode {
                            path: ImportPath::Url(url),
                            imports: RawImports::Inline(nodes),
                        },
                        // The failure stays on this branch; siblings keep
                        // resolving. The error list entry was recorded when
                        // the resolution finalized.
                        Err(err) => RawNode::leaf(ImportPath::Error(err.to_string())),
                    }
                }
                .boxed()
            },
        }
    }

    fn note_found(&self, ctx: &ResolveCtx) {
        let discovered = ctx.found.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(callback) = &self.on_found {
            callback(discovered);
        }
    }
}

/// How one classified specifier will be turned into a node
enum ChildPlan {
    Resolve(String),
    Reuse(String),
    Circular,
    Redundant,
    Invalid { detail: String },
}

/// Node shape used during traversal: a reused subtree stays a reference
/// into the memo table until the whole build settles.
#[derive(Debug, Clone)]
struct RawNode {
    path: ImportPath,
    imports: RawImports,
}

#[derive(Debug, Clone)]
enum RawImports {
    Inline(Vec<RawNode>),
    Shared(String),
}

impl RawNode {
    fn leaf(path: ImportPath) -> Self {
        Self {
            path,
            imports: RawImports::Inline(Vec::new()),
        }
    }
}

/// Per-URL resolution state. An entry is created the moment a URL is
/// discovered, before its fetch starts, which is what lets concurrent
/// branches recognize a module that is still mid-resolution.
#[derive(Debug, Clone)]
enum MemoState {
    InProgress,
    Resolved(Vec<RawNode>),
    Failed,
}

/// Shared state for a single `build` call
#[derive(Default)]
struct ResolveCtx {
    memo: Mutex<HashMap<String, MemoState>>,
    circular: AtomicBool,
    found: AtomicUsize,
    resolved: AtomicUsize,
    errors: Mutex<Vec<ResolveFailure>>,
}

/// Turn raw nodes into the public tree, expanding shared subtrees from the
/// memo table. Two siblings can each fold in the other's subtree without
/// the ancestor chain ever seeing a cycle; `visiting` cuts that knot with
/// a `Circular` marker.
fn materialize(
    memo: &HashMap<String, MemoState>,
    nodes: &[RawNode],
    visiting: &mut Vec<String>,
    circular: &mut bool,
) -> Vec<TreeNode> {
    nodes
        .iter()
        .map(|node| match &node.imports {
            RawImports::Inline(children) => TreeNode {
                path: node.path.clone(),
                imports: materialize(memo, children, visiting, circular),
            },
            RawImports::Shared(url) => {
                if visiting.iter().any(|v| v == url) {
                    *circular = true;
                    return TreeNode {
                        path: ImportPath::Circular,
                        imports: Vec::new(),
                    };
                }
                match memo.get(url) {
                    Some(MemoState::Resolved(subtree)) => {
                        visiting.push(url.clone());
                        let imports = materialize(memo, subtree, visiting, circular);
                        visiting.pop();
                        TreeNode {
                            path: node.path.clone(),
                            imports,
                        }
                    },
                    // Failed (or never-settled) targets have nothing to
                    // expand; keep the reference as a leaf.
                    _ => TreeNode {
                        path: node.path.clone(),
                        imports: Vec::new(),
                    },
                }
            },
        })
        .collect()
}
