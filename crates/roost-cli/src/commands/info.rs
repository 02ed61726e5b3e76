//! `roost info` command implementation.
//!
//! Resolves the dependency tree of an entry module and prints it as an
//! indented tree, followed by the dependency count, any resolution
//! failures, and a cycle warning.

use std::sync::Arc;

use tracing::{debug, info, warn};

use roost_core::error::RoostResult;
use roost_resolver::TreeBuilder;

use super::CommandContext;
use crate::output::progress::ResolveProgress;
use crate::output::tree;

/// Execute the `roost info` command
pub async fn execute(file: &str, full: bool, raw: bool, _ctx: &CommandContext) -> RoostResult<()> {
    let progress = Arc::new(ResolveProgress::new());
    let found = progress.clone();
    let resolved = progress.clone();

    let report = TreeBuilder::new()?
        .full_tree(full)
        .on_found(move |total| found.found(total))
        .on_resolved(move |total| resolved.resolved(total))
        .build(file)
        .await?;
    progress.finish();

    debug!("dependency tree: {:?}", report.tree);
    print!("{}", tree::render(&report, raw));

    println!();
    info!("Found {} modules.", report.count);
    for failure in &report.errors {
        warn!("Failed to resolve {}: {}", failure.url, failure.detail);
    }
    if report.circular {
        warn!("This dependency tree contains circular imports!");
    }

    Ok(())
}
