//! Plain indented rendering of a dependency tree.
//!
//! Marker nodes keep their bracket text so they stand apart from real
//! URLs; local file URLs are shortened unless raw output is requested.

use roost_resolver::{DependencyReport, ImportPath, TreeNode};

/// Render the whole report as an indented tree
pub fn render(report: &DependencyReport, raw: bool) -> String {
    let mut out = String::new();
    for root in &report.tree {
        render_node(&mut out, &root.path, &root.imports, "", true, raw);
    }
    out
}

fn render_node(
    out: &mut String,
    path: &ImportPath,
    imports: &[TreeNode],
    indent: &str,
    last: bool,
    raw: bool,
) {
    let (rail, child_indent) = if last {
        ("└─", format!("{indent}  "))
    } else {
        ("├─", format!("{indent}│ "))
    };
    out.push_str(indent);
    out.push_str(rail);
    out.push_str(&display_path(path, raw));
    out.push('\n');

    for (index, node) in imports.iter().enumerate() {
        render_node(
            out,
            &node.path,
            &node.imports,
            &child_indent,
            index + 1 == imports.len(),
            raw,
        );
    }
}

fn display_path(path: &ImportPath, raw: bool) -> String {
    if raw {
        return path.to_string();
    }
    match path {
        ImportPath::Url(url) => match url.strip_prefix("file:///") {
            Some(local) => format!("Local {local}"),
            None => url.clone(),
        },
        marker => marker.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(path: ImportPath, imports: Vec<TreeNode>) -> TreeNode {
        TreeNode { path, imports }
    }

    fn url(text: &str) -> ImportPath {
        ImportPath::Url(text.to_string())
    }

    #[test]
    fn test_render_shapes_the_tree() {
        let report = DependencyReport {
            tree: vec![node(
                url("file:///proj/mod.ts"),
                vec![
                    node(
                        url("https://x.roost.land/std@0.75.0/fs/mod.ts"),
                        vec![node(ImportPath::Redundant, vec![])],
                    ),
                    node(ImportPath::Circular, vec![]),
                ],
            )],
            circular: true,
            count: 2,
            errors: vec![],
        };

        let rendered = render(&report, false);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines,
            vec![
                "└─Local proj/mod.ts",
                "  ├─https://x.roost.land/std@0.75.0/fs/mod.ts",
                "  │ └─[Redundant]",
                "  └─[Circular]",
            ]
        );
    }

    #[test]
    fn test_raw_render_keeps_canonical_urls() {
        let report = DependencyReport {
            tree: vec![node(url("file:///proj/mod.ts"), vec![])],
            circular: false,
            count: 1,
            errors: vec![],
        };

        assert_eq!(render(&report, true), "└─file:///proj/mod.ts\n");
    }

    #[test]
    fn test_error_markers_keep_their_detail() {
        let report = DependencyReport {
            tree: vec![node(
                url("file:///proj/mod.ts"),
                vec![node(
                    ImportPath::Error("failed to fetch x: unexpected status 404".to_string()),
                    vec![],
                )],
            )],
            circular: false,
            count: 2,
            errors: vec![],
        };

        let rendered = render(&report, false);
        assert!(rendered.contains("[Error: failed to fetch x: unexpected status 404]"));
    }
}
