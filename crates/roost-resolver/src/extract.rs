//! Static import extraction.
//!
//! Scans module source text for the specifier strings of static `import`
//! and `export ... from` declarations, in source order. Dynamic
//! `import(...)` expressions cannot be resolved statically and are
//! ignored, as is anything that does not parse as an import declaration:
//! extraction never fails, it just returns what it found.

use once_cell::sync::Lazy;
use regex::Regex;

static STATIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*(?:import|export)\s+(?:[\w*\s{},$]*?from\s+)?["']([^"'\n]+)["']"#)
        .expect("static import pattern is valid")
});

/// Extract the raw specifier strings statically referenced by `source`
pub fn extract_imports(source: &str) -> Vec<String> {
    STATIC_IMPORT
        .captures_iter(source)
        .map(|captures| captures[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_forms() {
        let source = r#"
import defaultExport from "./a.ts";
import * as ns from "./b.ts";
import { one, two } from "./c.ts";
import type { Shape } from "./d.ts";
import "./side-effect.ts";
export { three } from "./e.ts";
export * from "./f.ts";
"#;
        assert_eq!(
            extract_imports(source),
            vec![
                "./a.ts",
                "./b.ts",
                "./c.ts",
                "./d.ts",
                "./side-effect.ts",
                "./e.ts",
                "./f.ts",
            ]
        );
    }

    #[test]
    fn test_source_order_is_preserved() {
        let source = "import z from \"./z.ts\";\nimport a from './a.ts';\n";
        assert_eq!(extract_imports(source), vec!["./z.ts", "./a.ts"]);
    }

    #[test]
    fn test_multiline_import() {
        let source = "import {\n  parse,\n  stringify,\n} from \"https://x.roost.land/yaml@1.0.0/mod.ts\";\n";
        assert_eq!(
            extract_imports(source),
            vec!["https://x.roost.land/yaml@1.0.0/mod.ts"]
        );
    }

    #[test]
    fn test_dynamic_and_commented_imports_are_skipped() {
        let source = r#"
// import hidden from "./hidden.ts";
const lazy = await import("./lazy.ts");
export const name = "not an import";
"#;
        assert!(extract_imports(source).is_empty());
    }

    #[test]
    fn test_unparseable_text_yields_nothing() {
        assert!(extract_imports("this is not typescript at all {{{").is_empty());
    }
}
