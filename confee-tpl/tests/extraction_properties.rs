//! Property-based and parameterized tests for sentinel extraction.
//!
//! The properties pin down the contract the rest of the toolchain leans on:
//! every marked region is lifted exactly once, marker-free text passes
//! through untouched, and re-extracting a skeleton finds nothing.

use confee_tpl::extract;
use proptest::prelude::*;
use rstest::rstest;

/// Region bodies that cannot collide with any marker or trim pattern.
fn body() -> impl Strategy<Value = String> {
    "[a-su-z0-9 ]{1,30}".prop_map(|s| s.trim().to_string())
}

/// Filler text safe to leave between regions.
fn filler() -> impl Strategy<Value = String> {
    "[a-su-z0-9 \n]{0,20}"
}

proptest! {
    #[test]
    fn every_region_is_lifted_exactly_once(bodies in prop::collection::vec(body(), 0..6),
                                           gaps in prop::collection::vec(filler(), 6)) {
        let mut source = String::new();
        for (i, region) in bodies.iter().enumerate() {
            source.push_str(&gaps[i]);
            source.push_str("{/*\n");
            source.push_str(region);
            source.push_str("\ntpl*/}");
        }
        source.push_str(&gaps[bodies.len()]);

        let result = extract(&source, "page.tsx").expect("extracts");

        prop_assert_eq!(result.templates.len(), bodies.len());
        prop_assert!(result.prescripts.is_empty());
        for (i, region) in bodies.iter().enumerate() {
            prop_assert_eq!(result.templates[i].as_str(), region.trim());
        }
        for token in result.templates.keys() {
            prop_assert!(result.skeleton.contains(token));
        }
        let opener_left_behind = result.skeleton.contains("{/*");
        prop_assert!(!opener_left_behind, "skeleton still holds a marker opener");
    }

    #[test]
    fn marker_free_text_is_untouched(source in "[a-su-z0-9 \n.;(){}]{0,120}") {
        let result = extract(&source, "module.ts").expect("extracts");
        prop_assert_eq!(result.skeleton, source);
        prop_assert!(result.prescripts.is_empty());
        prop_assert!(result.templates.is_empty());
    }

    #[test]
    fn extraction_is_idempotent(bodies in prop::collection::vec(body(), 0..4)) {
        let mut source = String::from("header\n");
        for region in &bodies {
            source.push_str("confee.tpl(`\n");
            source.push_str(region);
            source.push_str("\ntpl`)\n");
        }

        let first = extract(&source, "routes.ts").expect("extracts");
        let second = extract(&first.skeleton, "routes.ts").expect("extracts");

        prop_assert_eq!(&second.skeleton, &first.skeleton);
        prop_assert!(second.templates.is_empty());
    }

    #[test]
    fn prescripts_are_lowered_on_capture(name in "[a-z]{1,8}", value in 0u32..10_000) {
        let source = format!(
            "confee.preTpl();\nconst {}: number = {};\nconfee.preTplEnd();\n",
            name, value
        );
        let result = extract(&source, "routes.ts").expect("extracts");

        prop_assert_eq!(result.prescripts.len(), 1);
        let lowered = format!("var {} = {};", name, value);
        prop_assert_eq!(result.prescripts[0].as_str(), lowered.as_str());
    }
}

#[rstest]
#[case::call_prescript("confee.preTpl();\nbody\nconfee.preTplEnd();", "page.tsx", true)]
#[case::bare_prescript("confee.preTpl\nbody\nconfee.preTplEnd", "page.tsx", true)]
#[case::markup_comment("<!--\nbody\n tpl-->", "page.vue", false)]
#[case::jsx_comment("{/*\nbody\ntpl*/}", "page.tsx", false)]
#[case::doc_comment("/**\nbody\ntpl*/", "page.tsx", false)]
#[case::call_template("confee.tpl(`\nbody\ntpl`)", "page.tsx", false)]
fn test_each_marker_style_routes_to_its_table(
    #[case] source: &str,
    #[case] file: &str,
    #[case] is_prescript: bool,
) {
    let result = extract(source, file).expect("extracts");
    if is_prescript {
        assert_eq!(result.prescripts.len(), 1);
        assert!(result.templates.is_empty());
        assert_eq!(result.prescripts[0], "body");
    } else {
        assert_eq!(result.templates.len(), 1);
        assert!(result.prescripts.is_empty());
        assert_eq!(result.templates[0], "body");
    }
}

#[rstest]
#[case("page.vue", 1)]
#[case("page.tsx", 0)]
#[case("page.ts", 0)]
#[case("page", 0)]
fn test_markup_comment_rule_is_extension_gated(#[case] file: &str, #[case] expected: usize) {
    let result = extract("<!--\nbody\n tpl-->", file).expect("extracts");
    assert_eq!(result.templates.len(), expected);
}

#[test]
fn test_identical_regions_get_distinct_tokens() {
    let source = "{/*\nsame\ntpl*/}\n{/*\nsame\ntpl*/}\n";
    let result = extract(source, "page.tsx").expect("extracts");

    assert_eq!(result.templates.len(), 2);
    let tokens: Vec<&String> = result.templates.keys().collect();
    assert_ne!(tokens[0], tokens[1]);
    assert!(result.skeleton.contains(tokens[0].as_str()));
    assert!(result.skeleton.contains(tokens[1].as_str()));
}

#[test]
fn test_prescripts_extract_before_templates() {
    let source = concat!(
        "confee.preTpl();\nconst n: number = 1;\nconfee.preTplEnd();\n",
        "confee.tpl(`\n<%- n %>\ntpl`)\n",
    );
    let result = extract(source, "routes.ts").expect("extracts");

    assert_eq!(result.prescripts.len(), 1);
    assert_eq!(result.templates.len(), 1);
    assert_eq!(result.prescripts[0], "var n = 1;");
    assert_eq!(result.templates[0], "<%- n %>");
}
