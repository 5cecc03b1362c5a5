//! Canonical build file output.

use crate::core::{AttrValue, LoadInfo, Rule, RuleFile};

const INDENT: &str = "    ";

/// Render a build file in canonical form.
///
/// Loads come first, sorted by label; rules follow in file order separated
/// by blank lines. Comments are written above the statement they belong to.
pub fn format(file: &RuleFile) -> String {
    let mut out = String::new();

    let mut loads: Vec<&LoadInfo> = file.loads().iter().collect();
    loads.sort_by(|a, b| a.name.cmp(&b.name));
    for load in &loads {
        push_comments(&mut out, &load.comments);
        out.push_str("load(");
        out.push_str(&quote(&load.name));
        for symbol in &load.symbols {
            out.push_str(", ");
            out.push_str(&quote(symbol));
        }
        out.push_str(")\n");
    }

    for (i, rule) in file.rules().iter().enumerate() {
        if i > 0 || !loads.is_empty() {
            out.push('\n');
        }
        format_rule(rule, &mut out);
    }

    if !file.trailing_comments().is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        push_comments(&mut out, file.trailing_comments());
    }

    out
}

fn format_rule(rule: &Rule, out: &mut String) {
    push_comments(out, rule.comments());
    out.push_str(rule.kind());
    if rule.args().is_empty() && rule.name().is_empty() && rule.attrs().next().is_none() {
        out.push_str("()\n");
        return;
    }

    out.push_str("(\n");
    for arg in rule.args() {
        out.push_str(INDENT);
        out.push_str(arg);
        out.push_str(",\n");
    }
    if !rule.name().is_empty() {
        push_attr(out, "name", &AttrValue::String(rule.name().to_string()));
    }
    for (key, value) in rule.attrs() {
        push_attr(out, key, value);
    }
    out.push_str(")\n");
}

fn push_comments(out: &mut String, comments: &[String]) {
    for comment in comments {
        out.push_str(comment);
        out.push('\n');
    }
}

fn push_attr(out: &mut String, key: &str, value: &AttrValue) {
    out.push_str(INDENT);
    out.push_str(key);
    out.push_str(" = ");
    match value {
        AttrValue::String(s) => out.push_str(&quote(s)),
        AttrValue::Raw(text) => out.push_str(text),
        AttrValue::List(items) if items.is_empty() => out.push_str("[]"),
        AttrValue::List(items) if items.len() == 1 => {
            out.push('[');
            out.push_str(&quote(&items[0]));
            out.push(']');
        }
        AttrValue::List(items) => {
            out.push_str("[\n");
            for item in items {
                out.push_str(INDENT);
                out.push_str(INDENT);
                out.push_str(&quote(item));
                out.push_str(",\n");
            }
            out.push_str(INDENT);
            out.push(']');
        }
    }
    out.push_str(",\n");
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_file::parser::parse;
    use std::path::Path;

    #[test]
    fn test_canonical_layout() {
        let mut rule = Rule::new("go_mod", "go_mod_dir");
        rule.set_attr("module_path", "example.com/demo");
        rule.set_attr("go_mod", ":go.mod");
        rule.set_attr(
            "deps",
            vec!["//pkg/a:lib1".to_string(), "//pkg/b:lib2".to_string()],
        );
        rule.set_attr("visibility", vec!["//visibility:public".to_string()]);

        let file = RuleFile::from_parts(
            "BUILD.bazel",
            vec![LoadInfo::new("//rules/go_mod:go_mod.bzl", vec!["go_mod".to_string()])],
            vec![Rule::new("go_library", "lib"), rule],
        );

        let expected = r#"load("//rules/go_mod:go_mod.bzl", "go_mod")

go_library(
    name = "lib",
)

go_mod(
    name = "go_mod_dir",
    module_path = "example.com/demo",
    go_mod = ":go.mod",
    deps = [
        "//pkg/a:lib1",
        "//pkg/b:lib2",
    ],
    visibility = ["//visibility:public"],
)
"#;
        assert_eq!(format(&file), expected);
    }

    #[test]
    fn test_comments_and_foreign_constructs_survive() {
        let source = r#"# owned by the platform team
load("@io_bazel_rules_go//go:def.bzl", "go_library")

package(default_visibility = ["//visibility:public"])

exports_files(["go.mod"])

# the core library
go_library(
    name = "lib",
    srcs = glob(["*.go"]),  # every source
    cgo = True,
)

# end of file
"#;
        let file = parse(source, Path::new("BUILD.bazel")).unwrap();
        let expected = r#"# owned by the platform team
load("@io_bazel_rules_go//go:def.bzl", "go_library")

package(
    default_visibility = ["//visibility:public"],
)

exports_files(
    ["go.mod"],
)

# the core library
# every source
go_library(
    name = "lib",
    srcs = glob(["*.go"]),
    cgo = True,
)

# end of file
"#;
        assert_eq!(format(&file), expected);

        let again = parse(expected, Path::new("BUILD.bazel")).unwrap();
        assert_eq!(format(&again), expected);
    }

    #[test]
    fn test_empty_call_stays_on_one_line() {
        let file = RuleFile::from_parts("BUILD", Vec::new(), vec![Rule::new("licenses", "")]);
        assert_eq!(format(&file), "licenses()\n");
    }

    #[test]
    fn test_output_parses_back() {
        let mut rule = Rule::new("go_library", "we\"ird");
        rule.set_attr("srcs", Vec::<String>::new());
        rule.set_attr("importpath", "a\\b");
        let file = RuleFile::from_parts("BUILD", Vec::new(), vec![rule]);

        let text = format(&file);
        let reparsed = parse(&text, Path::new("BUILD")).unwrap();
        assert_eq!(reparsed, file);
        assert_eq!(format(&reparsed), text);
    }
}
