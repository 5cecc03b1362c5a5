//! Label formatting for target references.

/// Canonical name for the root package.
pub const ROOT_PACKAGE: &str = ".";

/// Normalize a root-relative package path.
///
/// `""`, `"."`, `"/"` and `"./"` all name the root package and map to
/// [`ROOT_PACKAGE`]. Leading `./` and surrounding slashes are dropped.
pub fn canonical_package(rel: &str) -> &str {
    let trimmed = rel.trim_matches('/');
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    if trimmed.is_empty() || trimmed == "." {
        ROOT_PACKAGE
    } else {
        trimmed
    }
}

/// Format a reference to target `name` in package `target_rel`, as seen from
/// package `from_rel`.
///
/// Same-package targets use the `:name` shorthand. Everything else is fully
/// qualified as `//pkg:name` (`//:name` for the root package).
pub fn format_label(target_rel: &str, name: &str, from_rel: &str) -> String {
    let target_pkg = canonical_package(target_rel);
    if target_pkg == canonical_package(from_rel) {
        format!(":{}", name)
    } else if target_pkg == ROOT_PACKAGE {
        format!("//:{}", name)
    } else {
        format!("//{}:{}", target_pkg, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_package_uses_shorthand() {
        assert_eq!(format_label("pkg/a", "lib1", "pkg/a"), ":lib1");
        assert_eq!(format_label("pkg/a/", "lib1", "./pkg/a"), ":lib1");
    }

    #[test]
    fn test_root_package_boundary() {
        assert_eq!(format_label("", "lib", ""), ":lib");
        assert_eq!(format_label(".", "lib", ""), ":lib");
        assert_eq!(format_label("", "lib", "pkg"), "//:lib");
    }

    #[test]
    fn test_cross_package_is_fully_qualified() {
        assert_eq!(format_label("pkg/a", "lib1", ""), "//pkg/a:lib1");
        assert_eq!(format_label("pkg/a", "lib1", "pkg"), "//pkg/a:lib1");
    }
}
