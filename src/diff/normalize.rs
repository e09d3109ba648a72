//! Removes volatile details from a raw diff so two computations over the
//! same content compare byte-equal.
use regex::Regex;
use std::{path::Path, sync::LazyLock};

/// Label substituted for the installed package root.
pub const PUBLISHED_LABEL: &str = "published";
/// Label substituted for any other occurrence of the sandbox path.
pub const SANDBOX_LABEL: &str = "<tmp>";

static HEADER_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^((?:---|\+\+\+) [^\t\n]+)\t\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(?:\.\d+)?(?: [+-]\d{4})?$",
    )
    .unwrap()
});

/// Locations that appear in the raw diff and the stable labels they map to.
#[derive(Debug)]
pub struct PathLabels<'a> {
    pub sandbox: &'a Path,
    pub published: &'a Path,
    pub repository: &'a Path,
    pub repository_label: &'a str,
}

/// Strip trailing whitespace from every line. Each line, including the last,
/// ends with a single newline.
pub fn trim_trailing_whitespace(content: &str) -> String {
    let mut trimmed = String::with_capacity(content.len());

    for line in content.lines() {
        trimmed.push_str(line.trim_end());
        trimmed.push('\n');
    }

    trimmed
}

/// Replace header timestamps and absolute paths with stable placeholders.
pub fn normalize(raw: &str, labels: &PathLabels) -> String {
    let stripped = HEADER_TIMESTAMP.replace_all(raw, "${1}");

    // the installed package lives inside the sandbox, so it goes first
    stripped
        .replace(&path_string(labels.published), PUBLISHED_LABEL)
        .replace(&path_string(labels.repository), labels.repository_label)
        .replace(&path_string(labels.sandbox), SANDBOX_LABEL)
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels<'a>(
        sandbox: &'a Path,
        published: &'a Path,
        repository: &'a Path,
    ) -> PathLabels<'a> {
        PathLabels {
            sandbox,
            published,
            repository,
            repository_label: "packages/sdk",
        }
    }

    #[test]
    fn strips_header_timestamps_and_paths() {
        let raw = "--- /tmp/prerelease-abc/node_modules/sdk/index.js\t2024-05-01 10:11:12.123456789 +0200\n\
+++ /work/repo/packages/sdk/index.js\t2024-06-01 08:00:00.000000000 +0000\n\
@@ -1 +1 @@\n\
-a\n\
+b\n";

        let sandbox = Path::new("/tmp/prerelease-abc");
        let published = Path::new("/tmp/prerelease-abc/node_modules/sdk");
        let repository = Path::new("/work/repo/packages/sdk");

        let normalized =
            normalize(raw, &labels(sandbox, published, repository));

        assert_eq!(
            normalized,
            "--- published/index.js\n+++ packages/sdk/index.js\n@@ -1 +1 @@\n-a\n+b\n"
        );
    }

    #[test]
    fn different_sandboxes_normalize_identically() {
        let first = "--- /tmp/a1/node_modules/sdk/x.js\t2024-01-01 00:00:00.1 +0000\n";
        let second = "--- /tmp/b2/node_modules/sdk/x.js\t2025-02-02 11:11:11.2 -0500\n";
        let repository = Path::new("/repo/packages/sdk");

        let one = normalize(
            first,
            &labels(
                Path::new("/tmp/a1"),
                Path::new("/tmp/a1/node_modules/sdk"),
                repository,
            ),
        );
        let two = normalize(
            second,
            &labels(
                Path::new("/tmp/b2"),
                Path::new("/tmp/b2/node_modules/sdk"),
                repository,
            ),
        );

        assert_eq!(one, two);
    }

    #[test]
    fn leaves_body_timestamps_alone() {
        let raw = "+const built = \"2024-01-01 00:00:00\";\n";
        let normalized = normalize(
            raw,
            &labels(Path::new("/t"), Path::new("/t/p"), Path::new("/r")),
        );

        assert_eq!(normalized, raw);
    }

    #[test]
    fn trims_trailing_whitespace_per_line() {
        assert_eq!(trim_trailing_whitespace("a  \nb\t\n\nc"), "a\nb\n\nc\n");
    }
}
