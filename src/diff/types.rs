/// Maximum number of characters of diff text embedded in a pull request.
pub const MAX_RENDER_LENGTH: usize = 60_000;

/// Normalized differences between the published package and the repository
/// folder. An empty result means no release is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Unified diff of files present on both sides.
    pub content: String,
    /// Files only present in the repository folder.
    pub added_files: Vec<String>,
    /// Files only present in the published package.
    pub deleted_files: Vec<String>,
    pub readme_changed: bool,
    pub license_changed: bool,
    /// Version of the package that was installed for the comparison.
    pub published_version: String,
}

/// Diff text capped for embedding in a pull request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiff {
    pub text: String,
    pub truncated: bool,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
            && self.added_files.is_empty()
            && self.deleted_files.is_empty()
            && !self.readme_changed
            && !self.license_changed
    }

    /// Full composed diff: added and deleted file lists, the unified diff,
    /// then README/LICENSE status. Empty when nothing differs.
    pub fn text(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut sections = vec![];

        if !self.added_files.is_empty() {
            sections.push(file_list("Added files:", "+", &self.added_files));
        }

        if !self.deleted_files.is_empty() {
            sections.push(file_list(
                "Deleted files:",
                "-",
                &self.deleted_files,
            ));
        }

        if !self.content.is_empty() {
            sections.push(self.content.trim_end().to_string());
        }

        sections.push(format!(
            "README: {}\nLICENSE: {}",
            status(self.readme_changed),
            status(self.license_changed)
        ));

        let mut text = sections.join("\n\n");
        text.push('\n');
        text
    }

    /// Composed diff capped at [`MAX_RENDER_LENGTH`] characters, with a
    /// notice appended when content was cut.
    pub fn render(&self) -> RenderedDiff {
        let text = self.text();
        let total = text.chars().count();

        if total <= MAX_RENDER_LENGTH {
            return RenderedDiff {
                text,
                truncated: false,
            };
        }

        let mut capped = text.chars().take(MAX_RENDER_LENGTH).collect::<String>();

        capped.push_str(&format!(
            "\n... diff truncated: showing the first {MAX_RENDER_LENGTH} of {total} characters, see the run log for the full diff\n"
        ));

        RenderedDiff {
            text: capped,
            truncated: true,
        }
    }
}

fn file_list(heading: &str, marker: &str, files: &[String]) -> String {
    let mut lines = vec![heading.to_string()];
    lines.extend(files.iter().map(|f| format!("{marker} {f}")));
    lines.join("\n")
}

fn status(changed: bool) -> &'static str {
    if changed { "changed" } else { "unchanged" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_result_is_empty() {
        let result = DiffResult::default();
        assert!(result.is_empty());
        assert_eq!(result.text(), "");
        assert!(!result.render().truncated);
    }

    #[test]
    fn readme_change_alone_is_not_empty() {
        let result = DiffResult {
            readme_changed: true,
            ..Default::default()
        };

        assert!(!result.is_empty());
        assert_eq!(result.text(), "README: changed\nLICENSE: unchanged\n");
    }

    #[test]
    fn composes_sections_in_order() {
        let result = DiffResult {
            content: "--- published/a.js\n+++ packages/sdk/a.js\n@@ -1 +1 @@\n-1\n+2\n".into(),
            added_files: vec!["lib/new.js".into()],
            deleted_files: vec!["lib/old.js".into()],
            license_changed: true,
            ..Default::default()
        };

        let expected = "Added files:\n+ lib/new.js\n\n\
Deleted files:\n- lib/old.js\n\n\
--- published/a.js\n+++ packages/sdk/a.js\n@@ -1 +1 @@\n-1\n+2\n\n\
README: unchanged\nLICENSE: changed\n";

        assert_eq!(result.text(), expected);
    }

    #[test]
    fn truncates_long_diffs_with_notice() {
        let result = DiffResult {
            content: "+x\n".repeat(30_000),
            ..Default::default()
        };

        let full = result.text();
        assert!(full.chars().count() > MAX_RENDER_LENGTH);

        let rendered = result.render();
        assert!(rendered.truncated);
        assert!(rendered.text.starts_with(&full[..MAX_RENDER_LENGTH]));
        assert!(rendered.text.contains("diff truncated"));
        assert!(rendered.text.contains(&full.chars().count().to_string()));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let result = DiffResult {
            content: "é".repeat(MAX_RENDER_LENGTH + 10),
            ..Default::default()
        };

        let rendered = result.render();
        let kept = rendered.text.split("\n... diff truncated").next().unwrap();
        assert_eq!(kept.chars().count(), MAX_RENDER_LENGTH);
    }
}
