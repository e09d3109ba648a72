//! File tree comparison between the installed package and the repository
//! folder.
use chrono::{DateTime, Local};
use similar::TextDiff;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

use crate::{Result, diff::normalize::trim_trailing_whitespace};

/// Manifest excluded from the comparison; its metadata is registry-injected.
pub const MANIFEST_FILE: &str = "package.json";

const CONTEXT_LINES: usize = 3;
const SKIPPED_DIRS: [&str; 2] = ["node_modules", ".git"];

/// Raw comparison output. `raw_diff` still contains absolute paths and
/// timestamps in its headers.
#[derive(Debug, Default)]
pub struct TreeComparison {
    pub raw_diff: String,
    pub added_files: Vec<String>,
    pub deleted_files: Vec<String>,
    pub readme_changed: bool,
    pub license_changed: bool,
}

#[derive(Debug, Default)]
struct Listing {
    /// Relative path (forward slashes) to absolute path.
    files: BTreeMap<String, PathBuf>,
    /// Top-level README variants, keyed by file name.
    readmes: BTreeMap<String, PathBuf>,
    /// Top-level LICENSE variants, keyed by file name.
    licenses: BTreeMap<String, PathBuf>,
}

fn is_readme(name: &str) -> bool {
    let lower = name.to_lowercase();
    matches!(
        lower.as_str(),
        "readme" | "readme.md" | "readme.markdown" | "readme.txt"
    )
}

fn is_license(name: &str) -> bool {
    let lower = name.to_lowercase();
    let stem = lower.split('.').next().unwrap_or_default();
    matches!(stem, "license" | "licence")
        && lower.split('.').count() <= 2
}

fn list_files(root: &Path) -> Result<Listing> {
    let mut listing = Listing::default();

    let walker = WalkDir::new(root).sort_by_file_name().into_iter();

    for entry in walker.filter_entry(|e| {
        e.depth() == 0
            || !(e.file_type().is_dir()
                && SKIPPED_DIRS.iter().any(|d| e.file_name() == *d))
    }) {
        let entry = entry?;

        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<String>>()
            .join("/");

        if entry.depth() == 1 {
            if rel == MANIFEST_FILE {
                continue;
            }

            if is_readme(&rel) {
                listing.readmes.insert(rel, entry.path().to_path_buf());
                continue;
            }

            if is_license(&rel) {
                listing.licenses.insert(rel, entry.path().to_path_buf());
                continue;
            }
        }

        listing.files.insert(rel, entry.path().to_path_buf());
    }

    Ok(listing)
}

enum FileContents {
    Text(String),
    Binary(Vec<u8>),
}

fn read_contents(path: &Path) -> Result<FileContents> {
    let bytes = fs::read(path)?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(FileContents::Text(trim_trailing_whitespace(&text))),
        Err(err) => Ok(FileContents::Binary(err.into_bytes())),
    }
}

fn files_differ(left: Option<&PathBuf>, right: Option<&PathBuf>) -> Result<bool> {
    match (left, right) {
        (None, None) => Ok(false),
        (Some(left), Some(right)) => {
            match (read_contents(left)?, read_contents(right)?) {
                (FileContents::Text(l), FileContents::Text(r)) => Ok(l != r),
                (FileContents::Binary(l), FileContents::Binary(r)) => {
                    Ok(l != r)
                }
                _ => Ok(true),
            }
        }
        _ => Ok(true),
    }
}

/// True when any file present on either side differs or is missing from the
/// other side.
fn any_differ(
    old: &BTreeMap<String, PathBuf>,
    new: &BTreeMap<String, PathBuf>,
) -> Result<bool> {
    for name in old.keys().chain(new.keys()) {
        if files_differ(old.get(name), new.get(name))? {
            return Ok(true);
        }
    }

    Ok(false)
}

fn header(path: &Path) -> Result<String> {
    let modified: DateTime<Local> = fs::metadata(path)?.modified()?.into();

    Ok(format!(
        "{}\t{}",
        path.display(),
        modified.format("%Y-%m-%d %H:%M:%S%.9f %z")
    ))
}

fn file_diff(old: &Path, new: &Path) -> Result<Option<String>> {
    match (read_contents(old)?, read_contents(new)?) {
        (FileContents::Text(old_text), FileContents::Text(new_text)) => {
            if old_text == new_text {
                return Ok(None);
            }

            let diff = TextDiff::from_lines(&old_text, &new_text);

            Ok(Some(
                diff.unified_diff()
                    .context_radius(CONTEXT_LINES)
                    .header(&header(old)?, &header(new)?)
                    .to_string(),
            ))
        }
        (FileContents::Binary(old_bytes), FileContents::Binary(new_bytes))
            if old_bytes == new_bytes =>
        {
            Ok(None)
        }
        _ => Ok(Some(format!(
            "Binary files {} and {} differ\n",
            old.display(),
            new.display()
        ))),
    }
}

/// Compare the installed package (`published`) with the repository folder
/// (`repository`).
pub fn compare(published: &Path, repository: &Path) -> Result<TreeComparison> {
    let old = list_files(published)?;
    let new = list_files(repository)?;

    let mut comparison = TreeComparison {
        readme_changed: any_differ(&old.readmes, &new.readmes)?,
        license_changed: any_differ(&old.licenses, &new.licenses)?,
        ..Default::default()
    };

    for (rel, old_path) in old.files.iter() {
        match new.files.get(rel) {
            None => comparison.deleted_files.push(rel.clone()),
            Some(new_path) => {
                if let Some(diff) = file_diff(old_path, new_path)? {
                    comparison.raw_diff.push_str(&diff);
                }
            }
        }
    }

    comparison.added_files = new
        .files
        .keys()
        .filter(|rel| !old.files.contains_key(*rel))
        .cloned()
        .collect();

    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let published = tmp.path().join("published");
        let repository = tmp.path().join("repository");
        fs::create_dir_all(&published).unwrap();
        fs::create_dir_all(&repository).unwrap();
        (tmp, published, repository)
    }

    #[test]
    fn identical_trees_have_no_differences() {
        let (_tmp, published, repository) = fixture();
        for root in [&published, &repository] {
            write(root, "index.js", b"module.exports = 1;\n");
            write(root, "README.md", b"# sdk\n");
        }

        let comparison = compare(&published, &repository).unwrap();

        assert!(comparison.raw_diff.is_empty());
        assert!(comparison.added_files.is_empty());
        assert!(comparison.deleted_files.is_empty());
        assert!(!comparison.readme_changed);
        assert!(!comparison.license_changed);
    }

    #[test]
    fn ignores_manifest_and_trailing_whitespace() {
        let (_tmp, published, repository) = fixture();
        write(&published, "package.json", br#"{"version":"1.0.0","_id":"x"}"#);
        write(&repository, "package.json", br#"{"version":"1.0.0"}"#);
        write(&published, "index.js", b"a = 1;\nb = 2;\n");
        write(&repository, "index.js", b"a = 1;   \nb = 2;\t\n");

        let comparison = compare(&published, &repository).unwrap();

        assert!(comparison.raw_diff.is_empty());
    }

    #[test]
    fn nested_manifests_are_compared() {
        let (_tmp, published, repository) = fixture();
        write(&published, "templates/package.json", b"{}\n");
        write(&repository, "templates/package.json", b"{\"a\":1}\n");

        let comparison = compare(&published, &repository).unwrap();

        assert!(comparison.raw_diff.contains("templates/package.json"));
    }

    #[test]
    fn splits_added_and_deleted_files() {
        let (_tmp, published, repository) = fixture();
        write(&published, "lib/old.js", b"old\n");
        write(&published, "lib/shared.js", b"1\n");
        write(&repository, "lib/new.js", b"new\n");
        write(&repository, "lib/shared.js", b"2\n");

        let comparison = compare(&published, &repository).unwrap();

        assert_eq!(comparison.added_files, vec!["lib/new.js".to_string()]);
        assert_eq!(comparison.deleted_files, vec!["lib/old.js".to_string()]);
        assert!(!comparison.raw_diff.contains("old.js"));
        assert!(!comparison.raw_diff.contains("new.js"));
        assert!(comparison.raw_diff.contains("-1\n+2\n"));
    }

    #[test]
    fn readme_and_license_reported_separately() {
        let (_tmp, published, repository) = fixture();
        write(&published, "README.md", b"# old\n");
        write(&repository, "README.md", b"# new\n");
        write(&repository, "LICENSE", b"MIT\n");

        let comparison = compare(&published, &repository).unwrap();

        assert!(comparison.readme_changed);
        assert!(comparison.license_changed);
        assert!(comparison.raw_diff.is_empty());
        assert!(comparison.added_files.is_empty());
    }

    #[test]
    fn every_readme_variant_is_compared() {
        let (_tmp, published, repository) = fixture();
        write(&published, "README.md", b"old\n");
        write(&repository, "README.md", b"new\n");
        for root in [&published, &repository] {
            write(root, "README.txt", b"same\n");
            write(root, "LICENSE", b"MIT\n");
        }

        let comparison = compare(&published, &repository).unwrap();

        assert!(comparison.readme_changed);
        assert!(!comparison.license_changed);
        assert!(comparison.raw_diff.is_empty());
        assert!(comparison.added_files.is_empty());
    }

    #[test]
    fn license_variant_missing_on_one_side_is_a_change() {
        let (_tmp, published, repository) = fixture();
        for root in [&published, &repository] {
            write(root, "LICENSE", b"MIT\n");
        }
        write(&published, "LICENSE.md", b"MIT\n");

        let comparison = compare(&published, &repository).unwrap();

        assert!(comparison.license_changed);
        assert!(comparison.deleted_files.is_empty());
    }

    #[test]
    fn skips_node_modules() {
        let (_tmp, published, repository) = fixture();
        write(&repository, "node_modules/dep/index.js", b"x\n");

        let comparison = compare(&published, &repository).unwrap();

        assert!(comparison.added_files.is_empty());
    }

    #[test]
    fn binary_files_reported_without_content() {
        let (_tmp, published, repository) = fixture();
        write(&published, "logo.png", &[0x89, 0x50, 0xff, 0x00]);
        write(&repository, "logo.png", &[0x89, 0x50, 0xfe, 0x00]);

        let comparison = compare(&published, &repository).unwrap();

        assert!(comparison.raw_diff.starts_with("Binary files "));
        assert!(comparison.raw_diff.ends_with(" differ\n"));
    }
}
