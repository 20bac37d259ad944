//! Mapping request targets onto files under a document root.

use std::path::{Path, PathBuf};

use path_clean::PathClean;

/// Served when the target names a directory (ends with `/`).
pub const DEFAULT_DOCUMENT: &str = "index.html";

/// Resolves `target` against `doc_root`.
///
/// Returns the absolute, normalized path of the file to serve, or `None` if
/// the path would land outside the document root. Callers answer `None` the
/// same way as a missing file so that traversal attempts look like any other
/// 404. Existence is not checked here.
pub fn resolve_path(doc_root: &Path, target: &str) -> Option<PathBuf> {
    let mut joined = doc_root.as_os_str().to_os_string();
    joined.push(target);
    if target.ends_with('/') {
        joined.push(DEFAULT_DOCUMENT);
    }

    let candidate = absolute_clean(Path::new(&joined))?;
    let root = absolute_clean(doc_root)?;

    if candidate.starts_with(&root) {
        Some(candidate)
    } else {
        tracing::debug!(
            root = %root.display(),
            target,
            resolved = %candidate.display(),
            "Target escapes document root"
        );
        None
    }
}

fn absolute_clean(path: &Path) -> Option<PathBuf> {
    match std::path::absolute(path) {
        Ok(abs) => Some(abs.clean()),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not make path absolute");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_serves_index() {
        let resolved = resolve_path(Path::new("/srv/site"), "/").unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/site/index.html"));

        let resolved = resolve_path(Path::new("/srv/site"), "/docs/").unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/site/docs/index.html"));
    }

    #[test]
    fn dot_segments_inside_root_are_collapsed() {
        let resolved = resolve_path(Path::new("/srv/site"), "/a/./b/../c.html").unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/site/a/c.html"));

        let resolved = resolve_path(Path::new("/srv/site/"), "//a//b.txt").unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/site/a/b.txt"));
    }

    #[test]
    fn escaping_targets_are_rejected() {
        assert_eq!(resolve_path(Path::new("/srv/site"), "/../../etc/passwd"), None);
        assert_eq!(resolve_path(Path::new("/srv/site"), "/a/../../x"), None);
    }

    #[test]
    fn sibling_with_shared_prefix_is_rejected() {
        assert_eq!(resolve_path(Path::new("/srv/site"), "/../site2/secret.txt"), None);
    }

    #[test]
    fn relative_root_becomes_absolute() {
        let resolved = resolve_path(Path::new("docroot"), "/a.html").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("docroot/a.html"));
    }
}
