//! Node path handling.
//!
//! Paths are absolute, `/` separated, and made of node names. The root node
//! has the path `/`.

use crate::error::{CriError, Result};

/// Path of the root node.
pub const ROOT_PATH: &str = "/";

/// Check that `name` is usable as a single node name.
pub fn validate_node_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CriError::InvalidNodePath("empty node name".to_string()));
    }
    if !name
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(CriError::InvalidNodePath(format!(
            "invalid node name {name:?}: only ASCII letters, digits, '-' and '_' are allowed"
        )));
    }
    Ok(())
}

/// Normalize a path to its absolute form.
///
/// Leading, trailing and repeated separators are ignored, so `sites/demo/`
/// and `/sites//demo` both become `/sites/demo`.
pub fn normalize(path: &str) -> Result<String> {
    let segments = segments(path)?;
    if segments.is_empty() {
        return Ok(ROOT_PATH.to_string());
    }
    Ok(format!("/{}", segments.join("/")))
}

/// Split a path into validated node names.
pub fn segments(path: &str) -> Result<Vec<&str>> {
    let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
    for part in &parts {
        validate_node_name(part)?;
    }
    Ok(parts)
}

/// Path of the child `name` below `parent`.
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT_PATH {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Parent path of an absolute, normalized path.
pub fn parent(path: &str) -> Option<&str> {
    if path == ROOT_PATH {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some(ROOT_PATH),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_handles_separators() {
        assert_eq!(normalize("sites/demo/").unwrap(), "/sites/demo");
        assert_eq!(normalize("/sites//demo").unwrap(), "/sites/demo");
        assert_eq!(normalize("/").unwrap(), "/");
        assert_eq!(normalize("").unwrap(), "/");
    }

    #[test]
    fn normalize_rejects_bad_names() {
        assert!(matches!(
            normalize("/sites/de mo"),
            Err(CriError::InvalidNodePath(_))
        ));
        assert!(normalize("/sites/../etc").is_err());
    }

    #[test]
    fn join_and_parent() {
        assert_eq!(join("/", "sites"), "/sites");
        assert_eq!(join("/sites", "demo"), "/sites/demo");
        assert_eq!(parent("/sites/demo"), Some("/sites"));
        assert_eq!(parent("/sites"), Some("/"));
        assert_eq!(parent("/"), None);
    }
}
