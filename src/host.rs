//! Interfaces to the host environment.
//!
//! The rendering pipeline, drag library, modal UI and file I/O all live on
//! the host side; the core consumes them through the narrow traits below
//! (plus [`crate::document::DocumentStore`] for the text buffer). Failures
//! crossing these seams are absorbed at the call site. The worst visible
//! symptom of a failed collaborator is a missing image or an empty search
//! result, never an error dialog or a corrupted document.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("query failed: {0}")]
    Query(String),
    #[error("metadata unavailable for '{0}'")]
    Metadata(String),
}

/// Link resolution and frontmatter lookup, used to turn an internal link
/// into the image named by the configured frontmatter property.
pub trait MetadataSource {
    /// Resolve a link target to a file identifier, if the file exists.
    fn resolve_link(&self, path: &str) -> Option<String>;

    /// Read one frontmatter property of a resolved file.
    fn frontmatter_value(&self, file: &str, property: &str) -> Option<String>;
}

/// External query collaborator producing candidate names for the
/// search-insert workflow. Optional: hosts without one simply omit the
/// query-dependent actions.
pub trait NameQuery {
    fn query_names(&self, from: &str, where_expr: &str) -> Result<Vec<String>, BoardError>;
}

/// Run a name query, treating failure as zero results.
pub fn run_query(query: &dyn NameQuery, from: &str, where_expr: &str) -> Vec<String> {
    match query.query_names(from, where_expr) {
        Ok(names) => names,
        Err(err) => {
            log::warn!("name query '{from}' / '{where_expr}' failed: {err}");
            Vec::new()
        }
    }
}

/// Metadata source with no files, for hosts (and tests) without a vault.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataSource for NoMetadata {
    fn resolve_link(&self, _path: &str) -> Option<String> {
        None
    }

    fn frontmatter_value(&self, _file: &str, _property: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingQuery;

    impl NameQuery for FailingQuery {
        fn query_names(&self, _from: &str, _where_expr: &str) -> Result<Vec<String>, BoardError> {
            Err(BoardError::Query("syntax error near WHERE".to_string()))
        }
    }

    struct FixedQuery(Vec<String>);

    impl NameQuery for FixedQuery {
        fn query_names(&self, _from: &str, _where_expr: &str) -> Result<Vec<String>, BoardError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_query_failure_yields_empty() {
        assert!(run_query(&FailingQuery, "#albums", "rating > 3").is_empty());
    }

    #[test]
    fn test_query_success_passes_through() {
        let q = FixedQuery(vec!["Alpha".to_string(), "Beta".to_string()]);
        assert_eq!(run_query(&q, "", ""), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_no_metadata_resolves_nothing() {
        assert_eq!(NoMetadata.resolve_link("Note"), None);
        assert_eq!(NoMetadata.frontmatter_value("Note", "Image"), None);
    }
}
