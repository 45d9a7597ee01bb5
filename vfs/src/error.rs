//! Error types for vfs operations

use thiserror::Error;

/// Result type for vfs operations
pub type VfsResult<T> = Result<T, VfsError>;

/// Structural failure of a single tree operation.
///
/// None of these are retried; they propagate to whoever drove the operation.
#[derive(Error, Debug)]
pub enum VfsError {
    /// File or directory not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The parent directory of the target path does not exist
    #[error("Parent directory {parent} not found for {path}")]
    ParentNotFound { path: String, parent: String },

    /// The path is already taken by a file or a directory
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Directory still has children
    #[error("Directory not empty: {0}")]
    DirectoryNotEmpty(String),

    /// The root directory cannot be replaced or removed
    #[error("Operation not permitted on the root directory")]
    RootDirectory,

    /// Snapshot text is not a valid serialized node list
    #[error("Invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

impl VfsError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "VFS_NOT_FOUND",
            Self::ParentNotFound { .. } => "VFS_PARENT_NOT_FOUND",
            Self::AlreadyExists(_) => "VFS_ALREADY_EXISTS",
            Self::DirectoryNotEmpty(_) => "VFS_NOT_EMPTY",
            Self::RootDirectory => "VFS_ROOT",
            Self::Json(_) => "VFS_INVALID_SNAPSHOT",
        }
    }
}

/// Failure to connect an import specifier to a tree entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Cannot resolve import '{specifier}' from {}: no file at {candidate}", importer.as_deref().unwrap_or("<entry>"))]
    UnresolvedImport {
        specifier: String,
        importer: Option<String>,
        candidate: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(VfsError::NotFound("/a".into()).code(), "VFS_NOT_FOUND");
        assert_eq!(VfsError::RootDirectory.code(), "VFS_ROOT");
    }

    #[test]
    fn test_unresolved_message() {
        let err = ResolveError::UnresolvedImport {
            specifier: "@/widget/missing".into(),
            importer: Some("/src/widget/index.tsx".into()),
            candidate: "/src/widget/missing".into(),
        };
        let message = err.to_string();
        assert!(message.contains("@/widget/missing"));
        assert!(message.contains("/src/widget/index.tsx"));

        let err = ResolveError::UnresolvedImport {
            specifier: "./x".into(),
            importer: None,
            candidate: "/x".into(),
        };
        assert!(err.to_string().contains("<entry>"));
    }
}
