use thiserror::Error;

/// Structural violations reported by the workspace store. A failed
/// operation never mutates the tree; callers surface the message and move
/// on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    #[error("'{0}' already exists here")]
    NameTaken(String),

    #[error("no folder at '{0}'")]
    FolderNotFound(String),

    #[error("no such path '{0}'")]
    NotFound(String),

    #[error("unsupported file type '.{0}'")]
    UnsupportedExtension(String),

    #[error("cannot move '{0}' into its own subtree")]
    MoveIntoSelf(String),

    #[error("the workspace root cannot be renamed, moved, or deleted")]
    RootImmutable,
}
