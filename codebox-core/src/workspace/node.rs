use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of a node. Paths shift under renames and moves;
/// consumers that outlive a structural change (open tabs, output caches)
/// track ids and re-fetch. Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One entry in the workspace arena. `path` is the cached canonical
/// location; the store recomputes it for the whole subtree on every
/// structural change.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub path: String,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

/// The closed two-variant union. Every consumption site matches
/// exhaustively; there is no third case to forget.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    File {
        language: Language,
        content: String,
        /// False when content has diverged from the last explicit save.
        saved: bool,
    },
    Folder {
        /// Insertion order is creation order.
        children: Vec<NodeId>,
    },
}

impl Node {
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    pub fn language(&self) -> Option<Language> {
        match &self.kind {
            NodeKind::File { language, .. } => Some(*language),
            NodeKind::Folder { .. } => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { content, .. } => Some(content),
            NodeKind::Folder { .. } => None,
        }
    }

    pub fn saved(&self) -> Option<bool> {
        match &self.kind {
            NodeKind::File { saved, .. } => Some(*saved),
            NodeKind::Folder { .. } => None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Folder { children } => children,
            NodeKind::File { .. } => &[],
        }
    }
}
