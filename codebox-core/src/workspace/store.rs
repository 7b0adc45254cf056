use crate::language::{extension_of, templates, Language};
use crate::persist::{keys, KvStore};
use crate::workspace::error::WorkspaceError;
use crate::workspace::node::{Node, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::warn;

const WELCOME: &str = "Welcome to Codebox!\n\n\
Pick a file in the explorer to start editing, or create your own.\n\
Hit Run to execute the active file; output appears in the terminal panel.\n";

/// Sole owner and arbiter of the file/folder tree.
///
/// Nodes live in an arena keyed by id, with parent/children recorded as id
/// references and the canonical path cached per node. The store is
/// constructed once, loads itself from the key-value store, and writes the
/// whole tree back after every successful mutation.
pub struct WorkspaceStore {
    nodes: HashMap<NodeId, Node>,
    by_path: HashMap<String, NodeId>,
    root: NodeId,
    kv: Arc<dyn KvStore>,
}

impl WorkspaceStore {
    /// Loads the tree from its fixed key, or synthesizes the default
    /// workspace when the key is absent or unparseable. Corrupt persisted
    /// data is never an error.
    pub fn load(kv: Arc<dyn KvStore>) -> Self {
        if let Some(raw) = kv.get(keys::WORKSPACE) {
            match serde_json::from_str::<PersistedTree>(&raw) {
                Ok(tree) => match Self::from_persisted(tree, kv.clone()) {
                    Some(store) => return store,
                    None => warn!("persisted workspace has no root folder, starting fresh"),
                },
                Err(e) => warn!("unparseable persisted workspace, starting fresh: {e}"),
            }
        }

        let mut store = Self::empty(kv);
        store.seed_default();
        store.persist();
        store
    }

    fn empty(kv: Arc<dyn KvStore>) -> Self {
        let root_id = NodeId::generate();
        let root = Node {
            id: root_id.clone(),
            name: String::new(),
            path: "/".to_string(),
            parent: None,
            kind: NodeKind::Folder {
                children: Vec::new(),
            },
        };
        Self {
            nodes: HashMap::from([(root_id.clone(), root)]),
            by_path: HashMap::from([("/".to_string(), root_id.clone())]),
            root: root_id,
            kv,
        }
    }

    pub fn root(&self) -> &Node {
        // the root is never removed from the arena
        self.nodes.get(&self.root).expect("workspace root missing")
    }

    // ---- creation ----

    /// Creates a file under `parent_path`. The language is derived from the
    /// extension unless supplied; unknown extensions without an explicit
    /// language are a validation error. Content seeds from the language's
    /// boilerplate and starts unsaved.
    pub fn create_file(
        &mut self,
        parent_path: &str,
        name: &str,
        language: Option<Language>,
    ) -> Result<NodeId, WorkspaceError> {
        let language = match language {
            Some(language) => language,
            None => Language::from_file_name(name).ok_or_else(|| {
                WorkspaceError::UnsupportedExtension(extension_of(name).to_string())
            })?,
        };
        let parent = self.folder_at(parent_path)?;
        self.ensure_vacant(&parent, name)?;

        let id = self.insert_child(
            &parent,
            name,
            NodeKind::File {
                language,
                content: templates::default_source(language).to_string(),
                saved: false,
            },
        );
        self.persist();
        Ok(id)
    }

    /// Creates an empty folder under `parent_path`; same collision and
    /// not-found rules as [`WorkspaceStore::create_file`].
    pub fn create_folder(
        &mut self,
        parent_path: &str,
        name: &str,
    ) -> Result<NodeId, WorkspaceError> {
        let parent = self.folder_at(parent_path)?;
        self.ensure_vacant(&parent, name)?;

        let id = self.insert_child(
            &parent,
            name,
            NodeKind::Folder {
                children: Vec::new(),
            },
        );
        self.persist();
        Ok(id)
    }

    // ---- content ----

    /// Pure lookup; `None` when the path does not resolve to a file.
    pub fn read_file(&self, path: &str) -> Option<&Node> {
        let node = self.find_by_path(path)?;
        node.is_file().then_some(node)
    }

    /// Explicit save: sets content and clears the dirty flag. False when
    /// the path does not resolve to a file.
    pub fn write_file(&mut self, path: &str, content: &str) -> bool {
        let Some(id) = self.file_id_at(path) else {
            return false;
        };
        if let Some(node) = self.nodes.get_mut(&id) {
            if let NodeKind::File { content: c, saved, .. } = &mut node.kind {
                *c = content.to_string();
                *saved = true;
            }
        }
        self.persist();
        true
    }

    /// Marks a file dirty without touching content; the editor surface
    /// calls this when live typing diverges from the last save.
    pub fn mark_file_unsaved(&mut self, path: &str) -> bool {
        let Some(id) = self.file_id_at(path) else {
            return false;
        };
        if let Some(node) = self.nodes.get_mut(&id) {
            if let NodeKind::File { saved, .. } = &mut node.kind {
                *saved = false;
            }
        }
        self.persist();
        true
    }

    /// Rewrites a file to its language's boilerplate, leaving it unsaved.
    pub fn reset_file(&mut self, path: &str) -> bool {
        let Some(id) = self.file_id_at(path) else {
            return false;
        };
        if let Some(node) = self.nodes.get_mut(&id) {
            if let NodeKind::File {
                language,
                content,
                saved,
            } = &mut node.kind
            {
                *content = templates::default_source(*language).to_string();
                *saved = false;
            }
        }
        self.persist();
        true
    }

    // ---- structure ----

    /// Renames a node. Collision with a sibling and a missing target are
    /// distinguishable errors; on success the paths of the node and every
    /// descendant are recomputed, and a file's language is re-derived from
    /// the new extension (unknown extensions fall back per
    /// [`Language::infer`]).
    pub fn rename(&mut self, path: &str, new_name: &str) -> Result<(), WorkspaceError> {
        let normalized = normalize(path);
        let id = self
            .by_path
            .get(&normalized)
            .cloned()
            .ok_or(WorkspaceError::NotFound(normalized))?;
        if id == self.root {
            return Err(WorkspaceError::RootImmutable);
        }

        let (current_name, parent) = {
            let Some(node) = self.nodes.get(&id) else {
                return Err(WorkspaceError::NotFound(path.to_string()));
            };
            (node.name.clone(), node.parent.clone())
        };
        if current_name == new_name {
            return Ok(());
        }
        if let Some(parent) = &parent {
            if self.child_by_name(parent, new_name).is_some() {
                return Err(WorkspaceError::NameTaken(new_name.to_string()));
            }
        }

        if let Some(node) = self.nodes.get_mut(&id) {
            node.name = new_name.to_string();
            if let NodeKind::File { language, .. } = &mut node.kind {
                *language = Language::infer(new_name);
            }
        }
        self.refresh_paths(&id);
        self.persist();
        Ok(())
    }

    /// Reparents a node. Rejects moves into the node's own subtree and
    /// sibling collisions at the destination; on success the subtree's
    /// paths are recomputed.
    pub fn move_node(&mut self, path: &str, new_parent_path: &str) -> Result<(), WorkspaceError> {
        let normalized = normalize(path);
        let id = self
            .by_path
            .get(&normalized)
            .cloned()
            .ok_or_else(|| WorkspaceError::NotFound(normalized.clone()))?;
        if id == self.root {
            return Err(WorkspaceError::RootImmutable);
        }
        let new_parent = self.folder_at(new_parent_path)?;
        if id == new_parent || self.is_ancestor(&id, &new_parent) {
            return Err(WorkspaceError::MoveIntoSelf(normalized));
        }

        let (name, old_parent) = {
            let Some(node) = self.nodes.get(&id) else {
                return Err(WorkspaceError::NotFound(normalized));
            };
            (node.name.clone(), node.parent.clone())
        };
        let Some(old_parent) = old_parent else {
            return Err(WorkspaceError::RootImmutable);
        };
        if old_parent == new_parent {
            return Ok(());
        }
        self.ensure_vacant(&new_parent, &name)?;

        if let Some(NodeKind::Folder { children }) =
            self.nodes.get_mut(&old_parent).map(|n| &mut n.kind)
        {
            children.retain(|c| *c != id);
        }
        if let Some(NodeKind::Folder { children }) =
            self.nodes.get_mut(&new_parent).map(|n| &mut n.kind)
        {
            children.push(id.clone());
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(new_parent);
        }
        self.refresh_paths(&id);
        self.persist();
        Ok(())
    }

    /// Removes a node; for a folder the entire subtree goes with it. False
    /// for a missing target or the root.
    pub fn delete(&mut self, path: &str) -> bool {
        let normalized = normalize(path);
        let Some(id) = self.by_path.get(&normalized).cloned() else {
            return false;
        };
        if id == self.root {
            return false;
        }

        if let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent.clone()) {
            if let Some(NodeKind::Folder { children }) =
                self.nodes.get_mut(&parent).map(|n| &mut n.kind)
            {
                children.retain(|c| *c != id);
            }
        }

        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(&id) {
                self.by_path.remove(&node.path);
                if let NodeKind::Folder { children } = node.kind {
                    stack.extend(children);
                }
            }
        }
        self.persist();
        true
    }

    // ---- lookups ----

    pub fn find_by_path(&self, path: &str) -> Option<&Node> {
        self.by_path
            .get(&normalize(path))
            .and_then(|id| self.nodes.get(id))
    }

    /// Id-addressed mirror of the path lookup. Tabs track nodes by id
    /// because a node's path can change out from under a stable id.
    pub fn find_by_id(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Ordered children of a folder; empty when the path is not a folder.
    pub fn list(&self, path: &str) -> Vec<&Node> {
        let Ok(id) = self.folder_at(path) else {
            return Vec::new();
        };
        self.nodes
            .get(&id)
            .map(|n| n.children())
            .unwrap_or_default()
            .iter()
            .filter_map(|c| self.nodes.get(c))
            .collect()
    }

    pub fn parent_of(&self, path: &str) -> Option<&Node> {
        let node = self.find_by_path(path)?;
        self.nodes.get(node.parent.as_ref()?)
    }

    pub fn is_folder(&self, path: &str) -> bool {
        self.find_by_path(path).map(Node::is_folder).unwrap_or(false)
    }

    /// Flattened recursive listing of every file, in tree order.
    pub fn all_files(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack = vec![self.root.clone()];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            match &node.kind {
                NodeKind::File { .. } => out.push(node),
                NodeKind::Folder { children } => {
                    for child in children.iter().rev() {
                        stack.push(child.clone());
                    }
                }
            }
        }
        out
    }

    /// True when any file in the tree is dirty; gates the exit warning.
    pub fn has_unsaved_changes(&self) -> bool {
        self.all_files().iter().any(|f| f.saved() == Some(false))
    }

    /// The tree exactly as persisted; hosts use it for export/backup and
    /// tests use it to assert a failed operation changed nothing.
    pub fn export(&self) -> String {
        let tree = PersistedTree {
            root: self.to_persisted(&self.root),
        };
        serde_json::to_string(&tree).unwrap_or_default()
    }

    // ---- internals ----

    fn folder_at(&self, path: &str) -> Result<NodeId, WorkspaceError> {
        let normalized = normalize(path);
        match self.by_path.get(&normalized) {
            Some(id) if self.nodes.get(id).is_some_and(Node::is_folder) => Ok(id.clone()),
            _ => Err(WorkspaceError::FolderNotFound(normalized)),
        }
    }

    fn file_id_at(&self, path: &str) -> Option<NodeId> {
        let id = self.by_path.get(&normalize(path))?;
        self.nodes.get(id).is_some_and(Node::is_file).then(|| id.clone())
    }

    fn child_by_name(&self, parent: &NodeId, name: &str) -> Option<&NodeId> {
        self.nodes
            .get(parent)?
            .children()
            .iter()
            .find(|c| self.nodes.get(*c).is_some_and(|n| n.name == name))
    }

    fn ensure_vacant(&self, parent: &NodeId, name: &str) -> Result<(), WorkspaceError> {
        if self.child_by_name(parent, name).is_some() {
            return Err(WorkspaceError::NameTaken(name.to_string()));
        }
        Ok(())
    }

    fn insert_child(&mut self, parent: &NodeId, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId::generate();
        let parent_path = self
            .nodes
            .get(parent)
            .map(|n| n.path.clone())
            .unwrap_or_else(|| "/".to_string());
        let path = join_path(&parent_path, name);

        self.nodes.insert(
            id.clone(),
            Node {
                id: id.clone(),
                name: name.to_string(),
                path: path.clone(),
                parent: Some(parent.clone()),
                kind,
            },
        );
        self.by_path.insert(path, id.clone());
        if let Some(NodeKind::Folder { children }) =
            self.nodes.get_mut(parent).map(|n| &mut n.kind)
        {
            children.push(id.clone());
        }
        id
    }

    /// True when `ancestor` lies on `node`'s parent chain.
    fn is_ancestor(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent.clone());
        while let Some(id) = current {
            if id == *ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent.clone());
        }
        false
    }

    /// Recomputes the cached path of `start` and every descendant and
    /// reindexes them. Called after renames and moves; parents are always
    /// refreshed before their children.
    fn refresh_paths(&mut self, start: &NodeId) {
        let mut stack = vec![start.clone()];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            let old_path = node.path.clone();
            let name = node.name.clone();
            let parent_path = node
                .parent
                .as_ref()
                .and_then(|p| self.nodes.get(p))
                .map(|p| p.path.clone());
            let new_path = match parent_path {
                Some(parent_path) => join_path(&parent_path, &name),
                None => "/".to_string(),
            };

            self.by_path.remove(&old_path);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.path = new_path.clone();
            }
            self.by_path.insert(new_path, id.clone());

            if let Some(node) = self.nodes.get(&id) {
                if let NodeKind::Folder { children } = &node.kind {
                    stack.extend(children.iter().cloned());
                }
            }
        }
    }

    /// Write-through: the whole tree goes to the store after every
    /// successful mutation. A serialization failure is logged, not raised.
    fn persist(&self) {
        let tree = PersistedTree {
            root: self.to_persisted(&self.root),
        };
        match serde_json::to_string(&tree) {
            Ok(json) => self.kv.set(keys::WORKSPACE, &json),
            Err(e) => warn!("failed to serialize workspace: {e}"),
        }
    }

    fn to_persisted(&self, id: &NodeId) -> PersistedNode {
        let Some(node) = self.nodes.get(id) else {
            // unreachable for a consistent arena; keeps the serializer total
            return PersistedNode::Folder {
                id: id.to_string(),
                name: String::new(),
                children: Vec::new(),
            };
        };
        match &node.kind {
            NodeKind::File {
                language,
                content,
                saved,
            } => PersistedNode::File {
                id: node.id.to_string(),
                name: node.name.clone(),
                language: *language,
                content: content.clone(),
                saved: *saved,
            },
            NodeKind::Folder { children } => PersistedNode::Folder {
                id: node.id.to_string(),
                name: node.name.clone(),
                children: children.iter().map(|c| self.to_persisted(c)).collect(),
            },
        }
    }

    fn from_persisted(tree: PersistedTree, kv: Arc<dyn KvStore>) -> Option<Self> {
        let PersistedNode::Folder { id, children, .. } = tree.root else {
            return None;
        };
        let root_id = NodeId::from(id);
        let root = Node {
            id: root_id.clone(),
            name: String::new(),
            path: "/".to_string(),
            parent: None,
            kind: NodeKind::Folder {
                children: Vec::new(),
            },
        };
        let mut store = Self {
            nodes: HashMap::from([(root_id.clone(), root)]),
            by_path: HashMap::from([("/".to_string(), root_id.clone())]),
            root: root_id.clone(),
            kv,
        };
        for child in children {
            store.attach_persisted(child, &root_id);
        }
        Some(store)
    }

    fn attach_persisted(&mut self, node: PersistedNode, parent: &NodeId) {
        let name = match &node {
            PersistedNode::File { name, .. } | PersistedNode::Folder { name, .. } => name.clone(),
        };
        // corrupt data can carry duplicate siblings; keep the first
        if self.child_by_name(parent, &name).is_some() {
            warn!("dropping duplicate sibling '{name}' from persisted workspace");
            return;
        }

        let parent_path = self
            .nodes
            .get(parent)
            .map(|n| n.path.clone())
            .unwrap_or_else(|| "/".to_string());
        let path = join_path(&parent_path, &name);

        match node {
            PersistedNode::File {
                id,
                name,
                language,
                content,
                saved,
            } => {
                let id = NodeId::from(id);
                self.nodes.insert(
                    id.clone(),
                    Node {
                        id: id.clone(),
                        name,
                        path: path.clone(),
                        parent: Some(parent.clone()),
                        kind: NodeKind::File {
                            language,
                            content,
                            saved,
                        },
                    },
                );
                self.by_path.insert(path, id.clone());
                if let Some(NodeKind::Folder { children }) =
                    self.nodes.get_mut(parent).map(|n| &mut n.kind)
                {
                    children.push(id);
                }
            }
            PersistedNode::Folder { id, name, children } => {
                let id = NodeId::from(id);
                self.nodes.insert(
                    id.clone(),
                    Node {
                        id: id.clone(),
                        name,
                        path: path.clone(),
                        parent: Some(parent.clone()),
                        kind: NodeKind::Folder {
                            children: Vec::new(),
                        },
                    },
                );
                self.by_path.insert(path, id.clone());
                if let Some(NodeKind::Folder { children }) =
                    self.nodes.get_mut(parent).map(|n| &mut n.kind)
                {
                    children.push(id.clone());
                }
                for child in children {
                    self.attach_persisted(child, &id);
                }
            }
        }
    }

    /// First-run workspace: one sample file per language plus a readme.
    /// Seeded content counts as saved; a fresh session should not warn
    /// about unsaved changes the user never made.
    fn seed_default(&mut self) {
        let root = self.root.clone();
        for language in Language::iter() {
            self.insert_saved_file(
                &root,
                language.canonical_file_name(),
                language,
                templates::default_source(language),
            );
        }
        // the readme bypasses extension validation and takes the fallback
        // language, like any non-validated inference site
        self.insert_saved_file(&root, "README.md", Language::infer("README.md"), WELCOME);
    }

    fn insert_saved_file(&mut self, parent: &NodeId, name: &str, language: Language, content: &str) {
        self.insert_child(
            parent,
            name,
            NodeKind::File {
                language,
                content: content.to_string(),
                saved: true,
            },
        );
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return "/".to_string();
    }
    format!("/{}", trimmed.trim_matches('/'))
}

// ---- persisted shape ----

#[derive(Debug, Serialize, Deserialize)]
struct PersistedTree {
    root: PersistedNode,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum PersistedNode {
    Folder {
        id: String,
        name: String,
        children: Vec<PersistedNode>,
    },
    File {
        id: String,
        name: String,
        language: Language,
        content: String,
        saved: bool,
    },
}
