use crate::persist::{keys, KvStore};
use crate::session::layout::LayoutMetrics;
use crate::workspace::{Node, NodeId, WorkspaceStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// One open file in the editing surface. The id is the durable reference;
/// the path rides along for display and is re-synced from the store after
/// structural changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub file_id: NodeId,
    pub file_path: String,
}

/// Open tabs, the active selection, and the panel layout. Persists each
/// piece under its own key, independently of the workspace tree.
pub struct SessionState {
    tabs: Vec<Tab>,
    active: Option<NodeId>,
    layout: LayoutMetrics,
    kv: Arc<dyn KvStore>,
}

impl SessionState {
    /// Restores the session, dropping tabs whose file no longer resolves
    /// and refreshing surviving paths from the store. Corrupt persisted
    /// data means an empty session, never an error.
    pub fn load(kv: Arc<dyn KvStore>, store: &WorkspaceStore) -> Self {
        let mut tabs: Vec<Tab> = match kv.get(keys::TABS) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("unparseable persisted tabs, starting empty: {e}");
                Vec::new()
            }),
            None => Vec::new(),
        };
        tabs.retain_mut(|tab| match store.find_by_id(&tab.file_id) {
            Some(node) => {
                tab.file_path = node.path.clone();
                true
            }
            None => false,
        });

        let active = kv
            .get(keys::ACTIVE_TAB)
            .map(NodeId::from)
            .filter(|id| tabs.iter().any(|t| t.file_id == *id));

        let layout = match kv.get(keys::LAYOUT) {
            Some(raw) => serde_json::from_str::<LayoutMetrics>(&raw)
                .map(LayoutMetrics::sanitized)
                .unwrap_or_else(|e| {
                    warn!("unparseable persisted layout, using defaults: {e}");
                    LayoutMetrics::default()
                }),
            None => LayoutMetrics::default(),
        };

        Self {
            tabs,
            active,
            layout,
            kv,
        }
    }

    // ---- tabs ----

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active(&self) -> Option<&NodeId> {
        self.active.as_ref()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        let active = self.active.as_ref()?;
        self.tabs.iter().find(|t| t.file_id == *active)
    }

    /// Opens a file. An existing tab for the path is refreshed and becomes
    /// active; otherwise a new tab is appended at the end and becomes
    /// active.
    pub fn open(&mut self, node: &Node) {
        match self.tabs.iter_mut().find(|t| t.file_path == node.path) {
            Some(tab) => tab.file_id = node.id.clone(),
            None => self.tabs.push(Tab {
                file_id: node.id.clone(),
                file_path: node.path.clone(),
            }),
        }
        self.active = Some(node.id.clone());
        self.persist();
    }

    /// Closes a tab. If it was active, activation falls forward to the tab
    /// now occupying the same index, else the previous one, else none.
    pub fn close(&mut self, id: &NodeId) -> bool {
        let Some(index) = self.tabs.iter().position(|t| t.file_id == *id) else {
            return false;
        };
        self.tabs.remove(index);

        if self.active.as_ref() == Some(id) {
            let next = self
                .tabs
                .get(index)
                .or_else(|| index.checked_sub(1).and_then(|i| self.tabs.get(i)));
            self.active = next.map(|t| t.file_id.clone());
        }
        self.persist();
        true
    }

    /// Makes an already-open tab active; false when no tab has this id.
    pub fn activate(&mut self, id: &NodeId) -> bool {
        if !self.tabs.iter().any(|t| t.file_id == *id) {
            return false;
        }
        self.active = Some(id.clone());
        self.persist();
        true
    }

    /// Re-syncs tab paths from the store and drops tabs whose file is
    /// gone. Callers run this after renames, moves, and deletes; a held
    /// path is stale the moment the tree changes under it.
    pub fn refresh(&mut self, store: &WorkspaceStore) {
        self.tabs.retain_mut(|tab| match store.find_by_id(&tab.file_id) {
            Some(node) => {
                tab.file_path = node.path.clone();
                true
            }
            None => false,
        });
        if let Some(active) = &self.active {
            if !self.tabs.iter().any(|t| t.file_id == *active) {
                self.active = self.tabs.last().map(|t| t.file_id.clone());
            }
        }
        self.persist();
    }

    // ---- layout ----

    pub fn layout(&self) -> LayoutMetrics {
        self.layout
    }

    pub fn set_explorer_width(&mut self, pct: f32) {
        self.layout.set_explorer_width(pct);
        self.persist_layout();
    }

    pub fn set_editor_height(&mut self, pct: f32) {
        self.layout.set_editor_height(pct);
        self.persist_layout();
    }

    // ---- persistence ----

    fn persist(&self) {
        match serde_json::to_string(&self.tabs) {
            Ok(json) => self.kv.set(keys::TABS, &json),
            Err(e) => warn!("failed to serialize tabs: {e}"),
        }
        match &self.active {
            Some(id) => self.kv.set(keys::ACTIVE_TAB, id.as_str()),
            None => self.kv.remove(keys::ACTIVE_TAB),
        }
    }

    fn persist_layout(&self) {
        match serde_json::to_string(&self.layout) {
            Ok(json) => self.kv.set(keys::LAYOUT, &json),
            Err(e) => warn!("failed to serialize layout: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, WorkspaceStore) {
        let kv = Arc::new(MemoryStore::new());
        let store = WorkspaceStore::load(kv.clone() as Arc<dyn KvStore>);
        (kv, store)
    }

    fn open_path(session: &mut SessionState, store: &WorkspaceStore, path: &str) -> NodeId {
        let node = store.read_file(path).unwrap();
        session.open(node);
        node.id.clone()
    }

    #[test]
    fn opening_appends_and_activates() {
        let (kv, store) = setup();
        let mut session = SessionState::load(kv as Arc<dyn KvStore>, &store);

        let py = open_path(&mut session, &store, "/main.py");
        let c = open_path(&mut session, &store, "/main.c");

        assert_eq!(session.tabs().len(), 2);
        assert_eq!(session.active(), Some(&c));

        // re-opening an already-open path activates instead of duplicating
        session.open(store.read_file("/main.py").unwrap());
        assert_eq!(session.tabs().len(), 2);
        assert_eq!(session.active(), Some(&py));
    }

    #[test]
    fn close_falls_forward_then_back() {
        let (kv, store) = setup();
        let mut session = SessionState::load(kv as Arc<dyn KvStore>, &store);

        let a = open_path(&mut session, &store, "/main.c");
        let b = open_path(&mut session, &store, "/main.py");
        let c = open_path(&mut session, &store, "/main.js");
        session.activate(&b);

        // the tab that slid into b's index becomes active
        assert!(session.close(&b));
        assert_eq!(session.active(), Some(&c));

        session.activate(&c);
        assert!(session.close(&c));
        assert_eq!(session.active(), Some(&a));

        assert!(session.close(&a));
        assert_eq!(session.active(), None);
    }

    #[test]
    fn closing_an_inactive_tab_keeps_the_active_one() {
        let (kv, store) = setup();
        let mut session = SessionState::load(kv as Arc<dyn KvStore>, &store);

        let a = open_path(&mut session, &store, "/main.c");
        let b = open_path(&mut session, &store, "/main.py");

        session.activate(&b);
        assert!(session.close(&a));
        assert_eq!(session.active(), Some(&b));
    }

    #[test]
    fn session_round_trips_through_the_store() {
        let (kv, store) = setup();
        let mut session = SessionState::load(kv.clone() as Arc<dyn KvStore>, &store);
        let py = open_path(&mut session, &store, "/main.py");
        open_path(&mut session, &store, "/main.c");
        session.activate(&py);
        session.set_explorer_width(25.0);

        let restored = SessionState::load(kv as Arc<dyn KvStore>, &store);
        assert_eq!(restored.tabs(), session.tabs());
        assert_eq!(restored.active(), Some(&py));
        assert_eq!(restored.layout().explorer_width_pct, 25.0);
    }

    #[test]
    fn stale_tabs_are_pruned_on_load() {
        let (kv, mut store) = setup();
        let mut session = SessionState::load(kv.clone() as Arc<dyn KvStore>, &store);
        let kept = open_path(&mut session, &store, "/main.c");
        open_path(&mut session, &store, "/main.py");

        store.delete("/main.py");

        let restored = SessionState::load(kv as Arc<dyn KvStore>, &store);
        assert_eq!(restored.tabs().len(), 1);
        assert_eq!(restored.tabs()[0].file_id, kept);
        // the active id pointed at the deleted file and was dropped with it
        assert_eq!(restored.active(), None);
    }

    #[test]
    fn refresh_follows_renames_and_deletes() {
        let (kv, mut store) = setup();
        let mut session = SessionState::load(kv as Arc<dyn KvStore>, &store);
        let py = open_path(&mut session, &store, "/main.py");
        open_path(&mut session, &store, "/main.c");

        store.create_folder("/", "src").unwrap();
        store.move_node("/main.py", "/src").unwrap();
        store.delete("/main.c");
        session.refresh(&store);

        assert_eq!(session.tabs().len(), 1);
        assert_eq!(session.tabs()[0].file_path, "/src/main.py");
        assert_eq!(session.active(), Some(&py));
    }

    #[test]
    fn corrupt_tab_data_means_an_empty_session() {
        let (kv, store) = setup();
        kv.set(keys::TABS, "[[not json");
        kv.set(keys::LAYOUT, "{}");

        let session = SessionState::load(kv as Arc<dyn KvStore>, &store);
        assert!(session.tabs().is_empty());
        assert_eq!(session.layout(), LayoutMetrics::default());
    }

    #[test]
    fn persisted_tabs_keep_the_original_shape() {
        let (kv, store) = setup();
        let mut session = SessionState::load(kv.clone() as Arc<dyn KvStore>, &store);
        open_path(&mut session, &store, "/main.py");

        let raw = kv.get(keys::TABS).unwrap();
        assert!(raw.contains("\"fileId\""));
        assert!(raw.contains("\"filePath\""));
    }
}
