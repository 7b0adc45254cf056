use crate::language::Language;
use crate::persist::{keys, KvStore, MemoryStore};
use crate::workspace::{Node, WorkspaceError, WorkspaceStore};
use std::sync::Arc;

fn fresh() -> WorkspaceStore {
    WorkspaceStore::load(Arc::new(MemoryStore::new()))
}

/// Walks the whole tree asserting `node.path == parent.path + '/' + name`
/// (root contributing no extra slash).
fn assert_path_invariant(store: &WorkspaceStore, folder: &str) {
    for child in store.list(folder) {
        let parent = store.parent_of(&child.path).expect("child has a parent");
        let expected = if parent.path == "/" {
            format!("/{}", child.name)
        } else {
            format!("{}/{}", parent.path, child.name)
        };
        assert_eq!(child.path, expected);
        if child.is_folder() {
            assert_path_invariant(store, &child.path);
        }
    }
}

#[test]
fn default_workspace_is_seeded() {
    let store = fresh();
    let names: Vec<&str> = store.list("/").iter().map(|n| n.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["main.c", "main.cpp", "Main.java", "main.js", "main.py", "README.md"]
    );

    // seeded content counts as saved
    assert!(!store.has_unsaved_changes());

    let py = store.read_file("/main.py").unwrap();
    assert_eq!(py.language(), Some(Language::Python));
    assert!(py.content().unwrap().contains("Hello, World!"));

    // the readme takes the explicit fallback language
    let readme = store.read_file("/README.md").unwrap();
    assert_eq!(readme.language(), Some(Language::Cpp));
}

#[test]
fn create_file_infers_language_and_starts_unsaved() {
    let mut store = fresh();
    store.create_folder("/", "src").unwrap();
    store.create_file("/src", "solve.py", None).unwrap();

    let file = store.read_file("/src/solve.py").unwrap();
    assert_eq!(file.language(), Some(Language::Python));
    assert_eq!(file.saved(), Some(false));
    assert!(store.has_unsaved_changes());
}

#[test]
fn create_file_rejects_unknown_extension() {
    let mut store = fresh();
    let err = store.create_file("/", "x.unknown", None).unwrap_err();
    assert_eq!(err, WorkspaceError::UnsupportedExtension("unknown".to_string()));
    assert!(store.read_file("/x.unknown").is_none());
}

#[test]
fn create_file_accepts_explicit_language_override() {
    let mut store = fresh();
    store
        .create_file("/", "notes.txt", Some(Language::Python))
        .unwrap();
    let file = store.read_file("/notes.txt").unwrap();
    assert_eq!(file.language(), Some(Language::Python));
}

#[test]
fn create_fails_for_missing_parent() {
    let mut store = fresh();
    let err = store.create_file("/nope", "a.py", None).unwrap_err();
    assert_eq!(err, WorkspaceError::FolderNotFound("/nope".to_string()));

    // a file is not a valid parent either
    let err = store.create_file("/main.py", "a.py", None).unwrap_err();
    assert_eq!(err, WorkspaceError::FolderNotFound("/main.py".to_string()));
}

#[test]
fn sibling_collision_leaves_tree_unchanged() {
    let mut store = fresh();
    store.create_file("/", "a.py", None).unwrap();
    store.create_file("/", "b.py", None).unwrap();
    let before = store.export();

    let err = store.create_file("/", "a.py", None).unwrap_err();
    assert_eq!(err, WorkspaceError::NameTaken("a.py".to_string()));
    assert_eq!(store.export(), before);

    // folders share the sibling namespace with files
    let err = store.create_folder("/", "a.py").unwrap_err();
    assert_eq!(err, WorkspaceError::NameTaken("a.py".to_string()));
    assert_eq!(store.export(), before);

    let err = store.rename("/b.py", "a.py").unwrap_err();
    assert_eq!(err, WorkspaceError::NameTaken("a.py".to_string()));
    assert_eq!(store.export(), before);
}

#[test]
fn rename_cascades_to_descendants() {
    let mut store = fresh();
    store.create_folder("/", "src").unwrap();
    store.create_file("/src", "a.py", None).unwrap();
    store.create_folder("/src", "nested").unwrap();
    store.create_file("/src/nested", "b.py", None).unwrap();

    let a_id = store.find_by_path("/src/a.py").unwrap().id.clone();

    store.rename("/src", "lib").unwrap();

    assert!(store.find_by_path("/src").is_none());
    assert!(store.find_by_path("/src/a.py").is_none());
    assert_eq!(store.find_by_path("/lib/a.py").unwrap().id, a_id);
    assert!(store.find_by_path("/lib/nested/b.py").is_some());

    // the id survived the path change
    assert_eq!(store.find_by_id(&a_id).unwrap().path, "/lib/a.py");
    assert_path_invariant(&store, "/");
}

#[test]
fn rename_rederives_language_with_fallback() {
    let mut store = fresh();
    store.create_file("/", "a.py", None).unwrap();

    store.rename("/a.py", "a.js").unwrap();
    assert_eq!(
        store.read_file("/a.js").unwrap().language(),
        Some(Language::Javascript)
    );

    // unknown extension on the rename path takes the fallback, not an error
    store.rename("/a.js", "a.weird").unwrap();
    assert_eq!(
        store.read_file("/a.weird").unwrap().language(),
        Some(Language::Cpp)
    );
}

#[test]
fn rename_missing_target_is_distinguishable() {
    let mut store = fresh();
    let err = store.rename("/ghost.py", "a.py").unwrap_err();
    assert_eq!(err, WorkspaceError::NotFound("/ghost.py".to_string()));
}

#[test]
fn root_is_immutable() {
    let mut store = fresh();
    assert_eq!(store.rename("/", "base").unwrap_err(), WorkspaceError::RootImmutable);
    assert!(!store.delete("/"));
    assert_eq!(store.root().path, "/");
}

#[test]
fn move_cascades_paths() {
    let mut store = fresh();
    store.create_folder("/", "a").unwrap();
    store.create_folder("/a", "b").unwrap();
    store.create_file("/a/b", "f.py", None).unwrap();

    store.move_node("/a/b", "/").unwrap();

    assert!(store.find_by_path("/a/b").is_none());
    assert!(store.find_by_path("/b/f.py").is_some());
    assert_path_invariant(&store, "/");
}

#[test]
fn move_into_own_subtree_is_rejected() {
    let mut store = fresh();
    store.create_folder("/", "a").unwrap();
    store.create_folder("/a", "b").unwrap();
    let before = store.export();

    let err = store.move_node("/a", "/a/b").unwrap_err();
    assert_eq!(err, WorkspaceError::MoveIntoSelf("/a".to_string()));
    assert_eq!(store.export(), before);

    let err = store.move_node("/a", "/a").unwrap_err();
    assert_eq!(err, WorkspaceError::MoveIntoSelf("/a".to_string()));
}

#[test]
fn move_collision_is_rejected() {
    let mut store = fresh();
    store.create_folder("/", "dup").unwrap();
    store.create_folder("/", "target").unwrap();
    store.create_folder("/target", "dup").unwrap();
    let before = store.export();

    let err = store.move_node("/dup", "/target").unwrap_err();
    assert_eq!(err, WorkspaceError::NameTaken("dup".to_string()));
    assert_eq!(store.export(), before);
}

#[test]
fn delete_removes_subtree() {
    let mut store = fresh();
    store.create_folder("/", "src").unwrap();
    store.create_file("/src", "a.py", None).unwrap();
    store.create_file("/src", "b.py", None).unwrap();
    store.create_folder("/src", "sub").unwrap();
    store.create_file("/src/sub", "c.py", None).unwrap();

    let a_id = store.find_by_path("/src/a.py").unwrap().id.clone();
    let count_before = store.all_files().len();

    assert!(store.delete("/src"));

    assert_eq!(store.all_files().len(), count_before - 3);
    assert!(store.find_by_path("/src/a.py").is_none());
    assert!(store.find_by_id(&a_id).is_none());

    // deleting again reports the miss
    assert!(!store.delete("/src"));
}

#[test]
fn write_file_saves_and_is_idempotent() {
    let mut store = fresh();
    store.create_file("/", "a.py", None).unwrap();

    assert!(store.write_file("/a.py", "print(1)\n"));
    let file = store.read_file("/a.py").unwrap();
    assert_eq!(file.content(), Some("print(1)\n"));
    assert_eq!(file.saved(), Some(true));

    // saving the same content again changes nothing
    assert!(store.write_file("/a.py", "print(1)\n"));
    let file = store.read_file("/a.py").unwrap();
    assert_eq!(file.content(), Some("print(1)\n"));
    assert_eq!(file.saved(), Some(true));
}

#[test]
fn write_file_misses_return_false() {
    let mut store = fresh();
    assert!(!store.write_file("/ghost.py", "x"));
    store.create_folder("/", "src").unwrap();
    assert!(!store.write_file("/src", "x"));
}

#[test]
fn unsaved_aggregate_tracks_every_file() {
    let mut store = fresh();
    assert!(!store.has_unsaved_changes());

    store.create_file("/", "a.py", None).unwrap();
    assert!(store.has_unsaved_changes());

    assert!(store.write_file("/a.py", "print(1)\n"));
    assert!(!store.has_unsaved_changes());

    assert!(store.mark_file_unsaved("/a.py"));
    assert!(store.has_unsaved_changes());
}

#[test]
fn reset_file_restores_boilerplate() {
    let mut store = fresh();
    store.create_file("/", "a.py", None).unwrap();
    store.write_file("/a.py", "print('custom')\n");

    assert!(store.reset_file("/a.py"));
    let file = store.read_file("/a.py").unwrap();
    assert_eq!(file.content(), Some("print(\"Hello, World!\")\n"));
    assert_eq!(file.saved(), Some(false));
}

#[test]
fn paths_normalize_on_lookup() {
    let mut store = fresh();
    store.create_folder("/", "src").unwrap();
    store.create_file("/src", "a.py", None).unwrap();

    assert!(store.find_by_path("src/a.py").is_some());
    assert!(store.find_by_path("/src/a.py/").is_some());
    assert!(store.is_folder("src"));
    assert!(store.read_file(" /src/a.py ").is_some());
}

#[test]
fn list_misses_are_empty() {
    let store = fresh();
    assert!(store.list("/nope").is_empty());
    assert!(store.list("/main.py").is_empty());
}

#[test]
fn persistence_round_trips() {
    let kv: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let mut store = WorkspaceStore::load(kv.clone() as Arc<dyn KvStore>);
    store.create_folder("/", "src").unwrap();
    store.create_file("/src", "a.py", None).unwrap();
    store.write_file("/src/a.py", "print('persisted')\n");
    store.mark_file_unsaved("/main.c");
    let exported = store.export();
    let a_id = store.find_by_path("/src/a.py").unwrap().id.clone();

    let reloaded = WorkspaceStore::load(kv as Arc<dyn KvStore>);
    assert_eq!(reloaded.export(), exported);

    let file = reloaded.find_by_path("/src/a.py").unwrap();
    assert_eq!(file.id, a_id);
    assert_eq!(file.content(), Some("print('persisted')\n"));
    assert_eq!(file.saved(), Some(true));
    assert_eq!(reloaded.read_file("/main.c").unwrap().saved(), Some(false));
    assert_path_invariant(&reloaded, "/");
}

#[test]
fn corrupt_persisted_data_falls_back_to_default() {
    let kv: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    kv.set(keys::WORKSPACE, "{ this is not json");

    let store = WorkspaceStore::load(kv.clone() as Arc<dyn KvStore>);
    assert_eq!(store.list("/").len(), 6);

    // the fallback tree was written back
    let raw = kv.get(keys::WORKSPACE).unwrap();
    assert!(raw.contains("main.py"));
}

#[test]
fn every_mutation_writes_through() {
    let kv: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let mut store = WorkspaceStore::load(kv.clone() as Arc<dyn KvStore>);

    store.create_file("/", "a.py", None).unwrap();
    assert!(kv.get(keys::WORKSPACE).unwrap().contains("a.py"));

    store.rename("/a.py", "b.py").unwrap();
    assert!(kv.get(keys::WORKSPACE).unwrap().contains("b.py"));

    store.delete("/b.py");
    assert!(!kv.get(keys::WORKSPACE).unwrap().contains("b.py"));
}

#[test]
fn stale_node_references_resolve_by_id() {
    let mut store = fresh();
    store.create_folder("/", "src").unwrap();
    store.create_file("/src", "a.py", None).unwrap();
    let id = store.find_by_path("/src/a.py").unwrap().id.clone();

    store.rename("/src", "lib").unwrap();

    // a held path is stale, the id is not
    assert!(store.find_by_path("/src/a.py").is_none());
    let node: &Node = store.find_by_id(&id).unwrap();
    assert_eq!(node.path, "/lib/a.py");
}
