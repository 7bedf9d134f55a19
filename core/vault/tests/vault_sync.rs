//! End-to-end behavior of the vault tree against a real directory.

use std::cell::Cell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use pdfvault_common::{Error, Result};
use pdfvault_storage::{Entry, LocalProvider, StorageProvider};
use pdfvault_vault::{
    DeleteOutcome, DirectoryScanner, DragGesture, MoveOutcome, Point, RenameOutcome,
    VaultConfig, VaultTree, VaultTreeSync,
};
use proptest::prelude::*;
use tempfile::TempDir;

/// Local provider that counts every mutating call.
struct CountingProvider {
    inner: LocalProvider,
    mutations: Cell<usize>,
}

impl CountingProvider {
    fn touch(&self) {
        self.mutations.set(self.mutations.get() + 1);
    }
}

impl StorageProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }
    fn same_entry(&self, a: &Path, b: &Path) -> bool {
        self.inner.same_entry(a, b)
    }
    fn list(&self, path: &Path) -> Result<Vec<Entry>> {
        self.inner.list(path)
    }
    fn create_dir(&self, path: &Path) -> Result<()> {
        self.touch();
        self.inner.create_dir(path)
    }
    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        self.touch();
        self.inner.copy(from, to)
    }
    fn delete(&self, path: &Path) -> Result<()> {
        self.touch();
        self.inner.delete(path)
    }
    fn delete_dir(&self, path: &Path) -> Result<()> {
        self.touch();
        self.inner.delete_dir(path)
    }
    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.touch();
        self.inner.rename(from, to)
    }
}

fn open(temp: &TempDir) -> VaultTreeSync<LocalProvider> {
    VaultTreeSync::open(&VaultConfig::with_root(temp.path())).unwrap()
}

fn open_counting(temp: &TempDir) -> VaultTreeSync<CountingProvider> {
    let root = temp.path().to_path_buf();
    let provider = CountingProvider {
        inner: LocalProvider::new(&root).unwrap(),
        mutations: Cell::new(0),
    };
    let outcome = DirectoryScanner::default().scan(&provider, &root).unwrap();
    VaultTreeSync::new(
        provider,
        VaultTree::new(outcome.root),
        &VaultConfig::with_root(&root),
    )
}

fn names(sync: &VaultTreeSync<impl StorageProvider>, dir: &Path) -> Vec<String> {
    sync.tree()
        .find_node(dir)
        .unwrap()
        .children()
        .iter()
        .map(|n| n.name().to_string())
        .collect()
}

#[test]
fn test_two_folders_in_empty_vault() {
    let temp = TempDir::new().unwrap();
    let mut sync = open(&temp);

    let first = sync.create_folder(None).unwrap();
    let second = sync.create_folder(None).unwrap();

    assert_eq!(first, temp.path().join("New Folder"));
    assert_eq!(second, temp.path().join("New Folder 0"));
    assert!(first.is_dir() && second.is_dir());
    assert_eq!(names(&sync, temp.path()), vec!["New Folder", "New Folder 0"]);
}

#[test]
fn test_import_over_existing_name() {
    let temp = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    fs::write(temp.path().join("doc.pdf"), b"original").unwrap();
    let source = outside.path().join("doc.pdf");
    fs::write(&source, b"incoming").unwrap();

    let mut sync = open(&temp);
    let report = sync.import_files(None, &[source.clone()]).unwrap();

    let copy = temp.path().join("doc (1).pdf");
    assert_eq!(fs::read(&source).unwrap(), b"incoming");
    assert_eq!(report.imported, vec![copy.clone()]);
    assert!(report.failed.is_empty());
    assert_eq!(fs::read(temp.path().join("doc.pdf")).unwrap(), b"original");
    assert_eq!(fs::read(&copy).unwrap(), b"incoming");
    assert!(sync.tree().exists(&copy));
}

#[test]
fn test_import_into_selected_file_uses_its_folder() {
    let temp = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("A")).unwrap();
    fs::write(temp.path().join("A/existing.pdf"), b"x").unwrap();
    let source = outside.path().join("new.pdf");
    fs::write(&source, b"y").unwrap();

    let mut sync = open(&temp);
    let selection = sync.select(&temp.path().join("A/existing.pdf")).unwrap();
    let report = sync.import_files(Some(&selection), &[source.clone()]).unwrap();

    assert_eq!(report.destination, temp.path().join("A"));
    assert!(source.exists());
    assert!(temp.path().join("A/new.pdf").exists());
    assert!(sync
        .tree()
        .find_node(&temp.path().join("A"))
        .unwrap()
        .is_expanded());
}

#[test]
fn test_rejected_rename_leaves_everything() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.pdf"), b"a").unwrap();
    fs::write(temp.path().join("b.pdf"), b"b").unwrap();
    let mut sync = open(&temp);
    let a = temp.path().join("a.pdf");
    let before = sync.tree().clone();

    let err = sync.rename(&a, "b.pdf").unwrap_err();
    assert!(matches!(err, Error::NameConflict(_)));

    let err = sync.rename(&a, "bad/name.pdf").unwrap_err();
    assert!(matches!(err, Error::InvalidName(_)));

    assert_eq!(sync.tree(), &before);
    assert_eq!(fs::read(&a).unwrap(), b"a");
    assert_eq!(fs::read(temp.path().join("b.pdf")).unwrap(), b"b");
}

#[test]
fn test_root_operations_are_noops() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("A")).unwrap();
    let mut sync = open_counting(&temp);
    let root = temp.path().to_path_buf();
    let before = sync.tree().clone();

    assert_eq!(sync.delete(&root).unwrap(), DeleteOutcome::Ignored);
    assert_eq!(sync.rename(&root, "Other").unwrap(), RenameOutcome::Unchanged);
    assert_eq!(
        sync.move_node(&root, &root.join("A")).unwrap(),
        MoveOutcome::Ignored
    );

    assert_eq!(sync.provider().mutations.get(), 0);
    assert_eq!(sync.tree(), &before);
    assert!(root.is_dir());
}

#[test]
fn test_expansion_survives_move() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("A/B")).unwrap();
    fs::create_dir(temp.path().join("C")).unwrap();
    fs::write(temp.path().join("x.pdf"), b"x").unwrap();

    let mut sync = open(&temp);
    let a = temp.path().join("A");
    let b = a.join("B");
    sync.set_expanded(&a, true).unwrap();
    sync.set_expanded(&b, true).unwrap();

    let outcome = sync
        .move_node(&temp.path().join("x.pdf"), &temp.path().join("C"))
        .unwrap();
    assert_eq!(
        outcome,
        MoveOutcome::Moved {
            from: temp.path().join("x.pdf"),
            to: temp.path().join("C/x.pdf"),
        }
    );

    let tree = sync.tree();
    assert!(tree.find_node(&a).unwrap().is_expanded());
    assert!(tree.find_node(&b).unwrap().is_expanded());
    assert!(!tree.find_node(&temp.path().join("C")).unwrap().is_expanded());
    assert!(tree.exists(&temp.path().join("C/x.pdf")));
}

#[test]
fn test_move_folder_keeps_expansion_of_untouched_paths() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("A/B")).unwrap();
    fs::create_dir(temp.path().join("D")).unwrap();

    let mut sync = open(&temp);
    let a = temp.path().join("A");
    sync.set_expanded(&a, true).unwrap();
    sync.set_expanded(&a.join("B"), true).unwrap();

    sync.move_node(&temp.path().join("D"), &a).unwrap();

    let expanded: HashSet<PathBuf> = sync.tree().snapshot_expanded();
    assert!(expanded.contains(&a));
    assert!(expanded.contains(&a.join("B")));
    assert!(sync.tree().exists(&a.join("D")));
}

#[test]
fn test_move_into_folder_with_same_name_refused() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("Y")).unwrap();
    fs::write(temp.path().join("fileX.pdf"), b"outer").unwrap();
    fs::write(temp.path().join("Y/fileX.pdf"), b"inner").unwrap();

    let mut sync = open_counting(&temp);
    let before = sync.tree().clone();

    let err = sync
        .move_node(&temp.path().join("fileX.pdf"), &temp.path().join("Y"))
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    assert_eq!(sync.provider().mutations.get(), 0);
    assert_eq!(sync.tree(), &before);
    assert_eq!(fs::read(temp.path().join("Y/fileX.pdf")).unwrap(), b"inner");
}

#[test]
fn test_empty_rename_never_touches_disk() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("doc.pdf"), b"x").unwrap();
    let mut sync = open_counting(&temp);
    let doc = temp.path().join("doc.pdf");

    assert_eq!(sync.rename(&doc, "").unwrap(), RenameOutcome::Unchanged);
    assert_eq!(sync.rename(&doc, "   ").unwrap(), RenameOutcome::Unchanged);
    assert_eq!(sync.rename(&doc, "doc.pdf").unwrap(), RenameOutcome::Unchanged);

    assert_eq!(sync.provider().mutations.get(), 0);
    assert_eq!(sync.tree().find_node(&doc).unwrap().name(), "doc.pdf");
}

#[test]
fn test_drag_gesture_drives_move() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("Y")).unwrap();
    fs::write(temp.path().join("x.pdf"), b"x").unwrap();
    let mut sync = open(&temp);

    let mut gesture = DragGesture::default();
    gesture.press(temp.path().join("x.pdf"), Point::new(0.0, 0.0));
    gesture.motion(Point::new(8.0, 0.0));
    let request = gesture.drop_on(temp.path().join("Y")).unwrap();

    sync.move_node(&request.source, &request.target).unwrap();
    assert!(temp.path().join("Y/x.pdf").exists());
    assert!(!temp.path().join("x.pdf").exists());
}

#[test]
fn test_tree_matches_disk_after_mixed_operations() {
    let temp = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    let source = outside.path().join("paper.pdf");
    fs::write(&source, b"%PDF").unwrap();

    let mut sync = open(&temp);
    let folder = sync.create_folder(None).unwrap();
    let selection = sync.select(&folder).unwrap();
    sync.import_files(Some(&selection), &[source.clone(), source])
        .unwrap();
    sync.rename(&folder, "Papers").unwrap();
    let papers = temp.path().join("Papers");
    sync.delete(&papers.join("paper (1).pdf")).unwrap();

    let fresh = DirectoryScanner::default()
        .scan(&LocalProvider::new(temp.path()).unwrap(), temp.path())
        .unwrap();
    let disk: HashSet<PathBuf> = VaultTree::new(fresh.root)
        .iter()
        .map(|n| n.path().to_path_buf())
        .collect();
    let memory: HashSet<PathBuf> = sync.tree().iter().map(|n| n.path().to_path_buf()).collect();
    assert_eq!(memory, disk);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_created_folder_names_are_unique(count in 1usize..12, nested in any::<bool>()) {
        let temp = TempDir::new().unwrap();
        let mut sync = open(&temp);
        let parent = if nested {
            let dir = sync.create_folder(None).unwrap();
            Some(sync.select(&dir).unwrap())
        } else {
            None
        };

        let mut seen = HashSet::new();
        for _ in 0..count {
            let path = sync.create_folder(parent.as_ref()).unwrap();
            prop_assert!(path.is_dir());
            prop_assert!(seen.insert(path));
        }

        let dir = parent
            .as_ref()
            .map(|s| s.path().to_path_buf())
            .unwrap_or_else(|| temp.path().to_path_buf());
        let listed = names(&sync, &dir);
        let unique: HashSet<&String> = listed.iter().collect();
        prop_assert_eq!(unique.len(), listed.len());
    }
}
