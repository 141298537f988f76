use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use vercont::store::persistence::repository_path;
use vercont::{Branch, FileNode, Node, RepoError, Repository};

fn populated(temp: &TempDir) -> Repository {
    let live = temp.path().join("docs");
    fs::create_dir(&live).unwrap();
    fs::write(live.join("keep.txt"), "unchanged").unwrap();
    fs::write(live.join("edit.txt"), "one").unwrap();

    let mut repo = Repository::create(&live, Some("main")).unwrap();
    repo.commit(None, Some("initial".to_string()), &mut ()).unwrap();
    fs::write(live.join("edit.txt"), "two").unwrap();
    repo.commit(None, None, &mut ()).unwrap();
    repo.add_branch("side", &live).unwrap();
    repo.commit(Some("side"), None, &mut ()).unwrap();
    repo
}

fn file_at<'a>(branch: &'a Branch, index: i64, name: &str) -> &'a FileNode {
    branch
        .revision(index)
        .unwrap()
        .root()
        .child(name)
        .and_then(Node::as_file)
        .unwrap()
}

#[test]
fn save_then_load_preserves_history_and_sharing() {
    let temp = TempDir::new().unwrap();
    let repo = populated(&temp);
    let file = repository_path(temp.path(), "docs");
    repo.save(&file).unwrap();

    let loaded = Repository::load(&file).unwrap();
    assert_eq!(loaded.default_branch(), "main");
    assert_eq!(
        loaded.branch_names().collect::<Vec<_>>(),
        vec!["main", "side"]
    );

    let main = loaded.branch(None).unwrap();
    assert_eq!(main.len(), 2);
    assert_eq!(main.revision(0).unwrap().description(), Some("initial"));
    for (original, reloaded) in repo
        .branch(None)
        .unwrap()
        .revisions()
        .iter()
        .zip(main.revisions())
    {
        assert_eq!(original.root(), reloaded.root());
        assert_eq!(original.number(), reloaded.number());
    }

    let keep_0 = file_at(main, 0, "keep.txt");
    let keep_1 = file_at(main, 1, "keep.txt");
    assert!(Arc::ptr_eq(keep_0.data(), keep_1.data()));
    assert!(!keep_1.is_changed());
    let edit_1 = file_at(main, 1, "edit.txt");
    assert!(edit_1.is_changed());
    assert_eq!(edit_1.content().unwrap(), b"two");
}

#[test]
fn loaded_repository_keeps_committing() {
    let temp = TempDir::new().unwrap();
    let repo = populated(&temp);
    let file = repository_path(temp.path(), "docs");
    repo.save(&file).unwrap();

    let mut loaded = Repository::load(&file).unwrap();
    assert!(!loaded.commit(None, None, &mut ()).unwrap());
    fs::write(temp.path().join("docs").join("new.txt"), "fresh").unwrap();
    assert!(loaded.commit(None, None, &mut ()).unwrap());
    assert_eq!(loaded.branch(None).unwrap().latest().unwrap().number(), 2);
}

#[test]
fn repeated_saves_leave_only_the_repository_file() {
    let temp = TempDir::new().unwrap();
    let repo = populated(&temp);
    let store_dir = temp.path().join("store");
    fs::create_dir(&store_dir).unwrap();
    let file = repository_path(&store_dir, "docs");
    repo.save(&file).unwrap();
    repo.save(&file).unwrap();

    let entries: Vec<_> = fs::read_dir(&store_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("docs.vcr")]);
    assert!(Repository::load(&file).is_ok());
}

#[test]
fn garbage_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("garbage.vcr");
    fs::write(&file, vec![0xAB; 4096]).unwrap();
    assert!(matches!(
        Repository::load(&file),
        Err(RepoError::CorruptOrIncompatibleData { .. })
    ));
}
