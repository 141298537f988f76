use std::fs;

use tempfile::TempDir;
use vercont::{RepoError, Repository};

fn workspace() -> (TempDir, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let live = temp.path().join("project");
    fs::create_dir(&live).unwrap();
    (temp, live)
}

#[test]
fn commit_add_delete_then_update_restores_file() {
    let (_temp, live) = workspace();
    let mut repo = Repository::create(&live, None).unwrap();

    assert!(repo.commit(None, None, &mut ()).unwrap());
    fs::write(live.join("f"), "hi").unwrap();
    assert!(repo.commit(None, None, &mut ()).unwrap());
    fs::remove_file(live.join("f")).unwrap();
    assert!(repo.commit(None, None, &mut ()).unwrap());

    let branch = repo.branch(None).unwrap();
    assert_eq!(branch.len(), 3);
    assert!(branch.revision(0).unwrap().root().is_empty());
    assert!(branch.revision(1).unwrap().root().child("f").is_some());
    assert!(branch.revision(2).unwrap().root().child("f").is_none());

    repo.update(None, 1, &mut ()).unwrap();
    assert_eq!(fs::read_to_string(live.join("f")).unwrap(), "hi");
}

#[test]
fn repeated_commit_without_changes_is_rejected() {
    let (_temp, live) = workspace();
    fs::write(live.join("a.txt"), "same").unwrap();
    let mut repo = Repository::create(&live, None).unwrap();
    assert!(repo.commit(None, Some("first".to_string()), &mut ()).unwrap());
    assert!(!repo.commit(None, Some("second".to_string()), &mut ()).unwrap());

    let branch = repo.branch(None).unwrap();
    assert_eq!(branch.len(), 1);
    assert_eq!(branch.latest().unwrap().description(), Some("first"));
}

#[test]
fn added_branch_numbers_independently() {
    let (_temp, live) = workspace();
    fs::write(live.join("a.txt"), "a").unwrap();
    let mut repo = Repository::create(&live, None).unwrap();
    repo.commit(None, None, &mut ()).unwrap();
    fs::write(live.join("a.txt"), "aa").unwrap();
    repo.commit(None, None, &mut ()).unwrap();

    repo.add_branch("b2", &live).unwrap();
    assert!(repo.commit(Some("b2"), None, &mut ()).unwrap());

    let b2 = repo.branch(Some("b2")).unwrap();
    assert_eq!(b2.len(), 1);
    assert_eq!(b2.revision(0).unwrap().number(), 0);
    assert_eq!(b2.revision(0).unwrap().previous(), None);
    assert_eq!(repo.branch(None).unwrap().len(), 2);
}

#[test]
fn negative_indices_count_from_the_end() {
    let (_temp, live) = workspace();
    let mut repo = Repository::create(&live, None).unwrap();
    for content in ["one", "two", "three"] {
        fs::write(live.join("f"), content).unwrap();
        repo.commit(None, None, &mut ()).unwrap();
    }
    let branch = repo.branch(None).unwrap();
    assert_eq!(branch.revision(-1).unwrap().number(), 2);
    assert_eq!(branch.revision(-3).unwrap().number(), 0);
    assert!(branch.revision(-4).is_none());
    assert!(branch.revision(3).is_none());
    assert!(matches!(
        repo.update(None, -4, &mut ()),
        Err(RepoError::NoSuchRevision(-4))
    ));
}

#[test]
fn update_is_additive() {
    let (_temp, live) = workspace();
    fs::create_dir(live.join("src")).unwrap();
    fs::write(live.join("src").join("main.rs"), "fn main() {}").unwrap();
    let mut repo = Repository::create(&live, None).unwrap();
    repo.commit(None, None, &mut ()).unwrap();

    fs::write(live.join("src").join("main.rs"), "changed").unwrap();
    fs::write(live.join("untracked.txt"), "keep me").unwrap();
    repo.update(None, 0, &mut ()).unwrap();

    assert_eq!(
        fs::read_to_string(live.join("src").join("main.rs")).unwrap(),
        "fn main() {}"
    );
    assert_eq!(
        fs::read_to_string(live.join("untracked.txt")).unwrap(),
        "keep me"
    );
}

#[test]
fn update_recreates_missing_monitored_directory() {
    let (_temp, live) = workspace();
    fs::write(live.join("f"), "x").unwrap();
    let mut repo = Repository::create(&live, None).unwrap();
    repo.commit(None, None, &mut ()).unwrap();

    fs::remove_dir_all(&live).unwrap();
    assert!(matches!(
        repo.commit(None, None, &mut ()),
        Err(RepoError::NotADirectory(_))
    ));
    repo.update(None, -1, &mut ()).unwrap();
    assert_eq!(fs::read_to_string(live.join("f")).unwrap(), "x");
}

#[test]
fn commit_reports_progress_events() {
    let (_temp, live) = workspace();
    fs::write(live.join("f"), "x").unwrap();
    let mut repo = Repository::create(&live, None).unwrap();

    let mut lines = vercont::ProgressLines::new();
    repo.commit(None, None, &mut lines).unwrap();
    let lines = lines.into_lines();
    assert!(lines.iter().any(|l| l.ends_with("f *")));
    assert_eq!(lines.last().map(String::as_str), Some("Revision 0 processed."));
}
