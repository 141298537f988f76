use std::fs;

use tempfile::TempDir;
use vercont::{RepoError, Repository};

#[test]
fn checkout_replaces_contents_and_keeps_history_length() {
    let temp = TempDir::new().unwrap();
    let live = temp.path().join("site");
    fs::create_dir(&live).unwrap();
    fs::write(live.join("index.html"), "v1").unwrap();
    let mut repo = Repository::create(&live, None).unwrap();
    repo.commit(None, None, &mut ()).unwrap();
    fs::write(live.join("index.html"), "v2").unwrap();
    fs::write(live.join("extra.css"), "body {}").unwrap();
    repo.commit(None, None, &mut ()).unwrap();

    fs::write(live.join("draft.md"), "unsaved").unwrap();
    let number = repo.checkout(None, -2, "BACKUP", &mut ()).unwrap();
    assert_eq!(number, 0);
    assert_eq!(fs::read_to_string(live.join("index.html")).unwrap(), "v1");
    assert!(!live.join("extra.css").exists());
    assert!(!live.join("draft.md").exists());

    let branch = repo.branch(None).unwrap();
    assert_eq!(branch.len(), 2);
    assert!(branch
        .revisions()
        .iter()
        .all(|revision| revision.description() != Some("BACKUP")));
}

#[test]
fn checkout_unknown_branch_or_revision_fails() {
    let temp = TempDir::new().unwrap();
    let live = temp.path().join("site");
    fs::create_dir(&live).unwrap();
    let mut repo = Repository::create(&live, None).unwrap();
    repo.commit(None, None, &mut ()).unwrap();

    assert!(matches!(
        repo.checkout(Some("ghost"), 0, "BACKUP", &mut ()),
        Err(RepoError::NoSuchBranch(_))
    ));
    assert!(matches!(
        repo.checkout(None, 1, "BACKUP", &mut ()),
        Err(RepoError::NoSuchRevision(1))
    ));
}

#[test]
fn checkout_of_latest_with_clean_tree_restores_it() {
    let temp = TempDir::new().unwrap();
    let live = temp.path().join("site");
    fs::create_dir_all(live.join("assets")).unwrap();
    fs::write(live.join("assets").join("logo.svg"), "<svg/>").unwrap();
    let mut repo = Repository::create(&live, None).unwrap();
    repo.commit(None, None, &mut ()).unwrap();

    repo.checkout(None, -1, "BACKUP", &mut ()).unwrap();
    assert_eq!(
        fs::read_to_string(live.join("assets").join("logo.svg")).unwrap(),
        "<svg/>"
    );
    assert_eq!(repo.branch(None).unwrap().len(), 1);
}
