use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vercont::config::VercontConfig;
use vercont::tooling::cli::{CliContext, Commands, Session};
use vercont::{ApiError, RepoError};

fn context(workspace: &Path, repository: Option<&str>, branch: Option<&str>) -> CliContext {
    CliContext::with_config(workspace.to_path_buf(), VercontConfig::default()).with_session(
        Session {
            repository: repository.map(str::to_string),
            branch: branch.map(str::to_string),
        },
    )
}

fn setup() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let live = temp.path().join("notes");
    fs::create_dir(&live).unwrap();
    fs::write(live.join("todo.txt"), "buy milk").unwrap();
    let created = context(temp.path(), Some("docs"), None)
        .execute(&Commands::New {
            path: Some(PathBuf::from("notes")),
        })
        .unwrap();
    assert!(created.contains("Repository \"docs.vcr\" has been created and saved."));
    (temp, live)
}

fn list_json(workspace: &Path, revision: Option<i64>) -> serde_json::Value {
    let output = context(workspace, None, None)
        .execute(&Commands::List {
            revision,
            format: "json".to_string(),
        })
        .unwrap();
    serde_json::from_str(&output).unwrap()
}

#[test]
fn new_repository_is_discovered_and_committed() {
    let (temp, _live) = setup();
    assert!(temp.path().join("docs.vcr").is_file());

    let listing = list_json(temp.path(), None);
    assert_eq!(listing["repository"], "docs.vcr");
    assert_eq!(listing["branch"], "trunk");
    assert_eq!(listing["default_branch"], "trunk");
    assert_eq!(listing["revisions"].as_array().unwrap().len(), 1);
    assert!(listing["path"].as_str().unwrap().ends_with("notes"));
}

#[test]
fn commit_reports_change_or_abort() {
    let (temp, live) = setup();
    let cli = context(temp.path(), None, None);

    let unchanged = cli
        .execute(&Commands::Commit { description: None })
        .unwrap();
    assert_eq!(unchanged, "Nothing changed. Commit aborted.");

    fs::write(live.join("todo.txt"), "buy oat milk").unwrap();
    let committed = cli
        .execute(&Commands::Commit {
            description: Some("milk preference".to_string()),
        })
        .unwrap();
    assert_eq!(
        committed,
        "Revision committed to the branch \"trunk\" of repository \"docs.vcr\"."
    );

    let listing = list_json(temp.path(), None);
    let revisions = listing["revisions"].as_array().unwrap();
    assert_eq!(revisions.len(), 2);
    assert_eq!(revisions[1]["number"], 1);
    assert_eq!(revisions[1]["description"], "milk preference");
}

#[test]
fn revision_detail_marks_changed_files() {
    let (temp, live) = setup();
    fs::write(live.join("ideas.txt"), "more tests").unwrap();
    context(temp.path(), None, None)
        .execute(&Commands::Commit { description: None })
        .unwrap();

    let detail = list_json(temp.path(), Some(-1));
    assert_eq!(detail["revision"]["number"], 1);
    let files = detail["files"].as_array().unwrap();
    let flag = |name: &str| {
        files
            .iter()
            .find(|f| f["path"].as_str().unwrap().ends_with(name))
            .map(|f| f["changed"].as_bool().unwrap())
            .unwrap()
    };
    assert!(flag("ideas.txt"));
    assert!(!flag("todo.txt"));
}

#[test]
fn update_replaces_directory_without_saving_backup() {
    let (temp, live) = setup();
    let cli = context(temp.path(), None, None);
    fs::write(live.join("todo.txt"), "changed").unwrap();
    cli.execute(&Commands::Commit { description: None }).unwrap();
    fs::write(live.join("scratch.txt"), "temporary").unwrap();

    let output = cli.execute(&Commands::Update { revision: 0 }).unwrap();
    assert_eq!(output, "Data updated to revision 0 of branch \"trunk\".");
    assert_eq!(fs::read_to_string(live.join("todo.txt")).unwrap(), "buy milk");
    assert!(!live.join("scratch.txt").exists());

    let listing = list_json(temp.path(), None);
    assert_eq!(listing["revisions"].as_array().unwrap().len(), 2);
}

#[test]
fn verbose_output_lists_processed_entries() {
    let (temp, live) = setup();
    fs::write(live.join("todo.txt"), "changed").unwrap();
    let output = context(temp.path(), None, None)
        .with_verbose(true)
        .execute(&Commands::Commit { description: None })
        .unwrap();
    assert!(output.contains("todo.txt *"));
    assert!(output.contains("Revision 1 processed."));
    assert!(output.ends_with("of repository \"docs.vcr\"."));
}

#[test]
fn branch_management_commands() {
    let (temp, _live) = setup();
    let other = temp.path().join("other");
    fs::create_dir(&other).unwrap();

    let created = context(temp.path(), None, Some("side"))
        .execute(&Commands::New {
            path: Some(other.clone()),
        })
        .unwrap();
    assert!(created.starts_with("Branch \"side\" has been created and saved."));

    let cli = context(temp.path(), None, None);
    assert_eq!(
        cli.execute(&Commands::Def {
            name: "side".to_string()
        })
        .unwrap(),
        "Default branch set to \"side\"."
    );
    assert_eq!(
        cli.execute(&Commands::Del {
            name: "trunk".to_string()
        })
        .unwrap(),
        "Branch \"trunk\" deleted."
    );
    assert_eq!(
        cli.execute(&Commands::Ren {
            new_name: "main".to_string()
        })
        .unwrap(),
        "Branch \"side\" renamed to \"main\"."
    );
    let described = cli
        .execute(&Commands::Desc {
            revision: 0,
            description: "baseline".to_string(),
        })
        .unwrap();
    assert_eq!(
        described,
        "Description of revision 0 of branch \"main\" set to:\nbaseline"
    );

    let listing = list_json(temp.path(), None);
    assert_eq!(listing["default_branch"], "main");
    assert_eq!(listing["branches"], serde_json::json!(["main"]));
    assert_eq!(listing["revisions"][0]["description"], "baseline");
}

#[test]
fn new_branch_defaults_to_default_branch_path() {
    let (temp, _live) = setup();
    context(temp.path(), None, Some("copy"))
        .execute(&Commands::New { path: None })
        .unwrap();
    let output = context(temp.path(), None, Some("copy"))
        .execute(&Commands::List {
            revision: None,
            format: "json".to_string(),
        })
        .unwrap();
    let listing: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert!(listing["path"].as_str().unwrap().ends_with("notes"));
    assert_eq!(listing["revisions"].as_array().unwrap().len(), 1);
}

#[test]
fn path_command_rebinds_branch() {
    let (temp, _live) = setup();
    let moved = temp.path().join("moved");
    fs::create_dir(&moved).unwrap();
    let output = context(temp.path(), None, None)
        .execute(&Commands::Path {
            path: PathBuf::from("moved"),
        })
        .unwrap();
    assert!(output.starts_with("Path of branch \"trunk\" set to"));
    let listing = list_json(temp.path(), None);
    assert!(listing["path"].as_str().unwrap().ends_with("moved"));
}

#[test]
fn configured_default_branch_names_new_repositories() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("data")).unwrap();
    let mut config = VercontConfig::default();
    config.repository.default_branch = "main".to_string();
    CliContext::with_config(temp.path().to_path_buf(), config)
        .with_session(Session {
            repository: Some("data".to_string()),
            branch: None,
        })
        .execute(&Commands::New {
            path: Some(PathBuf::from("data")),
        })
        .unwrap();
    assert_eq!(list_json(temp.path(), None)["default_branch"], "main");
}

#[test]
fn usage_and_repository_errors() {
    let temp = TempDir::new().unwrap();
    let missing = context(temp.path(), None, None)
        .execute(&Commands::Commit { description: None })
        .unwrap_err();
    assert!(matches!(missing, ApiError::Usage(_)));

    let no_path = context(temp.path(), Some("docs"), None)
        .execute(&Commands::New { path: None })
        .unwrap_err();
    assert!(matches!(no_path, ApiError::Usage(_)));

    let (temp, _live) = setup();
    let cli = context(temp.path(), None, None);
    assert!(matches!(
        cli.execute(&Commands::Del {
            name: "trunk".to_string()
        }),
        Err(ApiError::Repository(RepoError::DefaultBranchRemoval(_)))
    ));
    assert!(matches!(
        cli.execute(&Commands::Update { revision: 5 }),
        Err(ApiError::Repository(RepoError::NoSuchRevision(5)))
    ));
    assert!(matches!(
        context(temp.path(), None, Some("ghost")).execute(&Commands::Commit { description: None }),
        Err(ApiError::Repository(RepoError::NoSuchBranch(_)))
    ));
    assert!(matches!(
        context(temp.path(), None, None).execute(&Commands::New { path: None }),
        Err(ApiError::Usage(_))
    ));

    fs::write(temp.path().join("second.vcr"), "x").unwrap();
    assert!(matches!(
        context(temp.path(), None, None).execute(&Commands::Commit { description: None }),
        Err(ApiError::Usage(_))
    ));
}
