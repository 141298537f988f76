use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use vercont::tooling::cli::{Cli, Commands};

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["vercont", "commit"],
        vec!["vercont", "c", "fixed the intro"],
        vec!["vercont", "update", "3"],
        vec!["vercont", "u", "-1"],
        vec!["vercont", "list"],
        vec!["vercont", "l", "-2", "--format", "json"],
        vec!["vercont", "new", "./docs"],
        vec!["vercont", "-b", "side", "new"],
        vec!["vercont", "del", "side"],
        vec!["vercont", "ren", "main"],
        vec!["vercont", "path", "/srv/docs"],
        vec!["vercont", "desc", "-1", "release candidate"],
        vec!["vercont", "def", "main"],
        vec!["vercont", "--workspace", "/tmp", "--verbose", "commit"],
        vec!["vercont", "--log-level", "debug", "--log-format", "json", "list"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_invalid_invocations() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["vercont"],
        vec!["vercont", "update"],
        vec!["vercont", "update", "latest"],
        vec!["vercont", "list", "--format", "xml"],
        vec!["vercont", "del"],
        vec!["vercont", "desc", "1"],
        vec!["vercont", "frobnicate"],
    ];

    for args in cases {
        assert!(
            Cli::try_parse_from(args.clone()).is_err(),
            "expected parse failure for args: {args:?}"
        );
    }
}

#[test]
fn negative_revisions_parse_as_numbers() {
    let cli = Cli::try_parse_from(["vercont", "u", "-3"]).unwrap();
    assert_eq!(cli.command, Commands::Update { revision: -3 });

    let cli = Cli::try_parse_from(["vercont", "desc", "-1", "final"]).unwrap();
    assert_eq!(
        cli.command,
        Commands::Desc {
            revision: -1,
            description: "final".to_string()
        }
    );
}

#[test]
fn session_options_are_global() {
    let before = Cli::try_parse_from(["vercont", "-r", "docs", "-b", "side", "commit"]).unwrap();
    let after =
        Cli::try_parse_from(["vercont", "commit", "--repo", "docs", "--branch", "side"]).unwrap();
    assert_eq!(before.session(), after.session());
    assert_eq!(before.session().repository.as_deref(), Some("docs"));
    assert_eq!(before.session().branch.as_deref(), Some("side"));
}

#[test]
fn defaults_are_applied() {
    let cli = Cli::try_parse_from(["vercont", "list"]).unwrap();
    assert_eq!(cli.workspace, PathBuf::from("."));
    assert!(!cli.verbose);
    assert_eq!(
        cli.command,
        Commands::List {
            revision: None,
            format: "text".to_string()
        }
    );
}

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}
