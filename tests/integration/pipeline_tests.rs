use clap::Parser;
use dupresolve::actions::ActionKind;
use dupresolve::cli::Cli;
use dupresolve::config::ConfigError;
use dupresolve::duplicates::DupList;
use dupresolve::error::ExitCode;
use dupresolve::run_app;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Run the pipeline with an empty config file so user settings never leak in.
fn run(dir: &TempDir, args: &[&str]) -> anyhow::Result<ExitCode> {
    let config = dir.path().join("config.toml");
    if !config.exists() {
        fs::write(&config, "").unwrap();
    }
    let mut argv = vec!["dupresolve", "--config", config.to_str().unwrap(), "-q"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

fn touch(dir: &Path, rel: &str) -> PathBuf {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"same content").unwrap();
    path
}

fn read_actions(path: &Path) -> DupList {
    let (list, errors) = DupList::from_action_file(&fs::read_to_string(path).unwrap());
    assert!(errors.is_empty());
    list
}

#[test]
fn test_report_suggest_write() {
    let dir = tempdir().unwrap();
    let report = dir.path().join("report.txt");
    fs::write(
        &report,
        "-----------------------------------DUPlicate files\n\
         /photos/a.jpg\n/photos/2019/a.jpg\n\n\
         /x/b.jpg\n/y/b.jpg\n",
    )
    .unwrap();
    let out = dir.path().join("actions.tsv");

    let code = run(
        &dir,
        &["-f", report.to_str().unwrap(), "-s", "-o", out.to_str().unwrap()],
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);

    let list = read_actions(&out);
    assert_eq!(list.len(), 2);
    assert_eq!(
        list.groups()[0].annotation(),
        vec![ActionKind::Delete, ActionKind::Keep]
    );
    assert_eq!(
        list.groups()[1].annotation(),
        vec![ActionKind::Unknown, ActionKind::Unknown]
    );
}

#[test]
fn test_report_without_suggest_is_all_unknown() {
    let dir = tempdir().unwrap();
    let report = dir.path().join("report.txt");
    fs::write(&report, "/a/x.jpg\n/a/b/x.jpg\n").unwrap();
    let out = dir.path().join("actions.tsv");

    run(&dir, &["-f", report.to_str().unwrap(), "-o", out.to_str().unwrap()]).unwrap();

    let list = read_actions(&out);
    assert_eq!(list.len(), 1);
    assert_eq!(list.groups()[0].unknown_count(), 2);
}

#[test]
fn test_no_keeps_filter() {
    let dir = tempdir().unwrap();
    let actions = dir.path().join("in.tsv");
    fs::write(&actions, "K\t/a.jpg\nK\t/b.jpg\n\nK\t/c.jpg\n?\t/d.jpg\n").unwrap();
    let out = dir.path().join("out.tsv");

    run(
        &dir,
        &["-t", actions.to_str().unwrap(), "-K", "-o", out.to_str().unwrap()],
    )
    .unwrap();

    let list = read_actions(&out);
    assert_eq!(list.len(), 1);
    assert_eq!(list.groups()[0].paths()[0], Path::new("/c.jpg"));
}

#[test]
fn test_suggest_then_no_keeps_drops_print_groups() {
    let dir = tempdir().unwrap();
    let actions = dir.path().join("in.tsv");
    fs::write(&actions, "?\t/prints/a.jpg\n?\t/Prints/b/a.jpg\n").unwrap();
    let out = dir.path().join("out.tsv");

    run(
        &dir,
        &["-t", actions.to_str().unwrap(), "-s", "-K", "-o", out.to_str().unwrap()],
    )
    .unwrap();

    assert!(read_actions(&out).is_empty());
}

#[test]
fn test_apply_permanent_from_action_file() {
    let dir = tempdir().unwrap();
    let keep = touch(dir.path(), "photos/2019/a.jpg");
    let doomed = touch(dir.path(), "photos/a.jpg");
    let moved = touch(dir.path(), "inbox/b.jpg");
    let dest = dir.path().join("photos/b.jpg");

    let actions = dir.path().join("in.tsv");
    fs::write(
        &actions,
        format!(
            "K\t{}\nD\t{}\n\nR\t{}\t{}\n",
            keep.display(),
            doomed.display(),
            moved.display(),
            dest.display()
        ),
    )
    .unwrap();

    run(
        &dir,
        &["-t", actions.to_str().unwrap(), "--apply", "--permanent"],
    )
    .unwrap();

    assert!(keep.exists());
    assert!(!doomed.exists());
    assert!(!moved.exists());
    assert!(dest.exists());
}

#[test]
fn test_apply_dry_run_leaves_files() {
    let dir = tempdir().unwrap();
    let a = touch(dir.path(), "a.jpg");
    let b = touch(dir.path(), "sub/a.jpg");
    let report = dir.path().join("report.txt");
    fs::write(&report, format!("{}\n{}\n", a.display(), b.display())).unwrap();

    run(
        &dir,
        &["-f", report.to_str().unwrap(), "-s", "-a", "-n", "--permanent"],
    )
    .unwrap();

    assert!(a.exists());
    assert!(b.exists());
}

#[test]
fn test_apply_failure_is_not_fatal() {
    let dir = tempdir().unwrap();
    let existing = touch(dir.path(), "exists.jpg");
    let missing = dir.path().join("missing.jpg");
    let actions = dir.path().join("in.tsv");
    fs::write(
        &actions,
        format!("D\t{}\nD\t{}\n", missing.display(), existing.display()),
    )
    .unwrap();

    let code = run(
        &dir,
        &["-t", actions.to_str().unwrap(), "-a", "--permanent"],
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(!existing.exists());
}

#[test]
fn test_malformed_lines_are_not_fatal() {
    let dir = tempdir().unwrap();
    let actions = dir.path().join("in.tsv");
    fs::write(&actions, "K\t/a.jpg\nZ\t/b.jpg\nR\t/c.jpg\nD\t/d.jpg\n").unwrap();
    let out = dir.path().join("out.tsv");

    run(&dir, &["-t", actions.to_str().unwrap(), "-o", out.to_str().unwrap()]).unwrap();

    let list = read_actions(&out);
    assert_eq!(list.action_count(), 2);
}

#[test]
fn test_no_input_is_fatal() {
    let dir = tempdir().unwrap();
    let err = run(&dir, &["-s"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::NoInput)
    ));
}

#[test]
fn test_conflicting_inputs_are_fatal() {
    let dir = tempdir().unwrap();
    let err = run(&dir, &["-f", "r.txt", "-t", "a.tsv"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::ConflictingInputs)
    ));
}

#[test]
fn test_unreadable_input_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.txt");
    let err = run(&dir, &["-f", missing.to_str().unwrap()]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::InputRead { .. })
    ));
}

#[test]
fn test_unwritable_output_is_fatal() {
    let dir = tempdir().unwrap();
    let report = dir.path().join("report.txt");
    fs::write(&report, "/a.jpg\n/b.jpg\n").unwrap();
    let out = dir.path().join("missing-dir").join("out.tsv");

    let err = run(
        &dir,
        &["-f", report.to_str().unwrap(), "-o", out.to_str().unwrap()],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::OutputWrite { .. })
    ));
}

#[test]
fn test_invalid_cli_pattern_is_fatal() {
    let dir = tempdir().unwrap();
    let report = dir.path().join("report.txt");
    fs::write(&report, "/a.jpg\n/b.jpg\n").unwrap();

    let err = run(
        &dir,
        &["-f", report.to_str().unwrap(), "-s", "--keep-pattern", "(oops"],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::InvalidPattern { .. })
    ));
}
