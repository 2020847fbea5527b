use dupresolve::actions::{
    Action, ActionKind, ApplyError, ApplyOutcome, Executor, PermanentDelete,
};
use dupresolve::duplicates::{DupList, RuleChain};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn executor(dry_run: bool) -> Executor {
    Executor::new(Box::new(PermanentDelete), dry_run)
}

fn touch(dir: &TempDir, rel: &str) -> PathBuf {
    let path = dir.path().join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"duplicate").unwrap();
    path
}

fn report_for(paths: &[&Path]) -> String {
    paths
        .iter()
        .map(|p| format!("{}\n", p.display()))
        .collect()
}

#[test]
fn test_keep_and_unknown_are_noops() {
    let dir = tempdir().unwrap();
    let file = touch(&dir, "a.jpg");

    for kind in [ActionKind::Keep, ActionKind::Unknown] {
        let action = Action::new(kind, &file, vec![]).unwrap();
        assert_eq!(action.apply(&executor(false)).unwrap(), ApplyOutcome::Skipped);
    }
    assert!(file.exists());
}

#[test]
fn test_keep_on_missing_file_is_fine() {
    let action = Action::new(ActionKind::Keep, "/nonexistent/a.jpg", vec![]).unwrap();
    assert_eq!(action.apply(&executor(false)).unwrap(), ApplyOutcome::Skipped);
}

#[test]
fn test_delete_missing_target() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("gone.jpg");
    let action = Action::new(ActionKind::Delete, &missing, vec![]).unwrap();

    let err = action.apply(&executor(false)).unwrap_err();
    assert!(matches!(err, ApplyError::TargetMissing { .. }));
    assert_eq!(err.path(), missing);
    assert!(err.to_string().contains("file not found"));
}

#[test]
fn test_delete_directory_is_not_a_file() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("folder");
    fs::create_dir(&sub).unwrap();

    let action = Action::new(ActionKind::Delete, &sub, vec![]).unwrap();
    let err = action.apply(&executor(false)).unwrap_err();
    assert!(matches!(err, ApplyError::TargetMissing { .. }));
    assert!(sub.exists());
}

#[test]
fn test_rename_moves_file() {
    let dir = tempdir().unwrap();
    let from = touch(&dir, "inbox/a.jpg");
    let to = dir.path().join("archive.jpg");

    let action = Action::new(
        ActionKind::Rename,
        &from,
        vec![to.to_string_lossy().into_owned()],
    )
    .unwrap();
    assert_eq!(action.apply(&executor(false)).unwrap(), ApplyOutcome::Applied);
    assert!(!from.exists());
    assert_eq!(fs::read(&to).unwrap(), b"duplicate");
}

#[test]
fn test_rename_into_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let from = touch(&dir, "a.jpg");
    let to = dir.path().join("no/such/dir/a.jpg");

    let action = Action::new(
        ActionKind::Rename,
        &from,
        vec![to.to_string_lossy().into_owned()],
    )
    .unwrap();
    let err = action.apply(&executor(false)).unwrap_err();
    assert!(matches!(err, ApplyError::Execution(_)));
    assert!(from.exists());
}

#[test]
fn test_dry_run_still_checks_target() {
    let dir = tempdir().unwrap();
    let existing = touch(&dir, "a.jpg");
    let missing = dir.path().join("b.jpg");

    let ok = Action::new(ActionKind::Delete, &existing, vec![]).unwrap();
    assert_eq!(ok.apply(&executor(true)).unwrap(), ApplyOutcome::Simulated);
    assert!(existing.exists());

    let bad = Action::new(ActionKind::Delete, &missing, vec![]).unwrap();
    assert!(bad.apply(&executor(true)).is_err());
}

#[test]
fn test_list_apply_continues_after_failures() {
    let dir = tempdir().unwrap();
    let keep = touch(&dir, "photos/2019/a.jpg");
    let doomed = touch(&dir, "photos/a.jpg");
    let other_keep = touch(&dir, "x/y/b.jpg");
    let other_doomed = touch(&dir, "x/b.jpg");

    let report = format!(
        "{}\n{}",
        report_for(&[&doomed, &keep]),
        report_for(&[&other_doomed, &other_keep])
    );
    let mut list = DupList::from_report(&report, "DUPlicate files");
    list.annotate(&RuleChain::standard());

    // Remove one target behind the list's back
    fs::remove_file(&doomed).unwrap();

    let result = list.apply(&executor(false));
    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.failures[0].0, doomed);
    assert_eq!(result.applied, 1);
    assert!(keep.exists());
    assert!(other_keep.exists());
    assert!(!other_doomed.exists());
}

#[test]
fn test_list_apply_dry_run_summary() {
    let dir = tempdir().unwrap();
    let a = touch(&dir, "a.jpg");
    let b = touch(&dir, "sub/a.jpg");

    let mut list = DupList::from_report(&report_for(&[&a, &b]), "DUPlicate files");
    list.annotate(&RuleChain::standard());

    let result = list.apply(&executor(true));
    assert_eq!(result.simulated, 1);
    assert_eq!(result.skipped, 1);
    assert!(result.summary().starts_with("Dry run"));
    assert!(a.exists());
    assert!(b.exists());
}
