//! Integration tests for rbackup-core.
//!
//! These tests run the whole pipeline against real files, with the external
//! sync tool replaced by an in-process fake.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::NaiveDate;
use chrono::NaiveDateTime;
use rbackup_core::BackupConfig;
use rbackup_core::BackupError;
use rbackup_core::CompressionMethod;
use rbackup_core::NoopProgress;
use rbackup_core::Prompt;
use rbackup_core::Result;
use rbackup_core::SyncTool;
use rbackup_core::UploadOutcome;
use rbackup_core::list_sources;
use rbackup_core::run_backup;
use std::cell::RefCell;
use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

/// Fake rclone: returns a fixed listing and records copies.
struct FakeTool {
    listing: Vec<String>,
    listed: RefCell<Vec<(PathBuf, PathBuf)>>,
    copies: RefCell<Vec<(PathBuf, String)>>,
}

impl FakeTool {
    fn new(listing: &[&str]) -> Self {
        Self {
            listing: listing.iter().map(|s| (*s).to_string()).collect(),
            listed: RefCell::new(Vec::new()),
            copies: RefCell::new(Vec::new()),
        }
    }
}

impl SyncTool for FakeTool {
    fn list_files(&self, src_dir: &Path, filter_file: &Path) -> Result<Vec<String>> {
        self.listed
            .borrow_mut()
            .push((src_dir.to_path_buf(), filter_file.to_path_buf()));
        Ok(self.listing.clone())
    }

    fn copy(&self, local_path: &Path, remote_target: &str) -> Result<()> {
        self.copies
            .borrow_mut()
            .push((local_path.to_path_buf(), remote_target.to_string()));
        Ok(())
    }
}

/// Prompt returning a fixed answer and counting how often it was asked.
struct ScriptedPrompt {
    answer: &'static str,
    asked: usize,
}

impl ScriptedPrompt {
    fn answering(answer: &'static str) -> Self {
        Self { answer, asked: 0 }
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, _question: &str) -> std::io::Result<String> {
        self.asked += 1;
        Ok(self.answer.to_string())
    }
}

struct Fixture {
    _temp: TempDir,
    config: BackupConfig,
}

/// Creates `<temp>/proj` with `a.txt` and `sub/b.txt`, a filter file and an
/// output directory.
fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("proj");
    fs::create_dir_all(src.join("sub")).unwrap();
    fs::write(src.join("a.txt"), "alpha").unwrap();
    fs::write(src.join("sub/b.txt"), "bravo").unwrap();
    let filter = temp.path().join("filter.txt");
    fs::write(&filter, "- *.tmp\n+ **\n").unwrap();

    let config = BackupConfig::new(&src, temp.path().join("backups"), &filter)
        .with_remote("gdrive", "archive/proj")
        .with_compression(CompressionMethod::Deflate);

    Fixture {
        _temp: temp,
        config,
    }
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(14, 30, 5)
        .unwrap()
}

fn entry_names(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    names
}

#[test]
fn test_backup_stores_entries_under_source_basename() {
    let fx = fixture();
    let tool = FakeTool::new(&["a.txt", "sub/b.txt"]);

    let outcome = run_backup(
        &fx.config,
        &tool,
        &mut ScriptedPrompt::answering("n"),
        &mut NoopProgress,
        &now(),
    )
    .unwrap();

    assert_eq!(
        entry_names(&outcome.archive),
        vec!["proj/a.txt", "proj/sub/b.txt"]
    );
}

#[test]
fn test_backup_without_basename_uses_relative_paths() {
    let fx = fixture();
    let config = fx.config.clone().with_basename(false);
    let tool = FakeTool::new(&["a.txt", "sub/b.txt"]);

    let outcome = run_backup(
        &config,
        &tool,
        &mut ScriptedPrompt::answering("n"),
        &mut NoopProgress,
        &now(),
    )
    .unwrap();

    assert_eq!(entry_names(&outcome.archive), vec!["a.txt", "sub/b.txt"]);
}

#[test]
fn test_archive_name_and_location() {
    let fx = fixture();
    let tool = FakeTool::new(&["a.txt"]);

    let outcome = run_backup(
        &fx.config,
        &tool,
        &mut ScriptedPrompt::answering("n"),
        &mut NoopProgress,
        &now(),
    )
    .unwrap();
    assert_eq!(
        outcome.archive,
        fx.config.local_save_dir.join("proj_25-06-01.zip")
    );
    assert!(outcome.archive.is_file());

    let config = fx.config.clone().with_time_in_filename(true);
    let outcome = run_backup(
        &config,
        &tool,
        &mut ScriptedPrompt::answering("n"),
        &mut NoopProgress,
        &now(),
    )
    .unwrap();
    assert_eq!(
        outcome.archive,
        fx.config.local_save_dir.join("proj_25-06-01_143005.zip")
    );
}

#[test]
fn test_report_matches_listing_and_disk() {
    let fx = fixture();
    let tool = FakeTool::new(&["a.txt", "sub/", "sub/b.txt"]);

    let outcome = run_backup(
        &fx.config,
        &tool,
        &mut ScriptedPrompt::answering("n"),
        &mut NoopProgress,
        &now(),
    )
    .unwrap();

    assert_eq!(outcome.info.entry_count, 3);
    assert_eq!(outcome.creation.entries_added(), 3);
    assert_eq!(
        outcome.info.size_bytes,
        fs::metadata(&outcome.archive).unwrap().len()
    );
}

#[test]
fn test_listing_uses_configured_paths() {
    let fx = fixture();
    let tool = FakeTool::new(&["a.txt"]);

    let files = list_sources(&fx.config, &tool).unwrap();

    assert_eq!(files, vec!["a.txt"]);
    assert_eq!(
        *tool.listed.borrow(),
        vec![(fx.config.src_dir.clone(), fx.config.filter_file.clone())]
    );
}

#[test]
fn test_upload_disabled() {
    let fx = fixture();
    let tool = FakeTool::new(&["a.txt"]);
    let mut prompt = ScriptedPrompt::answering("Y");

    let outcome =
        run_backup(&fx.config, &tool, &mut prompt, &mut NoopProgress, &now()).unwrap();

    assert_eq!(outcome.upload, UploadOutcome::Disabled);
    assert_eq!(prompt.asked, 0);
    assert!(tool.copies.borrow().is_empty());
}

#[test]
fn test_upload_confirmed() {
    let fx = fixture();
    let config = fx.config.clone().with_save_remotely(true);
    let tool = FakeTool::new(&["a.txt"]);
    let mut prompt = ScriptedPrompt::answering("Y");

    let outcome = run_backup(&config, &tool, &mut prompt, &mut NoopProgress, &now()).unwrap();

    assert_eq!(prompt.asked, 1);
    assert_eq!(
        outcome.upload,
        UploadOutcome::Uploaded {
            target: "gdrive:archive/proj".into()
        }
    );
    assert_eq!(
        *tool.copies.borrow(),
        vec![(outcome.archive.clone(), "gdrive:archive/proj".to_string())]
    );
}

#[test]
fn test_upload_lowercase_declined() {
    let fx = fixture();
    let config = fx.config.clone().with_save_remotely(true);
    let tool = FakeTool::new(&["a.txt"]);
    let mut prompt = ScriptedPrompt::answering("y");

    let outcome = run_backup(&config, &tool, &mut prompt, &mut NoopProgress, &now()).unwrap();

    assert_eq!(outcome.upload, UploadOutcome::Declined);
    assert!(tool.copies.borrow().is_empty());
    assert!(outcome.archive.is_file());
}

#[test]
fn test_auto_upload_does_not_prompt() {
    let fx = fixture();
    let config = fx
        .config
        .clone()
        .with_save_remotely(true)
        .with_auto_upload(true);
    let tool = FakeTool::new(&["a.txt"]);
    let mut prompt = ScriptedPrompt::answering("n");

    let outcome = run_backup(&config, &tool, &mut prompt, &mut NoopProgress, &now()).unwrap();

    assert_eq!(prompt.asked, 0);
    assert!(matches!(outcome.upload, UploadOutcome::Uploaded { .. }));
}

#[test]
fn test_missing_filter_file_fails_before_listing() {
    let fx = fixture();
    fs::remove_file(&fx.config.filter_file).unwrap();
    let tool = FakeTool::new(&["a.txt"]);

    let err = run_backup(
        &fx.config,
        &tool,
        &mut ScriptedPrompt::answering("n"),
        &mut NoopProgress,
        &now(),
    )
    .unwrap_err();

    assert!(matches!(err, BackupError::FilterFileMissing { .. }));
    assert_eq!(err.exit_code(), 1);
    assert!(tool.listed.borrow().is_empty());
    assert!(!fx.config.local_save_dir.exists());
}

#[test]
fn test_unreadable_listing_entry_aborts_run() {
    let fx = fixture();
    let config = fx.config.clone().with_save_remotely(true).with_auto_upload(true);
    let tool = FakeTool::new(&["a.txt", "missing.txt"]);

    let err = run_backup(
        &config,
        &tool,
        &mut ScriptedPrompt::answering("Y"),
        &mut NoopProgress,
        &now(),
    )
    .unwrap_err();

    assert!(matches!(err, BackupError::Io(_)));
    assert!(tool.copies.borrow().is_empty());
    assert!(!config.local_save_dir.join("proj_25-06-01.zip").exists());
}
