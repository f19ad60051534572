//! ZIP archive creation from a file listing.

use crate::BackupConfig;
use crate::BackupError;
use crate::CompressionMethod;
use crate::ProgressCallback;
use crate::Result;
use crate::creation::entry::ListedPath;
use crate::creation::report::CreationReport;
use chrono::DateTime;
use chrono::Datelike;
use chrono::Local;
use chrono::Timelike;
use std::collections::HashSet;
use std::fs;
use std::fs::File;
use std::fs::Metadata;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Writes every listed path into a new zip archive at `output`.
///
/// Each path is resolved by joining it onto `config.src_dir`. With
/// `config.basename` set, entries are stored under a root folder named after
/// the source directory; otherwise under the bare relative path. The local
/// save directory is created if needed. On failure the partially written
/// archive is removed. A path that maps to an entry already written is
/// skipped with a warning in the report.
///
/// # Examples
///
/// ```no_run
/// use rbackup_core::BackupConfig;
/// use rbackup_core::NoopProgress;
/// use rbackup_core::creation::create_archive;
/// use std::path::Path;
///
/// let config = BackupConfig::new("/data/proj", "/backups", "filter.txt");
/// let files = vec!["a.txt".to_string(), "sub/b.txt".to_string()];
/// let report = create_archive(
///     &config,
///     &files,
///     Path::new("/backups/proj_25-01-01.zip"),
///     &mut NoopProgress,
/// )?;
/// assert_eq!(report.files_added, 2);
/// # Ok::<(), rbackup_core::BackupError>(())
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - A listed path is invalid ([`BackupError::InvalidEntryPath`])
/// - A listed file cannot be read ([`BackupError::Io`])
/// - The zip writer fails ([`BackupError::ArchiveWriteFailed`])
pub fn create_archive<S: AsRef<str>>(
    config: &BackupConfig,
    files: &[S],
    output: &Path,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    let start = Instant::now();
    let root = if config.basename {
        Some(config.source_basename()?)
    } else {
        None
    };

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    tracing::info!("Creating zip file '{}'", output.display());
    let file = File::create(output)?;

    let result = write_entries(file, config, root, files, output, progress);
    let mut report = match result {
        Ok(report) => report,
        Err(err) => {
            if let Err(cleanup) = fs::remove_file(output) {
                tracing::warn!(
                    "Could not remove incomplete archive '{}': {cleanup}",
                    output.display()
                );
            }
            return Err(err);
        }
    };

    report.bytes_compressed = fs::metadata(output)?.len();
    if output.starts_with(&config.src_dir) {
        report.add_warning(format!(
            "archive '{}' is inside the source directory and may be picked up by later backups",
            output.display()
        ));
    }
    report.duration = start.elapsed();
    progress.on_complete();

    Ok(report)
}

/// Writes the listing into any seekable writer and finalizes the archive.
fn write_entries<W: Write + Seek, S: AsRef<str>>(
    writer: W,
    config: &BackupConfig,
    root: Option<&str>,
    files: &[S],
    output: &Path,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    let mut zip = ZipWriter::new(writer);
    let mut report = CreationReport::default();
    let options = base_options(config.compression);
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let total = files.len();
    let mut written = HashSet::new();

    for (idx, listed) in files.iter().enumerate() {
        let listed = listed.as_ref();
        let mut entry = ListedPath::parse(listed)?;
        let source = entry.source_path(&config.src_dir);
        let metadata = fs::metadata(&source)?;
        if metadata.is_dir() {
            entry = entry.into_dir();
        }
        let name = entry.archive_name(root);
        if !written.insert(name.clone()) {
            tracing::warn!("Skipping '{listed}': entry '{name}' is already in the archive");
            report.add_warning(format!("duplicate entry '{name}' from '{listed}' skipped"));
            continue;
        }

        progress.on_entry_start(&name, total, idx + 1);
        tracing::debug!("Writing '{}' to archive", source.display());

        let entry_options = with_metadata(options, &metadata);
        if entry.is_dir() {
            zip.add_directory(&name, entry_options)
                .map_err(|e| write_failed(output, &e))?;
            report.directories_added += 1;
        } else {
            let large = metadata.len() >= u64::from(u32::MAX);
            zip.start_file(&name, entry_options.large_file(large))
                .map_err(|e| write_failed(output, &e))?;
            let mut file = File::open(&source)?;
            report.bytes_written += copy_into(&mut file, &mut zip, &mut buffer, progress)?;
            report.files_added += 1;
        }

        progress.on_entry_complete(&name);
    }

    zip.finish().map_err(|e| write_failed(output, &e))?;

    Ok(report)
}

fn base_options(compression: CompressionMethod) -> SimpleFileOptions {
    let method = match compression {
        CompressionMethod::Lzma => zip::CompressionMethod::Lzma,
        CompressionMethod::Deflate => zip::CompressionMethod::Deflated,
        CompressionMethod::Stored => zip::CompressionMethod::Stored,
    };
    SimpleFileOptions::default().compression_method(method)
}

/// Carries the modification time and, on unix, the permission bits.
fn with_metadata(options: SimpleFileOptions, metadata: &Metadata) -> SimpleFileOptions {
    let options = match metadata.modified().ok().and_then(to_zip_time) {
        Some(time) => options.last_modified_time(time),
        None => options,
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options.unix_permissions(metadata.permissions().mode())
    }
    #[cfg(not(unix))]
    {
        options
    }
}

/// Converts to a zip timestamp; `None` outside the DOS range (1980-2107).
fn to_zip_time(modified: std::time::SystemTime) -> Option<zip::DateTime> {
    let local: DateTime<Local> = modified.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        u8::try_from(local.month()).ok()?,
        u8::try_from(local.day()).ok()?,
        u8::try_from(local.hour()).ok()?,
        u8::try_from(local.minute()).ok()?,
        u8::try_from(local.second()).ok()?,
    )
    .ok()
}

fn copy_into<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut [u8],
    progress: &mut dyn ProgressCallback,
) -> Result<u64> {
    let mut copied = 0u64;
    loop {
        let read = reader.read(buffer)?;
        if read == 0 {
            break;
        }
        writer.write_all(&buffer[..read])?;
        copied += read as u64;
        progress.on_bytes_written(read as u64);
    }
    Ok(copied)
}

fn write_failed(output: &Path, err: &zip::result::ZipError) -> BackupError {
    BackupError::ArchiveWriteFailed {
        path: output.to_path_buf(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::NoopProgress;
    use tempfile::TempDir;

    /// Source tree `<temp>/proj/{a.txt, sub/b.txt}` and an output directory.
    fn project() -> (TempDir, BackupConfig) {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("proj");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("a.txt"), "alpha").unwrap();
        fs::write(src.join("sub/b.txt"), "bravo".repeat(100)).unwrap();
        let config = BackupConfig::new(&src, temp.path().join("out"), temp.path().join("f.txt"))
            .with_compression(CompressionMethod::Deflate);
        (temp, config)
    }

    fn entry_names(path: &Path) -> Vec<String> {
        let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        archive.file_names().map(String::from).collect::<Vec<_>>()
    }

    fn sorted(mut names: Vec<String>) -> Vec<String> {
        names.sort();
        names
    }

    #[test]
    fn test_entries_under_basename_root() {
        let (temp, config) = project();
        let output = temp.path().join("out/proj.zip");

        let report =
            create_archive(&config, &["a.txt", "sub/b.txt"], &output, &mut NoopProgress).unwrap();

        assert_eq!(report.files_added, 2);
        assert_eq!(
            sorted(entry_names(&output)),
            vec!["proj/a.txt", "proj/sub/b.txt"]
        );
    }

    #[test]
    fn test_entries_without_basename_root() {
        let (temp, config) = project();
        let config = config.with_basename(false);
        let output = temp.path().join("out/proj.zip");

        create_archive(&config, &["a.txt", "sub/b.txt"], &output, &mut NoopProgress).unwrap();

        assert_eq!(sorted(entry_names(&output)), vec!["a.txt", "sub/b.txt"]);
    }

    #[test]
    fn test_directory_entries() {
        let (temp, config) = project();
        let output = temp.path().join("out/proj.zip");

        let report = create_archive(
            &config,
            &["a.txt", "sub/", "sub/b.txt"],
            &output,
            &mut NoopProgress,
        )
        .unwrap();

        assert_eq!(report.files_added, 2);
        assert_eq!(report.directories_added, 1);
        assert_eq!(report.entries_added(), 3);

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let dir = archive.by_name("proj/sub/").unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_directory_without_trailing_slash() {
        let (temp, config) = project();
        let output = temp.path().join("out/proj.zip");

        let report = create_archive(&config, &["sub"], &output, &mut NoopProgress).unwrap();

        assert_eq!(report.directories_added, 1);
        assert_eq!(entry_names(&output), vec!["proj/sub/"]);
    }

    #[test]
    fn test_contents_roundtrip() {
        let (temp, config) = project();
        let output = temp.path().join("out/proj.zip");

        create_archive(&config, &["sub/b.txt"], &output, &mut NoopProgress).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let mut entry = archive.by_name("proj/sub/b.txt").unwrap();
        let mut contents = String::new();
        entry.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "bravo".repeat(100));
    }

    #[test]
    fn test_lzma_entries() {
        let (temp, config) = project();
        let config = config.with_compression(CompressionMethod::Lzma);
        let output = temp.path().join("out/proj.zip");

        create_archive(&config, &["a.txt"], &output, &mut NoopProgress).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let entry = archive.by_name("proj/a.txt").unwrap();
        assert_eq!(entry.compression(), zip::CompressionMethod::Lzma);
    }

    #[test]
    fn test_stored_entries() {
        let (temp, config) = project();
        let config = config.with_compression(CompressionMethod::Stored);
        let output = temp.path().join("out/proj.zip");

        create_archive(&config, &["a.txt"], &output, &mut NoopProgress).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let entry = archive.by_name("proj/a.txt").unwrap();
        assert_eq!(entry.compression(), zip::CompressionMethod::Stored);
    }

    #[test]
    fn test_report_sizes() {
        let (temp, config) = project();
        let output = temp.path().join("out/proj.zip");

        let report =
            create_archive(&config, &["a.txt", "sub/b.txt"], &output, &mut NoopProgress).unwrap();

        assert_eq!(report.bytes_written, 5 + 500);
        assert_eq!(report.bytes_compressed, fs::metadata(&output).unwrap().len());
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_duplicate_entry_names_written_once() {
        let (temp, config) = project();
        let output = temp.path().join("out/proj.zip");

        let report = create_archive(
            &config,
            &["a.txt", "./a.txt", "sub", "sub/"],
            &output,
            &mut NoopProgress,
        )
        .unwrap();

        assert_eq!(report.files_added, 1);
        assert_eq!(report.directories_added, 1);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].contains("'./a.txt'"));
        assert_eq!(
            sorted(entry_names(&output)),
            vec!["proj/a.txt", "proj/sub/"]
        );
    }

    #[test]
    fn test_missing_file_aborts_and_removes_output() {
        let (temp, config) = project();
        let output = temp.path().join("out/proj.zip");

        let err = create_archive(&config, &["a.txt", "gone.txt"], &output, &mut NoopProgress)
            .unwrap_err();

        assert!(matches!(err, BackupError::Io(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_parent_traversal_aborts() {
        let (temp, config) = project();
        let output = temp.path().join("out/proj.zip");

        let err =
            create_archive(&config, &["../f.txt"], &output, &mut NoopProgress).unwrap_err();

        assert!(matches!(err, BackupError::InvalidEntryPath { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_output_inside_source_warns() {
        let (_temp, config) = project();
        let output = config.src_dir.join("self.zip");

        let report = create_archive(&config, &["a.txt"], &output, &mut NoopProgress).unwrap();

        assert!(report.has_warnings());
        assert!(report.warnings[0].contains("inside the source directory"));
    }

    #[cfg(unix)]
    #[test]
    fn test_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (temp, config) = project();
        let script = config.src_dir.join("run.sh");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        let output = temp.path().join("out/proj.zip");

        create_archive(&config, &["run.sh"], &output, &mut NoopProgress).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let entry = archive.by_name("proj/run.sh").unwrap();
        assert_eq!(entry.unix_mode().unwrap() & 0o777, 0o755);
    }

    #[test]
    fn test_progress_callbacks() {
        #[derive(Default)]
        struct Recorder {
            started: Vec<(String, usize, usize)>,
            completed: Vec<String>,
            bytes: u64,
            finished: bool,
        }

        impl ProgressCallback for Recorder {
            fn on_entry_start(&mut self, name: &str, total: usize, current: usize) {
                self.started.push((name.to_string(), total, current));
            }

            fn on_bytes_written(&mut self, bytes: u64) {
                self.bytes += bytes;
            }

            fn on_entry_complete(&mut self, name: &str) {
                self.completed.push(name.to_string());
            }

            fn on_complete(&mut self) {
                self.finished = true;
            }
        }

        let (temp, config) = project();
        let output = temp.path().join("out/proj.zip");
        let mut recorder = Recorder::default();

        create_archive(&config, &["a.txt", "sub/b.txt"], &output, &mut recorder).unwrap();

        assert_eq!(
            recorder.started,
            vec![
                ("proj/a.txt".to_string(), 2, 1),
                ("proj/sub/b.txt".to_string(), 2, 2),
            ]
        );
        assert_eq!(recorder.completed, vec!["proj/a.txt", "proj/sub/b.txt"]);
        assert_eq!(recorder.bytes, 505);
        assert!(recorder.finished);
    }
}
