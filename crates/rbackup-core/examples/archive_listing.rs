//! Example: Archiving a listing without rclone
//!
//! Run with: `cargo run --example archive_listing`

use chrono::Local;
use rbackup_core::BackupConfig;
use rbackup_core::CompressionMethod;
use rbackup_core::NoopProgress;
use rbackup_core::creation::create_archive;
use rbackup_core::inspect_archive;
use rbackup_core::naming::archive_output_path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let src = temp.path().join("notes");
    std::fs::create_dir_all(src.join("drafts"))?;
    std::fs::write(src.join("todo.md"), "- write backups\n")?;
    std::fs::write(src.join("drafts/idea.md"), "zip everything\n")?;

    // The listing normally comes from `rclone lsf -R`.
    let listing = ["todo.md", "drafts/", "drafts/idea.md"];

    let config = BackupConfig::new(&src, temp.path().join("backups"), "filter.txt")
        .with_time_in_filename(true)
        .with_compression(CompressionMethod::Deflate);
    let output = archive_output_path(&config, &Local::now().naive_local())?;

    let report = create_archive(&config, &listing, &output, &mut NoopProgress)?;
    println!("Created {}", output.display());
    println!(
        "  {} files, {} directories",
        report.files_added, report.directories_added
    );
    println!("  Compression: {:.1}%", report.compression_percentage());

    let info = inspect_archive(&output)?;
    println!("  {} entries, {} bytes", info.entry_count, info.size_bytes);

    Ok(())
}
