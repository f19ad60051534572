//! Backup configuration.
//!
//! A [`BackupConfig`] is built once, either inline through the builder
//! methods or from an ini file via [`BackupConfig::from_ini_file`], and is
//! then passed by reference to every step of the pipeline.
//!
//! # Ini layout
//!
//! ```ini
//! [settings]
//! save_remotely = true
//! use_time_in_fn = false
//! ; optional
//! auto_upload = false
//! basename = true
//! compression = lzma
//!
//! [dirs]
//! src_dir = /home/me/projects/notes
//! local_save_dir = /home/me/backups
//! remote_save_dir = backups/notes
//!
//! [rclone]
//! remote_alias = gdrive
//! filter_file = filter.txt
//! ; optional
//! binary = rclone
//! flags = --config "C:\Users\me\rclone config\rclone.conf" --fast-list
//! ```
//!
//! Values are taken literally: backslashes are not escapes, quotes are
//! kept, and `;` after a value is part of the value. `flags` is split on whitespace; wrap an argument that
//! contains spaces in double quotes.

use crate::BackupError;
use crate::Result;
use config::Config;
use config::File;
use config::FileStoredFormat;
use config::Format;
use config::Map;
use config::Value;
use config::ValueKind;
use ini::Ini;
use ini::ParseOption;
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

/// Compression applied to every archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    /// LZMA, the high-ratio default.
    #[default]
    Lzma,
    /// Deflate, for consumers that cannot read LZMA entries.
    Deflate,
    /// No compression.
    Stored,
}

impl CompressionMethod {
    /// Lowercase name as accepted in the ini file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lzma => "lzma",
            Self::Deflate => "deflate",
            Self::Stored => "stored",
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionMethod {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lzma" => Ok(Self::Lzma),
            "deflate" | "deflated" => Ok(Self::Deflate),
            "stored" | "store" | "none" => Ok(Self::Stored),
            other => Err(BackupError::config(format!(
                "unknown compression method '{other}' (expected lzma, deflate or stored)"
            ))),
        }
    }
}

/// Configuration for one backup run.
///
/// # Examples
///
/// ```
/// use rbackup_core::BackupConfig;
/// use rbackup_core::CompressionMethod;
///
/// let config = BackupConfig::new("/home/me/notes", "/home/me/backups", "filter.txt")
///     .with_remote("gdrive", "backups/notes")
///     .with_save_remotely(true)
///     .with_compression(CompressionMethod::Deflate);
///
/// assert_eq!(config.remote_target(), "gdrive:backups/notes");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    /// Directory to back up.
    pub src_dir: PathBuf,

    /// Directory the archive is written to.
    pub local_save_dir: PathBuf,

    /// Path on the remote the archive is copied to.
    pub remote_save_dir: String,

    /// rclone remote name.
    pub remote_alias: String,

    /// rclone filter rule file.
    pub filter_file: PathBuf,

    /// Offer an upload after the archive is created.
    ///
    /// Default: `false`.
    pub save_remotely: bool,

    /// Upload without asking for confirmation.
    ///
    /// Only consulted when `save_remotely` is set. Default: `false`.
    pub auto_upload: bool,

    /// Append the time of day to the date in the archive name.
    ///
    /// Default: `false`.
    pub use_time_in_fn: bool,

    /// Store entries under a root folder named after `src_dir`.
    ///
    /// Default: `true`.
    pub basename: bool,

    /// Entry compression. Default: LZMA.
    pub compression: CompressionMethod,

    /// rclone executable. Default: `rclone` looked up on `PATH`.
    pub rclone_binary: PathBuf,

    /// Extra arguments placed before every rclone subcommand.
    pub rclone_flags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct IniFile {
    settings: IniSettings,
    dirs: IniDirs,
    rclone: IniRclone,
}

#[derive(Debug, Deserialize)]
struct IniSettings {
    save_remotely: bool,
    use_time_in_fn: bool,
    #[serde(default)]
    auto_upload: bool,
    #[serde(default = "default_basename")]
    basename: bool,
    #[serde(default)]
    compression: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IniDirs {
    src_dir: PathBuf,
    local_save_dir: PathBuf,
    remote_save_dir: String,
}

#[derive(Debug, Deserialize)]
struct IniRclone {
    remote_alias: String,
    filter_file: PathBuf,
    #[serde(default)]
    binary: Option<PathBuf>,
    #[serde(default)]
    flags: Option<String>,
}

const fn default_basename() -> bool {
    true
}

/// INI format without escape or quote processing.
///
/// The `config` crate's built-in INI format turns `C:\Users` into `C:Users`
/// and strips quotes. Settings files hold plain Windows paths and rely on
/// neither.
#[derive(Debug, Clone, Copy)]
struct LiteralIni;

impl Format for LiteralIni {
    fn parse(
        &self,
        uri: Option<&String>,
        text: &str,
    ) -> std::result::Result<Map<String, Value>, Box<dyn std::error::Error + Send + Sync>> {
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(&keep_trailing_backslashes(text), options)?;

        let mut map = Map::new();
        for (section, properties) in ini.iter() {
            let entries = properties
                .iter()
                .map(|(key, value)| {
                    (
                        key.to_owned(),
                        Value::new(uri, ValueKind::String(value.to_owned())),
                    )
                })
                .collect::<Map<String, Value>>();
            match section {
                Some(section) => {
                    map.insert(section.to_owned(), Value::new(uri, ValueKind::Table(entries)));
                }
                None => map.extend(entries),
            }
        }
        Ok(map)
    }
}

impl FileStoredFormat for LiteralIni {
    fn file_extensions(&self) -> &'static [&'static str] {
        &["ini"]
    }
}

/// A `\` at the end of a line is a continuation for rust-ini even with
/// escapes off; a following space makes it a literal (trimmed later).
fn keep_trailing_backslashes(text: &str) -> Cow<'_, str> {
    if text.contains("\\\n") {
        Cow::Owned(text.replace("\\\n", "\\ \n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Splits `[rclone] flags` on whitespace, keeping double-quoted runs
/// together. Backslashes are literal so Windows paths survive.
fn split_flags(flags: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quoted = false;

    for ch in flags.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_arg = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            c => {
                current.push(c);
                in_arg = true;
            }
        }
    }
    if in_arg {
        args.push(current);
    }
    args
}

impl BackupConfig {
    /// Creates an inline configuration with upload disabled.
    pub fn new(
        src_dir: impl Into<PathBuf>,
        local_save_dir: impl Into<PathBuf>,
        filter_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            src_dir: src_dir.into(),
            local_save_dir: local_save_dir.into(),
            remote_save_dir: String::new(),
            remote_alias: String::new(),
            filter_file: filter_file.into(),
            save_remotely: false,
            auto_upload: false,
            use_time_in_fn: false,
            basename: true,
            compression: CompressionMethod::default(),
            rclone_binary: PathBuf::from("rclone"),
            rclone_flags: Vec::new(),
        }
    }

    /// Loads the configuration from an ini file.
    ///
    /// A relative `filter_file` is resolved against the directory that
    /// contains the ini file.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Config`] if the file is missing, a required key
    /// is absent, or a value cannot be parsed.
    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            BackupError::config(format!("cannot read '{}': {e}", path.display()))
        })?;
        let raw: IniFile = Config::builder()
            .add_source(File::from_str(&text, LiteralIni))
            .build()?
            .try_deserialize()?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let config = Self::from_ini(raw, base_dir)?;

        tracing::debug!("Loaded settings from '{}'", path.display());
        Ok(config)
    }

    fn from_ini(raw: IniFile, base_dir: &Path) -> Result<Self> {
        let compression = raw
            .settings
            .compression
            .as_deref()
            .map(str::parse)
            .transpose()?
            .unwrap_or_default();

        let filter_file = if raw.rclone.filter_file.is_absolute() {
            raw.rclone.filter_file
        } else {
            base_dir.join(raw.rclone.filter_file)
        };

        let rclone_flags = raw
            .rclone
            .flags
            .as_deref()
            .map(split_flags)
            .unwrap_or_default();

        Ok(Self {
            src_dir: raw.dirs.src_dir,
            local_save_dir: raw.dirs.local_save_dir,
            remote_save_dir: raw.dirs.remote_save_dir,
            remote_alias: raw.rclone.remote_alias,
            filter_file,
            save_remotely: raw.settings.save_remotely,
            auto_upload: raw.settings.auto_upload,
            use_time_in_fn: raw.settings.use_time_in_fn,
            basename: raw.settings.basename,
            compression,
            rclone_binary: raw
                .rclone
                .binary
                .unwrap_or_else(|| PathBuf::from("rclone")),
            rclone_flags,
        })
    }

    /// Sets the remote alias and the directory on that remote.
    #[must_use]
    pub fn with_remote(mut self, alias: impl Into<String>, dir: impl Into<String>) -> Self {
        self.remote_alias = alias.into();
        self.remote_save_dir = dir.into();
        self
    }

    /// Sets whether an upload is offered after archiving.
    #[must_use]
    pub fn with_save_remotely(mut self, save: bool) -> Self {
        self.save_remotely = save;
        self
    }

    /// Sets whether the upload skips the confirmation prompt.
    #[must_use]
    pub fn with_auto_upload(mut self, auto: bool) -> Self {
        self.auto_upload = auto;
        self
    }

    /// Sets whether the archive name carries the time of day.
    #[must_use]
    pub fn with_time_in_filename(mut self, use_time: bool) -> Self {
        self.use_time_in_fn = use_time;
        self
    }

    /// Sets whether entries are stored under the source basename.
    #[must_use]
    pub fn with_basename(mut self, basename: bool) -> Self {
        self.basename = basename;
        self
    }

    /// Sets the entry compression method.
    #[must_use]
    pub fn with_compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    /// Sets the rclone executable.
    #[must_use]
    pub fn with_rclone_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.rclone_binary = binary.into();
        self
    }

    /// Sets extra arguments passed to every rclone invocation.
    #[must_use]
    pub fn with_rclone_flags(mut self, flags: Vec<String>) -> Self {
        self.rclone_flags = flags;
        self
    }

    /// Final component of `src_dir`, used for the archive name and root
    /// folder.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Config`] if `src_dir` has no final component
    /// (for example `/` or `..`) or it is not valid UTF-8.
    pub fn source_basename(&self) -> Result<&str> {
        self.src_dir
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                BackupError::config(format!(
                    "source directory '{}' has no usable base name",
                    self.src_dir.display()
                ))
            })
    }

    /// Remote destination in rclone syntax, `alias:dir`.
    #[must_use]
    pub fn remote_target(&self) -> String {
        format!("{}:{}", self.remote_alias, self.remote_save_dir)
    }

    /// Checks that the configuration can drive a backup.
    ///
    /// # Errors
    ///
    /// - [`BackupError::FilterFileMissing`] if the filter file is not a file
    /// - [`BackupError::SourceNotFound`] if `src_dir` is not a directory
    /// - [`BackupError::Config`] if `src_dir` has no base name, or uploads
    ///   are enabled without a remote alias
    pub fn validate(&self) -> Result<()> {
        if !self.filter_file.is_file() {
            return Err(BackupError::FilterFileMissing {
                path: self.filter_file.clone(),
            });
        }
        if !self.src_dir.is_dir() {
            return Err(BackupError::SourceNotFound {
                path: self.src_dir.clone(),
            });
        }
        self.source_basename()?;
        if self.save_remotely && self.remote_alias.trim().is_empty() {
            return Err(BackupError::config(
                "save_remotely is enabled but no remote_alias is set",
            ));
        }
        Ok(())
    }
}
