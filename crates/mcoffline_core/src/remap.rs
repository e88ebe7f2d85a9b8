//! Re-keying of per-player data directories.
//!
//! Every file in a directory such as `world/playerdata` is named after the
//! player's online uuid. The remapper builds `world/playerdata.offline` next
//! to it, holding the same files under their offline uuids. Source files are
//! never touched, and running it again over the same tree converges instead of
//! failing on what the previous run already created.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::OFFLINE_SUFFIX;
use crate::error::{CoreError, CoreErrorCode};
use crate::identity::offline_uuid_string;
use crate::index::IdentityIndex;

/// How a destination file comes to share the source file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkMode {
    /// Hard link, falling back to a copy where the platform has no hard links.
    #[default]
    HardLink,
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapOptions {
    pub suffix: String,
    pub link_mode: LinkMode,
}

impl Default for RemapOptions {
    fn default() -> Self {
        Self {
            suffix: OFFLINE_SUFFIX.to_string(),
            link_mode: LinkMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemappedFile {
    pub player: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemapReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Files this run linked or copied into place.
    pub created: Vec<RemappedFile>,
    /// Files whose destination already existed, usually from an earlier run.
    pub already_present: Vec<RemappedFile>,
    /// Files named after a uuid that is not in the index.
    pub unmatched: Vec<PathBuf>,
    pub skipped_dirs: Vec<PathBuf>,
}

impl RemapReport {
    /// Destination files that exist after this run, new or not.
    pub fn converted(&self) -> usize {
        self.created.len() + self.already_present.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shared {
    Created,
    AlreadyPresent,
}

/// Path of the offline counterpart of `source`, e.g. `playerdata` becomes
/// `playerdata.offline`. Trailing separators on `source` are ignored.
pub fn offline_path(source: &Path, suffix: &str) -> PathBuf {
    match source.file_name() {
        Some(name) => {
            let mut name = name.to_os_string();
            name.push(suffix);
            source.with_file_name(name)
        }
        None => {
            let mut raw = OsString::from(source.as_os_str());
            raw.push(suffix);
            PathBuf::from(raw)
        }
    }
}

/// Split a file name at its last `.`; the extension keeps the dot and is
/// empty when there is none.
pub fn split_file_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) => name.split_at(dot),
        None => (name, ""),
    }
}

pub fn remap_directory(
    index: &IdentityIndex,
    source: &Path,
    options: &RemapOptions,
) -> Result<RemapReport, CoreError> {
    let mut entries = fs::read_dir(source)
        .and_then(|dir| dir.collect::<io::Result<Vec<_>>>())
        .map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed reading folder {}: {e}", source.display()),
            )
        })?;
    entries.sort_by_key(|entry| entry.file_name());

    let destination = offline_path(source, &options.suffix);
    match fs::create_dir(&destination) {
        Ok(()) => debug!(path = %destination.display(), "created offline directory"),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!(path = %destination.display(), "offline directory already exists")
        }
        Err(e) => {
            return Err(CoreError::new(
                CoreErrorCode::Filesystem,
                format!(
                    "failed creating {} for {}: {e}",
                    destination.display(),
                    source.display()
                ),
            ));
        }
    }

    let mut report = RemapReport {
        source: source.to_path_buf(),
        destination: destination.clone(),
        ..RemapReport::default()
    };

    for entry in entries {
        let online_path = entry.path();
        let file_type = entry.file_type().map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed inspecting {}: {e}", online_path.display()),
            )
        })?;
        if file_type.is_dir() {
            debug!(path = %online_path.display(), "skipping directory");
            report.skipped_dirs.push(online_path);
            continue;
        }

        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        let (stem, ext) = split_file_name(&file_name);
        let Some(record) = index.get(stem) else {
            warn!("skipping non-whitelisted player: {}", online_path.display());
            report.unmatched.push(online_path);
            continue;
        };

        let offline_name = format!("{}{ext}", offline_uuid_string(&record.name));
        let offline_file = destination.join(offline_name);
        let shared = share_file(&online_path, &offline_file, options.link_mode).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Filesystem,
                format!(
                    "failed creating offline version of {} named {}: {e}",
                    online_path.display(),
                    offline_file.display()
                ),
            )
        })?;

        let remapped = RemappedFile {
            player: record.name.clone(),
            source: online_path,
            destination: offline_file,
        };
        match shared {
            Shared::Created => {
                debug!(
                    player = %remapped.player,
                    from = %remapped.source.display(),
                    to = %remapped.destination.display(),
                    "remapped player file"
                );
                report.created.push(remapped);
            }
            Shared::AlreadyPresent => report.already_present.push(remapped),
        }
    }

    info!(
        source = %report.source.display(),
        created = report.created.len(),
        already_present = report.already_present.len(),
        unmatched = report.unmatched.len(),
        "remapped directory"
    );
    Ok(report)
}

fn share_file(source: &Path, destination: &Path, mode: LinkMode) -> io::Result<Shared> {
    if mode == LinkMode::Copy {
        return copy_new(source, destination);
    }
    match fs::hard_link(source, destination) {
        Ok(()) => Ok(Shared::Created),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(Shared::AlreadyPresent),
        Err(e) if falls_back_to_copy(e.kind()) => {
            debug!(path = %source.display(), error = %e, "cannot hard link, copying");
            copy_new(source, destination)
        }
        Err(e) => Err(e),
    }
}

/// Link failures answered with a copy. vfat and exfat report EPERM, which
/// surfaces as `PermissionDenied`.
fn falls_back_to_copy(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::Unsupported | ErrorKind::PermissionDenied | ErrorKind::CrossesDevices
    )
}

/// Copy through a temporary file in the destination directory. `destination`
/// only appears once its content is complete and synced.
fn copy_new(source: &Path, destination: &Path) -> io::Result<Shared> {
    if fs::symlink_metadata(destination).is_ok() {
        return Ok(Shared::AlreadyPresent);
    }
    let dir = destination.parent().unwrap_or_else(|| Path::new("."));

    let mut input = File::open(source)?;
    let mut staged = NamedTempFile::new_in(dir)?;
    io::copy(&mut input, staged.as_file_mut())?;
    staged.as_file().sync_all()?;

    match staged.persist_noclobber(destination) {
        Ok(_) => Ok(Shared::Created),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(Shared::AlreadyPresent),
        Err(e) => Err(e.error),
    }
}
