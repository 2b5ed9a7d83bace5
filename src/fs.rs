use std::fs::{File, remove_file, rename};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use rustix::fs::{Mode, OpenOptionsExt};

const MODE_ENVIRONMENT_FILE: u32 = 0o644;

// Temporary sibling of `path`, e.g. "/etc/.network-environment.tmp", so the
// final rename never crosses a filesystem.
fn temp_path(path: &Path) -> Result<(PathBuf, PathBuf)> {
    let p_str = path.to_string_lossy();
    let dir_name = if path.is_absolute() {
        path.parent().unwrap_or(Path::new("/"))
    } else {
        path.parent()
            .map(|d| {
                if d.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    d
                }
            })
            .ok_or_else(|| anyhow!("invalid path {}", p_str))?
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("invalid path {}", p_str))?;
    let file_name_tmp = dir_name.join(format!(".{}.tmp", file_name.to_string_lossy()));
    Ok((dir_name.to_path_buf(), file_name_tmp))
}

/// Replace `path` with whatever `write` puts into a temporary file. Readers of
/// `path` see either the previous file or the complete new one. If anything
/// fails before the rename, `path` is left alone.
pub fn atomic_write<P: AsRef<Path>>(
    path: P,
    write: impl FnOnce(&File) -> Result<()>,
) -> Result<()> {
    let p = path.as_ref();
    let p_str = p.to_string_lossy();
    let (dir_name, file_name_tmp) = temp_path(p)?;
    let tmp_str = file_name_tmp.to_string_lossy();

    debug!("Writing {} via {}", p_str, tmp_str);
    let f = File::options()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(Mode::from(MODE_ENVIRONMENT_FILE).as_raw_mode())
        .open(&file_name_tmp)
        .context(format!("unable to create {}", tmp_str))?;

    let written = write(&f)
        .context(format!("unable to write {}", p_str))
        .and_then(|()| f.sync_all().context(format!("unable to sync {}", p_str)))
        .and_then(|()| {
            rename(&file_name_tmp, p)
                .context(format!("unable to rename {} to {}", tmp_str, p_str))
        });
    drop(f);
    if let Err(e) = written {
        if let Err(rm) = remove_file(&file_name_tmp) {
            warn!("Unable to remove {}: {}", tmp_str, rm);
        }
        return Err(e);
    }

    let dir_name_str = dir_name.to_string_lossy();
    let dir =
        File::open(&dir_name).context(format!("unable to open directory {}", dir_name_str))?;
    dir.sync_all()
        .context(format!("unable to sync directory {}", dir_name_str))
}
