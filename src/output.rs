//! Writing artifacts to their destinations.
//!
//! Every artifact is rendered (banner first) before the first file is touched. Each one is
//! then staged in a temporary file inside the output directory, and destinations are only
//! replaced by rename once every artifact has been staged, so a failed write leaves the
//! previous generation in place. Re-running with unchanged inputs reproduces the same bytes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::emit::Artifact;
use crate::GenError;

/// A rendered artifact and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// How a destination on disk compares with its freshly rendered contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    UpToDate,
    Missing,
    Stale { on_disk: String },
}

pub fn render_all(artifacts: &[Artifact], output_dir: &Path, banner: &str) -> Vec<RenderedFile> {
    artifacts
        .iter()
        .map(|artifact| RenderedFile {
            path: output_dir.join(artifact.file_name()),
            contents: artifact.render(banner),
        })
        .collect()
}

/// Creates `output_dir` if needed and writes every artifact.
pub fn write_all(
    artifacts: &[Artifact],
    output_dir: &Path,
    banner: &str,
) -> Result<Vec<PathBuf>, GenError> {
    let files = render_all(artifacts, output_dir, banner);
    fs::create_dir_all(output_dir).map_err(|e| {
        GenError::io(
            "create output directory",
            output_dir,
            e,
            "check that output_dir points somewhere writable",
        )
    })?;
    // Dropping the staged files on an early return deletes them.
    let staged = files
        .iter()
        .map(|file| stage(output_dir, file))
        .collect::<Result<Vec<_>, _>>()?;

    let mut written = Vec::with_capacity(files.len());
    for (temp, file) in staged.into_iter().zip(files) {
        temp.persist(&file.path).map_err(|e| {
            GenError::io(
                "replace",
                &file.path,
                e.error,
                "check that output_dir points somewhere writable",
            )
        })?;
        debug!(path = %file.path.display(), bytes = file.contents.len(), "wrote artifact");
        written.push(file.path);
    }
    info!(count = written.len(), dir = %output_dir.display(), "artifacts written");
    Ok(written)
}

fn stage(output_dir: &Path, file: &RenderedFile) -> Result<NamedTempFile, GenError> {
    let help = "check that output_dir points somewhere writable";
    let mut temp = NamedTempFile::new_in(output_dir)
        .map_err(|e| GenError::io("stage", &file.path, e, help))?;
    temp.write_all(file.contents.as_bytes())
        .and_then(|_| temp.flush())
        .map_err(|e| GenError::io("write", &file.path, e, help))?;
    // Temporary files are created 0600.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(|e| GenError::io("set permissions on", &file.path, e, help))?;
    }
    Ok(temp)
}

/// Compares one rendered file with what is on disk.
pub fn status(file: &RenderedFile) -> Result<FileStatus, GenError> {
    match fs::read_to_string(&file.path) {
        Ok(on_disk) if on_disk == file.contents => Ok(FileStatus::UpToDate),
        Ok(on_disk) => Ok(FileStatus::Stale { on_disk }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileStatus::Missing),
        Err(e) => Err(GenError::io("read", &file.path, e, "check file permissions")),
    }
}
