//! Renaming PKG files in place.

use snafu::{ResultExt, Snafu, ensure};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix of the temporary name used for case-only renames.
const TEMP_SUFFIX: &str = ".pkgrename";

#[derive(Debug, Snafu)]
pub enum RenameError {
    #[snafu(display("File already exists: \"{}\".", path.display()))]
    Exists { path: PathBuf },

    #[snafu(display("Could not rename file \"{}\".", path.display()))]
    Rename {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Renames `path` to `new_name` within the same directory.
///
/// A target that differs from `path` only in letter case is reached through
/// a temporary name, so the rename also works on case-insensitive file
/// systems such as exFAT. Any other existing target is an error.
pub fn rename_pkg(path: &Path, new_name: &str) -> Result<PathBuf, RenameError> {
    let target = path.with_file_name(new_name);

    if target.exists() {
        let same_file = path
            .to_string_lossy()
            .eq_ignore_ascii_case(&target.to_string_lossy());
        ensure!(same_file, ExistsSnafu { path: target });

        let mut temp = OsString::from(target.as_os_str());
        temp.push(TEMP_SUFFIX);
        let temp = PathBuf::from(temp);

        debug!(from = %path.display(), via = %temp.display(), "case-only rename");
        fs::rename(path, &temp).context(RenameSnafu { path })?;
        fs::rename(&temp, &target).context(RenameSnafu { path: &temp })?;
    } else {
        fs::rename(path, &target).context(RenameSnafu { path })?;
    }

    debug!(to = %target.display(), "renamed");
    Ok(target)
}
