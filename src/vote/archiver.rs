// Writing the answer pages to disk.

use snafu::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use serial_voting::{result_file_name, Credential, SubmissionResult};

use crate::vote::*;

/// Creates the output directory (and its parents) when it is missing.
pub fn ensure_output_directory(dir: &str) -> VoteResult<PathBuf> {
    fs::create_dir_all(dir).context(ArchiveSnafu { path: dir })?;
    Ok(PathBuf::from(dir))
}

/// Writes the answer as UTF-8 to `<dir>/<status>_<serial1> <serial2>.html`.
/// An existing file with the same name is replaced.
pub fn save_result(
    dir: &Path,
    credential: &Credential,
    result: &SubmissionResult,
) -> VoteResult<PathBuf> {
    let p = dir.join(result_file_name(result.status, credential));
    fs::write(&p, result.body.as_bytes()).context(ArchiveSnafu {
        path: p.display().to_string(),
    })?;
    Ok(p)
}
