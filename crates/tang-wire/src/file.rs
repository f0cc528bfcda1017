//! Plan files
//!
//! One bulk write or read per call. Writes go to a uniquely named temporary
//! file in the destination directory, which is synced and then renamed over
//! the destination, so a failed write never leaves a partial plan behind and
//! concurrent writers never share a temporary file.

use crate::error::{WireError, WireResult};
use crate::format::{from_bytes, to_bytes, WireConfig};
use std::fs;
use std::io::Write;
use std::path::Path;
use tang_plan::InjectionPlan;
use tang_types::ClassHierarchy;
use tempfile::NamedTempFile;

/// Persist `plan` at `path`, creating parent directories as needed
///
/// # Errors
/// Codec or filesystem failure; the destination is untouched on error
pub fn write_plan(path: &Path, plan: &InjectionPlan, config: &WireConfig) -> WireResult<()> {
    let bytes = to_bytes(plan, config)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| WireError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| WireError::io(dir, e))?;
    tmp.write_all(&bytes)
        .map_err(|e| WireError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| WireError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| WireError::io(path, e.error))?;

    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        format = ?config.format,
        "wrote plan"
    );
    Ok(())
}

/// Load the plan stored at `path` and resolve it against `hierarchy`
///
/// # Errors
/// Filesystem or codec failure, or any structural decode error; no partial
/// plan is returned
pub fn read_plan<H: ClassHierarchy + ?Sized>(
    path: &Path,
    hierarchy: &H,
    config: &WireConfig,
) -> WireResult<InjectionPlan> {
    let bytes = fs::read(path).map_err(|e| WireError::io(path, e))?;
    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        format = ?config.format,
        "read plan"
    );
    from_bytes(hierarchy, &bytes, config)
}
