//! Filesystem operations used by the layout migration.
//!
//! - `copy_and_refactor` - copy a file to a new location, rewriting its content
//! - `refactor_in_place` - rewrite an existing file
//! - `delete_tree` - remove a directory and everything beneath it

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::replace::{self, ReplacementMap};
use crate::utils::io;

/// Copy `src` to `dst`, applying `map` to the content on the way.
///
/// Missing parent directories of `dst` are created and an existing `dst` is
/// overwritten. `src` is never touched. Returns the number of substitutions.
pub fn copy_and_refactor(src: &Path, dst: &Path, map: &ReplacementMap) -> Result<usize> {
    if !src.is_file() {
        return Err(Error::source_not_found(src));
    }

    let content = io::read_file(src, "read source")?;
    let (rewritten, count) = replace::apply_counted(&content, map);

    io::ensure_parent_dir(dst, "create destination directory")?;
    io::write_file(dst, &rewritten, "write destination")?;

    Ok(count)
}

/// Apply `map` to the file at `path` and overwrite it.
///
/// A file with no matching term is not rewritten. Returns the number of
/// substitutions.
pub fn refactor_in_place(path: &Path, map: &ReplacementMap) -> Result<usize> {
    if !path.is_file() {
        return Err(Error::file_not_found(path));
    }

    let content = io::read_file(path, "read file")?;
    let (rewritten, count) = replace::apply_counted(&content, map);

    if count > 0 {
        io::write_file(path, &rewritten, "rewrite file")?;
    }

    Ok(count)
}

/// Remove `path` and everything beneath it.
///
/// Returns `false` when there was nothing to delete.
pub fn delete_tree(path: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(Error::from_io(e, path, "delete")),
    };

    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    removed.map_err(|e| Error::from_io(e, path, "delete"))?;
    Ok(true)
}
