use std::{
    ffi::CString,
    fs,
    path::{Path, PathBuf},
};

use log::debug;

/// Resolve an absolute node path against an optional root prefix. Production
/// code passes `None`; tests redirect writes into a scratch directory.
pub fn rooted(root: &Option<PathBuf>, path: &str) -> PathBuf {
    match root {
        Some(root) => root.join(path.trim_start_matches('/')),
        None => PathBuf::from(path),
    }
}

/// Read a sysfs node, returning an empty string when the node is missing or
/// unreadable. Hardware read failures are never fatal here; the degraded
/// value propagates to the caller.
pub fn sysfs_read<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("Failed to read {}: {e} (continuing)", path.display());
            String::new()
        }
    }
}

/// Read a sysfs node holding a single integer. A missing node or malformed
/// content yields 0.
pub fn sysfs_read_int<P: AsRef<Path>>(path: P) -> i64 {
    sysfs_read(path).trim().parse::<i64>().unwrap_or(0)
}

/// Write a sysfs node, logging and swallowing the error on failure.
/// Returns whether the write went through.
pub fn sysfs_write<P: AsRef<Path>>(path: P, content: &str) -> bool {
    let path = path.as_ref();
    match fs::write(path, content) {
        Ok(()) => true,
        Err(e) => {
            debug!("Failed to write {}: {e} (continuing)", path.display());
            false
        }
    }
}

pub fn node_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists()
}

/// access(W_OK) check; input enable nodes on some boards exist read-only.
pub fn node_writable<P: AsRef<Path>>(path: P) -> bool {
    let Some(path_str) = path.as_ref().to_str() else {
        return false;
    };
    let Ok(c_path) = CString::new(path_str) else {
        return false;
    };
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}
