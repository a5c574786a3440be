//! Shared filesystem helpers for provisioning.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Remove a file or symlink if present. Uses `symlink_metadata` so dangling
/// links count as present.
pub(crate) fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(_) => fs::remove_file(path),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
pub(crate) fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
pub(crate) fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

/// First plain file in `dir` whose name matches, by sorted name. Symlinks
/// and directories are skipped.
pub(crate) fn find_executable<F>(dir: &Path, matches: F) -> io::Result<Option<PathBuf>>
where
    F: Fn(&str) -> bool,
{
    let mut names: Vec<String> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if matches(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names.into_iter().next().map(|name| dir.join(name)))
}

/// Recursively apply `mode` to a directory tree. Symlinks are left alone so
/// shared link targets keep their own permissions.
#[cfg(unix)]
pub(crate) fn chmod_recursive(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    if path.is_dir() {
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_symlink() {
                continue;
            }
            chmod_recursive(&entry.path(), mode)?;
        }
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn chmod_recursive(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_if_present_handles_dangling_links() {
        let tmp = tempfile::tempdir().unwrap();
        let link = tmp.path().join("dangling");
        symlink(&tmp.path().join("never-existed"), &link).unwrap();
        assert!(fs::symlink_metadata(&link).is_ok());
        remove_if_present(&link).unwrap();
        assert!(fs::symlink_metadata(&link).is_err());
        // A second removal is a no-op.
        remove_if_present(&link).unwrap();
    }

    #[test]
    fn test_find_executable_sorts_and_skips_directories() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("lnfl_subdir")).unwrap();
        fs::write(tmp.path().join("lnfl_v2.6_b"), "").unwrap();
        fs::write(tmp.path().join("lnfl_v2.6_a"), "").unwrap();
        fs::write(tmp.path().join("README"), "").unwrap();
        let found = find_executable(tmp.path(), |name| name.contains("lnfl"))
            .unwrap()
            .unwrap();
        assert_eq!(found, tmp.path().join("lnfl_v2.6_a"));
    }
}
