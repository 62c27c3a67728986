use std::path::{Component, Path, PathBuf};

/// Cleans `.` and `..` segments from `path` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => (),
            Component::ParentDir => {
                // only fold away a named segment; keep leading `..` intact
                match result.components().last() {
                    Some(Component::Normal(_)) => {
                        result.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => (),
                    _ => result.push(Component::ParentDir),
                }
            }
            c => result.push(c),
        }
    }
    if result.as_os_str().is_empty() {
        result.push(Component::CurDir);
    }
    result
}

/// Resolves `path` into a full path if it is relative to some `root` path.
///
/// An already absolute `path` is only normalized.
pub fn resolve_rel_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        normalize(&root.join(path))
    } else {
        normalize(path)
    }
}

/// Computes the relative path that walks from the directory `base` to `target`.
///
/// Both paths must be absolute. Shared leading components are dropped and each
/// remaining `base` component becomes a `..` hop.
pub fn relative_path_from(base: &Path, target: &Path) -> PathBuf {
    let base = normalize(base);
    let target = normalize(target);
    let mut base_comps = base.components().peekable();
    let mut target_comps = target.components().peekable();
    // skip the common prefix
    while let (Some(b), Some(t)) = (base_comps.peek(), target_comps.peek()) {
        if b != t {
            break;
        }
        base_comps.next();
        target_comps.next();
    }
    let mut result = PathBuf::new();
    for _ in base_comps {
        result.push(Component::ParentDir);
    }
    for t in target_comps {
        result.push(t);
    }
    if result.as_os_str().is_empty() {
        result.push(Component::CurDir);
    }
    result
}

/// Creates a symbolic link at `link` pointing to the directory `original`.
#[cfg(unix)]
pub fn symlink_dir(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

/// Creates a symbolic link at `link` pointing to the directory `original`.
#[cfg(windows)]
pub fn symlink_dir(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(original, link)
}

/// Checks if anything (file, directory, or dangling link) occupies `path`.
///
/// A plain `exists()` traverses symlinks and reports `false` for a link whose
/// target is gone, which would let a re-run clobber it.
pub fn entry_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}
