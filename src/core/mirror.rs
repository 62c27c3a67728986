use std::path::{Path, PathBuf};

use crate::core::vcs::SourceControl;
use crate::error::{Error, LastError};
use crate::util::anyerror::Fault;

/// A library of bare mirror clones, one per distinct remote, used as local
/// object stores to make repeated clones of the same remote fast.
pub struct MirrorLibrary<'a> {
    root: PathBuf,
    vcs: &'a dyn SourceControl,
}

impl<'a> MirrorLibrary<'a> {
    pub fn new(root: PathBuf, vcs: &'a dyn SourceControl) -> Self {
        Self {
            root: root,
            vcs: vcs,
        }
    }

    /// Derives the cache key for `url`: the last path segment with any
    /// extension stripped.
    ///
    /// Distinct remotes sharing a basename collide on the same key; callers
    /// trust the key rather than re-validating the mirror's own remote.
    pub fn repo_key(url: &str) -> String {
        let segment = url.rsplit('/').next().unwrap_or(url);
        segment.split('.').next().unwrap_or(segment).to_string()
    }

    /// Accesses the mirror path for `url`, creating the mirror on first
    /// reference.
    pub fn ensure(&self, url: &str) -> Result<PathBuf, Fault> {
        let slot = self.root.join(Self::repo_key(url));
        if slot.exists() == false {
            std::fs::create_dir_all(&self.root)?;
            println!("info: cloning {} reference", Self::repo_key(url));
            self.vcs
                .clone_mirror(url, &slot)
                .map_err(|e| Error::MirrorFailed(url.to_string(), LastError(e.to_string())))?;
        }
        Ok(slot)
    }

    /// Brings the mirror for `url` up to date with its remote. First contact
    /// with a brand-new remote is a plain [MirrorLibrary::ensure].
    pub fn refresh(&self, url: &str) -> Result<PathBuf, Fault> {
        let slot = self.root.join(Self::repo_key(url));
        if slot.exists() == false {
            return self.ensure(url);
        }
        println!("info: updating {} reference", Self::repo_key(url));
        self.vcs
            .remote_update(&slot)
            .map_err(|e| Error::MirrorRefreshFailed(url.to_string(), LastError(e.to_string())))?;
        Ok(slot)
    }

    /// Clones `url` into `dest` borrowing history from the mirror's object
    /// store.
    pub fn clone_using(&self, url: &str, dest: &Path) -> Result<(), Fault> {
        let reference = self.ensure(url)?;
        self.vcs
            .clone(url, dest, Some(&reference))
            .map_err(|e| Error::CloneFailed(url.to_string(), LastError(e.to_string())))?;
        Ok(())
    }
}
