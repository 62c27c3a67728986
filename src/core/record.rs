use std::path::{Path, PathBuf};

use crate::core::declaration::{Declaration, DependencySource, Name};
use crate::core::manifest::{self, Manifest};
use crate::core::mirror::MirrorLibrary;
use crate::core::vcs::SourceControl;
use crate::error::{Error, LastError};
use crate::util::anyerror::Fault;
use crate::util::filesystem;

/// Hidden directory created inside an installed dependency to hold relative
/// links back to the share root.
pub const LINK_DIR: &str = ".roost";

/// The shared installation root for one resolution run: a directory named
/// after the root manifest, with one slot per installed dependency name.
#[derive(Debug, PartialEq)]
pub struct ShareRoot {
    path: PathBuf,
    name: Name,
}

impl ShareRoot {
    /// Establishes the share tree for the root manifest `name` under
    /// `share_dir`, reusing it when it already exists.
    pub fn new(share_dir: &Path, name: &Name) -> Result<Self, Fault> {
        let path = share_dir.join(name.as_ref());
        std::fs::create_dir_all(&path)?;
        Ok(Self {
            path: path,
            name: name.clone(),
        })
    }

    pub fn get_path(&self) -> &Path {
        &self.path
    }

    pub fn get_name(&self) -> &Name {
        &self.name
    }

    /// Composes the installation slot for the dependency `name`.
    pub fn slot(&self, name: &Name) -> PathBuf {
        self.path.join(name.as_ref())
    }
}

/// The materialized, on-disk state of one resolved dependency.
///
/// Its own dependencies may not be installed yet, and the checkout may still
/// need to transition to a pinned revision.
#[derive(Debug, PartialEq)]
pub struct InstalledDependency {
    name: Name,
    remote: Option<String>,
    local_path: Option<PathBuf>,
    installation_path: PathBuf,
    revision: Option<String>,
    manifest: Option<Manifest>,
}

impl InstalledDependency {
    /// Installs one dependency (not its dependencies) into its slot under
    /// `share`, doing the minimal work required: a symbolic link for
    /// local-path sources, a mirror-referenced clone for a fresh remote, or
    /// a fast-forward of an existing checkout.
    pub fn install(
        decl: &Declaration,
        share: &ShareRoot,
        vcs: &dyn SourceControl,
        mirrors: &MirrorLibrary,
    ) -> Result<Self, Fault> {
        let installation_path = share.slot(decl.get_name());
        let mut dep = match decl.get_source() {
            DependencySource::Path(target) => {
                // presence means installed; never replace what is there
                if filesystem::entry_exists(&installation_path) == false {
                    filesystem::symlink_dir(target, &installation_path)?;
                }
                Self {
                    name: decl.get_name().clone(),
                    remote: None,
                    local_path: Some(target.clone()),
                    installation_path: installation_path,
                    revision: None,
                    manifest: None,
                }
            }
            DependencySource::Remote { url, .. } => {
                if installation_path.exists() == true {
                    let origin = vcs.remote_url(&installation_path)?;
                    if origin.as_deref() != Some(url.as_str()) {
                        return Err(Error::MismatchedRemote(
                            decl.get_name().to_string(),
                            url.clone(),
                        ))?;
                    }
                    println!("info: updating {}", decl.get_name());
                    mirrors.refresh(url)?;
                    let branch = vcs.default_branch(&installation_path)?;
                    vcs.checkout(&installation_path, &branch).map_err(|e| {
                        Error::UpdateFailed(decl.get_name().to_string(), LastError(e.to_string()))
                    })?;
                    vcs.pull(&installation_path).map_err(|e| {
                        Error::UpdateFailed(decl.get_name().to_string(), LastError(e.to_string()))
                    })?;
                } else {
                    println!("info: cloning {}", decl.get_name());
                    mirrors.clone_using(url, &installation_path)?;
                }
                Self {
                    name: decl.get_name().clone(),
                    remote: Some(url.clone()),
                    local_path: None,
                    installation_path: installation_path,
                    revision: None,
                    manifest: None,
                }
            }
        };
        dep.load_manifest(share)?;
        if let Some(rev) = decl.get_rev() {
            dep.lock(rev, share, vcs)?;
        }
        Ok(dep)
    }

    /// Verifies a repeated declaration agrees with what is already on disk.
    ///
    /// Local-path installs are never remote-validated; for remote installs
    /// the checkout's configured remote must equal the declared source.
    pub fn ensure_compatible_with(
        &self,
        decl: &Declaration,
        vcs: &dyn SourceControl,
    ) -> Result<(), Fault> {
        if self.local_path.is_some() == true {
            return Ok(());
        }
        let origin = vcs.remote_url(&self.installation_path)?;
        if origin.is_none() == true || origin.as_deref() != decl.get_url() {
            return Err(Error::MismatchedRemote(
                self.name.to_string(),
                decl.get_source().to_string(),
            ))?;
        }
        Ok(())
    }

    /// Applies the revision-lock transition, reporting whether the checkout
    /// actually moved.
    ///
    /// Once locked, a record can never move to a different revision, and a
    /// local-path install is not revision-addressable. A successful
    /// transition reloads the nested manifest, since the pinned content may
    /// carry a different one.
    pub fn lock(
        &mut self,
        rev: &str,
        share: &ShareRoot,
        vcs: &dyn SourceControl,
    ) -> Result<bool, Fault> {
        if self.revision.as_deref() == Some(rev) {
            return Ok(false);
        }
        if let Some(cur) = &self.revision {
            return Err(Error::AlreadyLocked(self.name.to_string(), cur.clone()))?;
        }
        if let Some(p) = &self.local_path {
            return Err(Error::LockedToPath(self.name.to_string(), p.clone()))?;
        }
        println!("info: updating {} to commit {}", self.name, rev);
        vcs.fetch(&self.installation_path).map_err(|e| {
            Error::CheckoutFailed(
                self.name.to_string(),
                rev.to_string(),
                LastError(e.to_string()),
            )
        })?;
        vcs.checkout(&self.installation_path, rev).map_err(|e| {
            Error::CheckoutFailed(
                self.name.to_string(),
                rev.to_string(),
                LastError(e.to_string()),
            )
        })?;
        self.revision = Some(rev.to_string());
        self.load_manifest(share)?;
        Ok(true)
    }

    /// Accesses the declarations of the nested manifest, if one was loaded.
    pub fn get_dependencies(&self) -> &[Declaration] {
        match &self.manifest {
            Some(m) => m.get_declarations(),
            None => &[],
        }
    }

    pub fn get_name(&self) -> &Name {
        &self.name
    }

    pub fn get_remote(&self) -> Option<&str> {
        self.remote.as_deref()
    }

    pub fn get_local_path(&self) -> Option<&Path> {
        self.local_path.as_deref()
    }

    pub fn get_installation_path(&self) -> &Path {
        &self.installation_path
    }

    pub fn get_revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn get_manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    /// Probes the installation for this dependency's own manifest file,
    /// establishing the linking topology before parsing it.
    fn load_manifest(&mut self, share: &ShareRoot) -> Result<(), Fault> {
        self.manifest = None;
        let manifest_path = self
            .installation_path
            .join(manifest::manifest_file(&self.name));
        if manifest_path.exists() == false {
            return Ok(());
        }
        self.establish_links(share)?;
        self.manifest = Some(Manifest::from_file(&manifest_path)?);
        Ok(())
    }

    /// Creates the hidden linking directory holding relative links back to
    /// the share root, one named for this dependency and one named for the
    /// root manifest. Existing links are left untouched.
    ///
    /// The hop count is measured from the physical location of the linking
    /// directory, resolving through the slot's symlink when the dependency
    /// was installed from a local path.
    fn establish_links(&self, share: &ShareRoot) -> Result<(), Fault> {
        let physical = self.installation_path.canonicalize()?;
        let link_dir = physical.join(LINK_DIR);
        if link_dir.exists() == false {
            std::fs::create_dir(&link_dir)?;
        }
        let target = filesystem::relative_path_from(&link_dir, &share.get_path().canonicalize()?);
        let mut link_names = vec![self.name.as_ref()];
        if share.get_name() != &self.name {
            link_names.push(share.get_name().as_ref());
        }
        for link_name in link_names {
            let link = link_dir.join(link_name);
            if filesystem::entry_exists(&link) == false {
                filesystem::symlink_dir(&target, &link)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    /// Provider that accepts every operation without touching a remote.
    struct IdleVcs;

    impl SourceControl for IdleVcs {
        fn clone(&self, _: &str, _: &Path, _: Option<&Path>) -> Result<(), Fault> {
            Ok(())
        }
        fn clone_mirror(&self, _: &str, _: &Path) -> Result<(), Fault> {
            Ok(())
        }
        fn remote_url(&self, _: &Path) -> Result<Option<String>, Fault> {
            Ok(None)
        }
        fn default_branch(&self, _: &Path) -> Result<String, Fault> {
            Ok(String::from("master"))
        }
        fn fetch(&self, _: &Path) -> Result<(), Fault> {
            Ok(())
        }
        fn checkout(&self, _: &Path, _: &str) -> Result<(), Fault> {
            Ok(())
        }
        fn pull(&self, _: &Path) -> Result<(), Fault> {
            Ok(())
        }
        fn remote_update(&self, _: &Path) -> Result<(), Fault> {
            Ok(())
        }
    }

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn remote_record(share: &ShareRoot, n: &str) -> InstalledDependency {
        let installation_path = share.slot(&name(n));
        std::fs::create_dir_all(&installation_path).unwrap();
        InstalledDependency {
            name: name(n),
            remote: Some(String::from("https://example.com/repos/lib.git")),
            local_path: None,
            installation_path: installation_path,
            revision: None,
            manifest: None,
        }
    }

    #[test]
    fn lock_is_idempotent_for_the_same_revision() {
        let ws = tempfile::tempdir().unwrap();
        let share = ShareRoot::new(&ws.path().join(".roost"), &name("app")).unwrap();
        let mut dep = remote_record(&share, "lib");

        assert_eq!(dep.lock("deadbeef", &share, &IdleVcs).unwrap(), true);
        assert_eq!(dep.get_revision(), Some("deadbeef"));
        // repeating the same pin does not move the checkout
        assert_eq!(dep.lock("deadbeef", &share, &IdleVcs).unwrap(), false);
    }

    #[test]
    fn lock_rejects_a_different_revision() {
        let ws = tempfile::tempdir().unwrap();
        let share = ShareRoot::new(&ws.path().join(".roost"), &name("app")).unwrap();
        let mut dep = remote_record(&share, "lib");

        dep.lock("deadbeef", &share, &IdleVcs).unwrap();
        let err = dep.lock("0cf2c2f", &share, &IdleVcs).unwrap_err();
        assert_eq!(
            err.to_string(),
            "lib already locked to commit deadbeef"
        );
    }

    #[test]
    fn lock_rejects_a_local_path_install() {
        let ws = tempfile::tempdir().unwrap();
        let share = ShareRoot::new(&ws.path().join(".roost"), &name("app")).unwrap();
        let mut dep = InstalledDependency {
            name: name("lib"),
            remote: None,
            local_path: Some(PathBuf::from("/ws/libs/lib")),
            installation_path: share.slot(&name("lib")),
            revision: None,
            manifest: None,
        };
        let err = dep.lock("deadbeef", &share, &IdleVcs).unwrap_err();
        assert_eq!(
            err.to_string(),
            "lib is locked to path \"/ws/libs/lib\", cannot specify revision"
        );
    }

    #[cfg(unix)]
    #[test]
    fn linking_topology_reaches_the_share_root() {
        let ws = tempfile::tempdir().unwrap();
        let share = ShareRoot::new(&ws.path().join(".roost"), &name("app")).unwrap();
        let mut dep = remote_record(&share, "lib");
        std::fs::write(
            dep.get_installation_path().join("lib.roost"),
            "[[dependency]]\nname = \"zlib\"\nurl = \"https://example.com/zlib.git\"\n",
        )
        .unwrap();

        dep.load_manifest(&share).unwrap();
        assert_eq!(dep.get_dependencies().len(), 1);

        let link_dir = dep.get_installation_path().join(LINK_DIR);
        let through_dep = link_dir.join("lib").canonicalize().unwrap();
        let through_root = link_dir.join("app").canonicalize().unwrap();
        assert_eq!(through_dep, share.get_path().canonicalize().unwrap());
        assert_eq!(through_root, share.get_path().canonicalize().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn linking_topology_resolves_through_a_path_install() {
        let ws = tempfile::tempdir().unwrap();
        let share = ShareRoot::new(&ws.path().join(".roost"), &name("app")).unwrap();
        // the dependency's contents live outside the share tree
        let target = ws.path().join("elsewhere/lib");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("lib.roost"), "").unwrap();
        let slot = share.slot(&name("lib"));
        filesystem::symlink_dir(&target, &slot).unwrap();

        let mut dep = InstalledDependency {
            name: name("lib"),
            remote: None,
            local_path: Some(target.clone()),
            installation_path: slot,
            revision: None,
            manifest: None,
        };
        dep.load_manifest(&share).unwrap();

        // the physical linking directory sits next to the real contents, yet
        // still reaches the share root
        let link_dir = target.join(LINK_DIR);
        assert_eq!(
            link_dir.join("lib").canonicalize().unwrap(),
            share.get_path().canonicalize().unwrap()
        );
    }
}
