use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;

use crate::core::declaration::{Declaration, Name};
use crate::core::manifest::{self, Manifest};
use crate::core::mirror::MirrorLibrary;
use crate::core::record::{InstalledDependency, ShareRoot};
use crate::core::vcs::SourceControl;
use crate::error::{Error, Hint};
use crate::util::anyerror::Fault;

/// Run-scoped mapping from dependency name to its installed record.
///
/// A name installed anywhere in the transitive graph is visible and reused
/// everywhere, including across manifests declared by different dependencies.
#[derive(Debug, PartialEq)]
pub struct Registry(BTreeMap<Name, InstalledDependency>);

impl Registry {
    fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, name: &Name) -> Option<&InstalledDependency> {
        self.0.get(name)
    }

    fn get_mut(&mut self, name: &Name) -> Option<&mut InstalledDependency> {
        self.0.get_mut(name)
    }

    fn insert(&mut self, dep: InstalledDependency) {
        self.0.insert(dep.get_name().clone(), dep);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the installed records in name order.
    pub fn iter(&self) -> impl Iterator<Item = &InstalledDependency> {
        self.0.values()
    }
}

/// Walks a root manifest's transitive dependency closure breadth-first,
/// installing each distinct name exactly once and enforcing identity and
/// revision-lock consistency across the whole graph.
pub struct Resolver<'a> {
    share: ShareRoot,
    vcs: &'a dyn SourceControl,
    mirrors: MirrorLibrary<'a>,
    registry: Registry,
    pending: VecDeque<Declaration>,
}

impl<'a> Resolver<'a> {
    pub fn new(share: ShareRoot, vcs: &'a dyn SourceControl, mirrors: MirrorLibrary<'a>) -> Self {
        Self {
            share: share,
            vcs: vcs,
            mirrors: mirrors,
            registry: Registry::new(),
            pending: VecDeque::new(),
        }
    }

    /// Produces a fully installed, consistent registry covering `root`'s
    /// entire transitive closure, or fails on the first consistency
    /// violation. Nothing already installed is rolled back on failure.
    pub fn resolve(mut self, root: &Manifest) -> Result<Registry, Fault> {
        // the platform tag is required on the root manifest only
        if root.get_platform().is_none() == true {
            return Err(Error::MissingPlatform(
                PathBuf::from(manifest::manifest_file(root.get_name())),
                Hint::PlatformField,
            ))?;
        }
        self.pending.extend(root.get_declarations().iter().cloned());
        while let Some(decl) = self.pending.pop_front() {
            self.step(&decl)?;
        }
        Ok(self.registry)
    }

    /// Handles one pending declaration: install a new name, or validate and
    /// possibly re-lock a name seen before.
    fn step(&mut self, decl: &Declaration) -> Result<(), Fault> {
        match self.registry.get_mut(decl.get_name()) {
            Some(existing) => {
                existing.ensure_compatible_with(decl, self.vcs)?;
                if let Some(rev) = decl.get_rev() {
                    // a pin that actually moved the checkout may have swapped
                    // the nested manifest, so its declarations get walked
                    // again; a name can transition at most once, which keeps
                    // re-enqueueing bounded
                    if existing.lock(rev, &self.share, self.vcs)? == true {
                        let nested: Vec<Declaration> = existing.get_dependencies().to_vec();
                        self.pending.extend(nested);
                    }
                }
            }
            None => {
                let dep = InstalledDependency::install(decl, &self.share, self.vcs, &self.mirrors)?;
                self.pending.extend(dep.get_dependencies().iter().cloned());
                self.registry.insert(dep);
            }
        }
        Ok(())
    }
}
