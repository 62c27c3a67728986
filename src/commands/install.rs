use clap::Args;
use std::path::PathBuf;

use crate::core::context::Context;
use crate::core::manifest::Manifest;
use crate::core::mirror::MirrorLibrary;
use crate::core::record::ShareRoot;
use crate::core::resolver::Resolver;
use crate::core::vcs::Git;
use crate::util::anyerror::Fault;
use crate::util::filesystem;

#[derive(Debug, Args)]
pub struct Install {
    /// Root manifest file (default: the single *.roost file in the workspace)
    #[arg(long, value_name = "file")]
    manifest: Option<PathBuf>,
}

impl Install {
    pub fn exec(&self, c: &Context) -> Result<(), Fault> {
        let path = match &self.manifest {
            Some(p) => filesystem::resolve_rel_path(c.get_workspace(), p),
            None => Manifest::find_in_dir(c.get_workspace())?,
        };
        let root = Manifest::from_file(&path)?;

        let vcs = Git::new().command(c.get_git_command().cloned());
        let share = ShareRoot::new(&c.get_share_path(), root.get_name())?;
        let mirrors = MirrorLibrary::new(c.get_mirror_path().to_path_buf(), &vcs);

        let registry = Resolver::new(share, &vcs, mirrors).resolve(&root)?;
        println!("info: {} dependencies installed", registry.len());
        Ok(())
    }
}
