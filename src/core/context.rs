use std::env;
use std::path::{Path, PathBuf};

use crate::util::anyerror::{AnyError, Fault};
use crate::util::filesystem;

pub const ROOST_MIRRORS: &str = "ROOST_MIRRORS";
pub const ROOST_GIT: &str = "ROOST_GIT";

/// Name of the hidden directory under the workspace holding share trees and
/// the mirror library.
pub const SHARE_DIR: &str = ".roost";
const MIRROR_DIR: &str = "mirrors";

/// Paths and overrides assembled once per run and handed to every command.
pub struct Context {
    workspace: PathBuf,
    mirror_path: PathBuf,
    git_command: Option<String>,
}

impl Context {
    pub fn new() -> Context {
        Context {
            workspace: PathBuf::new(),
            mirror_path: PathBuf::new(),
            git_command: None,
        }
    }

    /// Sets the workspace directory, defaulting to the current directory.
    pub fn workspace(mut self, dir: Option<PathBuf>) -> Result<Context, Fault> {
        self.workspace = match dir {
            Some(d) => {
                if d.is_dir() == false {
                    return Err(AnyError(format!(
                        "directory {:?} does not exist for the workspace",
                        d
                    )))?;
                }
                filesystem::resolve_rel_path(&env::current_dir()?, &d)
            }
            None => env::current_dir()?,
        };
        self.mirror_path = self.workspace.join(SHARE_DIR).join(MIRROR_DIR);
        Ok(self)
    }

    /// Relocates the mirror library if the environment `key` is set.
    ///
    /// A directory set this way must already exist.
    pub fn mirrors(mut self, key: &str) -> Result<Context, Fault> {
        if let Ok(s) = env::var(key) {
            let mp = PathBuf::from(s);
            if mp.is_dir() == false {
                return Err(AnyError(format!(
                    "directory {:?} does not exist for {}",
                    mp, key
                )))?;
            }
            self.mirror_path = mp;
        }
        Ok(self)
    }

    /// Overrides the git command if the environment `key` is set.
    pub fn git(mut self, key: &str) -> Context {
        if let Ok(s) = env::var(key) {
            self.git_command = Some(s);
        }
        self
    }

    pub fn get_workspace(&self) -> &Path {
        &self.workspace
    }

    /// Accesses the directory under which share trees are created.
    pub fn get_share_path(&self) -> PathBuf {
        self.workspace.join(SHARE_DIR)
    }

    pub fn get_mirror_path(&self) -> &Path {
        &self.mirror_path
    }

    pub fn get_git_command(&self) -> Option<&String> {
        self.git_command.as_ref()
    }
}
