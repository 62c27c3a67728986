use std::path::Path;
use std::process::Command;

use crate::error::Error;
use crate::util::anyerror::Fault;

/// Ambient repository context must never leak into an invocation, so each
/// subprocess drops these variables from its own environment.
const SCRUBBED_ENV: [&str; 4] = ["GIT_DIR", "GIT_WORK_TREE", "GIT_INDEX_FILE", "GIT_SSH"];

/// The source-control capability required to materialize dependencies.
pub trait SourceControl {
    /// Clones `url` into `dest`, optionally borrowing objects from a local
    /// `reference` store.
    fn clone(&self, url: &str, dest: &Path, reference: Option<&Path>) -> Result<(), Fault>;
    /// Creates a bare mirror of `url` at `dest`.
    fn clone_mirror(&self, url: &str, dest: &Path) -> Result<(), Fault>;
    /// Reads the configured remote of the checkout at `repo`, if it has one.
    fn remote_url(&self, repo: &Path) -> Result<Option<String>, Fault>;
    /// Determines the branch the checkout's remote advertises as its default.
    fn default_branch(&self, repo: &Path) -> Result<String, Fault>;
    fn fetch(&self, repo: &Path) -> Result<(), Fault>;
    fn checkout(&self, repo: &Path, rev: &str) -> Result<(), Fault>;
    fn pull(&self, repo: &Path) -> Result<(), Fault>;
    fn remote_update(&self, repo: &Path) -> Result<(), Fault>;
}

/// A series of git commands ran through subprocesses rather than libgit2
/// bindings, to bypass a lot of issues with using libgit with private
/// repositories.
pub struct Git {
    command: String,
}

impl Git {
    /// Creates an empty `Git` struct.
    pub fn new() -> Self {
        Self {
            command: String::new(),
        }
    }

    /// Sets the command for calling git through processes.
    ///
    /// When `s` is `None`, the command assumes git is on path and is simply `git`.
    pub fn command(mut self, s: Option<String>) -> Self {
        self.command = s.unwrap_or(String::from("git"));
        self
    }

    fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<(), Fault> {
        let mut proc = Command::new(&self.command);
        proc.args(args);
        if let Some(d) = cwd {
            proc.current_dir(d);
        }
        for key in SCRUBBED_ENV {
            proc.env_remove(key);
        }
        let status = proc.status()?;
        match status.code() {
            Some(0) => Ok(()),
            Some(num) => Err(Error::ChildProcErrorCode(num))?,
            None => Err(Error::ChildProcTerminated)?,
        }
    }

    /// Runs git capturing stdout, mapping a non-zero exit to `None`.
    fn output(&self, args: &[&str], cwd: &Path) -> Result<Option<String>, Fault> {
        let mut proc = Command::new(&self.command);
        proc.args(args).current_dir(cwd);
        for key in SCRUBBED_ENV {
            proc.env_remove(key);
        }
        let out = proc.output()?;
        if out.status.success() == false {
            return Ok(None);
        }
        Ok(Some(String::from_utf8(out.stdout)?.trim().to_string()))
    }
}

impl SourceControl for Git {
    fn clone(&self, url: &str, dest: &Path, reference: Option<&Path>) -> Result<(), Fault> {
        // stage in a scratch directory so a failed clone cannot leave a
        // partial checkout at the destination
        let tmp_path = tempfile::tempdir()?;
        let refer: String;
        let mut args = vec!["clone"];
        if let Some(r) = reference {
            refer = r.display().to_string();
            args.push("--reference");
            args.push(&refer);
        }
        args.push(url);
        args.push("staged");
        self.run(&args, Some(tmp_path.path()))?;

        std::fs::create_dir_all(dest)?;
        let mut from_paths = Vec::new();
        for dir_entry in std::fs::read_dir(tmp_path.path().join("staged"))? {
            match dir_entry {
                Ok(d) => from_paths.push(d.path()),
                Err(_) => (),
            }
        }
        // copy rather than rename because of windows issues
        let options = fs_extra::dir::CopyOptions::new();
        fs_extra::copy_items(&from_paths, dest, &options)?;
        Ok(())
    }

    fn clone_mirror(&self, url: &str, dest: &Path) -> Result<(), Fault> {
        let slot = dest.display().to_string();
        self.run(&["clone", "--mirror", url, &slot], None)
    }

    fn remote_url(&self, repo: &Path) -> Result<Option<String>, Fault> {
        self.output(&["remote", "get-url", "origin"], repo)
    }

    fn default_branch(&self, repo: &Path) -> Result<String, Fault> {
        match self.output(&["symbolic-ref", "--short", "refs/remotes/origin/HEAD"], repo)? {
            Some(s) if s.is_empty() == false => {
                Ok(s.strip_prefix("origin/").unwrap_or(&s).to_string())
            }
            _ => Ok(String::from("master")),
        }
    }

    fn fetch(&self, repo: &Path) -> Result<(), Fault> {
        self.run(&["fetch", "origin"], Some(repo))
    }

    fn checkout(&self, repo: &Path, rev: &str) -> Result<(), Fault> {
        self.run(&["checkout", rev], Some(repo))
    }

    fn pull(&self, repo: &Path) -> Result<(), Fault> {
        self.run(&["pull"], Some(repo))
    }

    /// Runs the command: `git remote update`.
    fn remote_update(&self, repo: &Path) -> Result<(), Fault> {
        self.run(&["remote", "update"], Some(repo))
    }
}
