use clap::Args;
use serde_derive::Serialize;
use std::path::PathBuf;

use crate::core::context::Context;
use crate::core::manifest::Manifest;
use crate::error::{Error, Hint};
use crate::util::anyerror::Fault;
use crate::util::filesystem;

#[derive(Debug, Args)]
pub struct List {
    /// Root manifest file (default: the single *.roost file in the workspace)
    #[arg(long, value_name = "file")]
    manifest: Option<PathBuf>,
    /// Emit machine-readable json
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Entry {
    name: String,
    path: PathBuf,
}

impl List {
    /// Reports `{name, installation path}` for every installed dependency of
    /// the root manifest, for downstream tooling to locate artifacts.
    pub fn exec(&self, c: &Context) -> Result<(), Fault> {
        let path = match &self.manifest {
            Some(p) => filesystem::resolve_rel_path(c.get_workspace(), p),
            None => Manifest::find_in_dir(c.get_workspace())?,
        };
        let root = Manifest::from_file(&path)?;

        let tree = c.get_share_path().join(root.get_name().as_ref());
        if tree.is_dir() == false {
            return Err(Error::InstallationNotFound(tree, Hint::InstallTree))?;
        }
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&tree)? {
            let entry = entry?;
            let name = match entry.file_name().to_str() {
                Some(s) => s.to_string(),
                None => continue,
            };
            if name.starts_with('.') == true {
                continue;
            }
            entries.push(Entry {
                name: name,
                path: entry.path(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        if self.json == true {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            for e in &entries {
                println!("{} {}", e.name, e.path.display());
            }
        }
        Ok(())
    }
}
