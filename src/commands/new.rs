use clap::Args;
use std::str::FromStr;

use crate::core::context::Context;
use crate::core::declaration::Name;
use crate::core::manifest::{self, Manifest, Platform};
use crate::error::{Error, Hint};
use crate::util::anyerror::Fault;
use crate::util::filesystem;

#[derive(Debug, Args)]
pub struct New {
    /// Name for the manifest (and its project)
    name: String,
    /// Target platform tag recorded in the manifest
    #[arg(long, default_value = "ios")]
    platform: String,
}

impl New {
    pub fn exec(&self, c: &Context) -> Result<(), Fault> {
        let name = Name::from_str(&self.name)?;
        let platform = Platform::from_str(&self.platform)?;
        let path = c.get_workspace().join(manifest::manifest_file(&name));
        if filesystem::entry_exists(&path) == true {
            return Err(Error::ManifestExists(path, Hint::InitNotNew))?;
        }
        std::fs::write(&path, Manifest::write_empty(&platform))?;
        println!("info: created manifest {:?}", path);
        Ok(())
    }
}
