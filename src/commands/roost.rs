use clap::{Parser, Subcommand};

use crate::commands::install::Install;
use crate::commands::list::List;
use crate::commands::new::New;
use crate::core::context::{Context, ROOST_GIT, ROOST_MIRRORS};
use crate::util::anyerror::Fault;

#[derive(Debug, Parser)]
#[command(
    name = "roost",
    version,
    about = "Dependency manager for native libraries"
)]
pub struct Roost {
    #[command(subcommand)]
    command: RoostSubcommand,
}

#[derive(Debug, Subcommand)]
enum RoostSubcommand {
    /// Resolve and install every dependency of the root manifest
    Install(Install),
    /// Report installed dependencies and their paths
    List(List),
    /// Create a fresh manifest file
    New(New),
}

impl Roost {
    pub fn exec(self) -> Result<(), Fault> {
        // set up the run context before dispatching the command
        let context = Context::new()
            .workspace(None)?
            .mirrors(ROOST_MIRRORS)?
            .git(ROOST_GIT);
        match &self.command {
            RoostSubcommand::Install(c) => c.exec(&context),
            RoostSubcommand::List(c) => c.exec(&context),
            RoostSubcommand::New(c) => c.exec(&context),
        }
    }
}
