use colored::Colorize;
use std::{fmt::Display, path::PathBuf};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("dependency {0:?} must declare a remote url or a local path")]
    DeclarationMissingSource(String),
    #[error("dependency {0:?} declares a local path and cannot pin a revision")]
    DeclarationPinnedPath(String),
    #[error("{0} already on disk, but does not match source repo {1}; aborting")]
    MismatchedRemote(String, String),
    #[error("{0} already locked to commit {1}")]
    AlreadyLocked(String, String),
    #[error("{0} is locked to path {1:?}, cannot specify revision")]
    LockedToPath(String, PathBuf),
    #[error("manifest {0:?} does not define a target platform{1}")]
    MissingPlatform(PathBuf, Hint),
    #[error("no manifest file found in {0:?}{1}")]
    ManifestNotFound(PathBuf, Hint),
    #[error("multiple manifest files found in {0:?}{1}")]
    AmbiguousManifest(PathBuf, Hint),
    #[error("failed to parse manifest {0:?}: {1}")]
    ManifestParseFailed(PathBuf, LastError),
    #[error("manifest file {0:?} already exists{1}")]
    ManifestExists(PathBuf, Hint),
    #[error("failed to clone {0}: {1}")]
    CloneFailed(String, LastError),
    #[error("failed to mirror {0}: {1}")]
    MirrorFailed(String, LastError),
    #[error("failed to refresh mirror for {0}: {1}")]
    MirrorRefreshFailed(String, LastError),
    #[error("failed to update {0}: {1}")]
    UpdateFailed(String, LastError),
    #[error("failed to check out {1} for {0}: {2}")]
    CheckoutFailed(String, String, LastError),
    #[error("exited with error code: {0}")]
    ChildProcErrorCode(i32),
    #[error("terminated by signal")]
    ChildProcTerminated,
    #[error("no installation found at {0:?}{1}")]
    InstallationNotFound(PathBuf, Hint),
}

#[derive(Debug, PartialEq)]
pub struct LastError(pub String);

impl Display for LastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Error::lowerize(self.0.to_string()))
    }
}

impl Error {
    pub fn lowerize(s: String) -> String {
        // get the first word
        let first_word = s.split_whitespace().into_iter().next().unwrap_or("");
        // retain capitalization if the first word is all-caps and longer than 1 character
        if first_word.len() > 1
            && first_word
                .chars()
                .find(|c| c.is_ascii_lowercase() == true)
                .is_none()
        {
            s.to_string()
        } else {
            s.char_indices()
                .map(|(i, c)| if i == 0 { c.to_ascii_lowercase() } else { c })
                .collect()
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Hint {
    InstallTree,
    PlatformField,
    NewManifest,
    ManifestOption,
    InitNotNew,
}

impl Display for Hint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::InstallTree => "use `roost install` to resolve and install dependencies",
            Self::PlatformField => "add `platform = \"<tag>\"` to the root manifest",
            Self::NewManifest => "use `roost new <name>` to create a manifest",
            Self::ManifestOption => "use the \"--manifest\" option to select one explicitly",
            Self::InitNotNew => "remove the existing file or pick a different name",
        };
        write!(
            f,
            "\n\n{}: {}",
            "hint".green(),
            Error::lowerize(message.to_string())
        )
    }
}
