use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;
use crate::util::anyerror::AnyError;
use crate::util::filesystem;

/// A validated dependency identifier.
///
/// Names begin with an ascii letter and continue with letters, digits,
/// dashes, or underscores. A [Name] keys the resolution registry and also
/// names manifest files and installation slots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(String);

impl FromStr for Name {
    type Err = AnyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => (),
            _ => {
                return Err(AnyError(format!(
                    "name {:?} must begin with an ascii letter",
                    s
                )))
            }
        }
        if let Some(c) =
            chars.find(|c| c.is_ascii_alphanumeric() == false && *c != '-' && *c != '_')
        {
            return Err(AnyError(format!(
                "character {:?} cannot be used in a dependency name",
                c
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Where a dependency's contents come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DependencySource {
    /// A remote repository, optionally pinned to an exact revision.
    Remote { url: String, rev: Option<String> },
    /// An absolute path to contents already on disk.
    Path(PathBuf),
}

impl Display for DependencySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote { url, .. } => write!(f, "{}", url),
            Self::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

/// One named dependency entry read from a manifest. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    name: Name,
    source: DependencySource,
}

impl Declaration {
    /// Builds a declaration from raw manifest fields.
    ///
    /// At least one of `url` and `path` is required. When both are given the
    /// local path takes precedence, and a local path rejects a revision pin.
    /// A relative `path` is anchored at `root`, the directory of the manifest
    /// declaring it.
    pub fn new(
        name: Name,
        url: Option<String>,
        path: Option<PathBuf>,
        rev: Option<String>,
        root: &Path,
    ) -> Result<Self, Error> {
        let source = match (url, path) {
            (_, Some(p)) => {
                if rev.is_some() == true {
                    return Err(Error::DeclarationPinnedPath(name.to_string()));
                }
                DependencySource::Path(filesystem::resolve_rel_path(root, &p))
            }
            (Some(u), None) => DependencySource::Remote { url: u, rev },
            (None, None) => return Err(Error::DeclarationMissingSource(name.to_string())),
        };
        Ok(Self {
            name: name,
            source: source,
        })
    }

    pub fn get_name(&self) -> &Name {
        &self.name
    }

    pub fn get_source(&self) -> &DependencySource {
        &self.source
    }

    /// Accesses the remote url, if this dependency is remotely sourced.
    pub fn get_url(&self) -> Option<&str> {
        match &self.source {
            DependencySource::Remote { url, .. } => Some(url),
            DependencySource::Path(_) => None,
        }
    }

    /// Accesses the pinned revision, if one was declared.
    pub fn get_rev(&self) -> Option<&str> {
        match &self.source {
            DependencySource::Remote { rev, .. } => rev.as_deref(),
            DependencySource::Path(_) => None,
        }
    }

    /// Accesses the local path, if this dependency is path sourced.
    pub fn get_path(&self) -> Option<&Path> {
        match &self.source {
            DependencySource::Path(p) => Some(p),
            DependencySource::Remote { .. } => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self.source, DependencySource::Path(_))
    }
}
