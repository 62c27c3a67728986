use serde_derive::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::declaration::{Declaration, Name};
use crate::error::{Error, Hint, LastError};
use crate::util::anyerror::{AnyError, Fault};
use crate::util::filesystem;

pub const MANIFEST_EXTENSION: &str = "roost";

/// Composes the manifest filename carried by the dependency `name`.
pub fn manifest_file(name: &Name) -> String {
    format!("{}.{}", name, MANIFEST_EXTENSION)
}

/// Target platform tag declared by a root manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Platform(String);

impl FromStr for Platform {
    type Err = AnyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() == true {
            return Err(AnyError(String::from("platform tag cannot be empty")));
        }
        if let Some(c) = s
            .chars()
            .find(|c| c.is_ascii_alphanumeric() == false && *c != '-' && *c != '_' && *c != '.')
        {
            return Err(AnyError(format!(
                "character {:?} cannot be used in a platform tag",
                c
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw `[[dependency]]` table before validation.
#[derive(Deserialize)]
struct DependencyEntry {
    name: String,
    url: Option<String>,
    path: Option<PathBuf>,
    rev: Option<String>,
}

#[derive(Deserialize)]
struct ManifestFile {
    platform: Option<String>,
    #[serde(default, rename = "dependency")]
    dependencies: Vec<DependencyEntry>,
}

/// An ordered list of dependency declarations plus the platform the manifest
/// targets. Read-only once loaded; the name derives from the file's base name.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    name: Name,
    platform: Option<Platform>,
    declarations: Vec<Declaration>,
}

impl Manifest {
    /// Loads a manifest from `path`, anchoring relative local-path
    /// declarations at the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, Fault> {
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(s) => s,
            None => {
                return Err(AnyError(format!(
                    "manifest path {:?} is missing a file name",
                    path
                )))?
            }
        };
        let name = Name::from_str(stem)
            .map_err(|e| Error::ManifestParseFailed(path.to_path_buf(), LastError(e.to_string())))?;
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ManifestParseFailed(path.to_path_buf(), LastError(e.to_string())))?;
        let root = filesystem::resolve_rel_path(
            &std::env::current_dir()?,
            path.parent().unwrap_or(Path::new(".")),
        );
        Self::parse(name, &text, &root)
            .map_err(|e| Error::ManifestParseFailed(path.to_path_buf(), LastError(e.to_string())))
            .map_err(Fault::from)
    }

    /// Parses manifest `text` into a [Manifest] named `name`, anchoring
    /// relative local-path declarations at the directory `root`.
    pub fn parse(name: Name, text: &str, root: &Path) -> Result<Self, Fault> {
        let file: ManifestFile = toml::from_str(text)?;
        let platform = match &file.platform {
            Some(p) => Some(Platform::from_str(p)?),
            None => None,
        };
        let mut declarations = Vec::with_capacity(file.dependencies.len());
        for entry in file.dependencies {
            let dep_name = Name::from_str(&entry.name)?;
            declarations.push(Declaration::new(
                dep_name, entry.url, entry.path, entry.rev, root,
            )?);
        }
        Ok(Self {
            name: name,
            platform: platform,
            declarations: declarations,
        })
    }

    pub fn get_name(&self) -> &Name {
        &self.name
    }

    pub fn get_platform(&self) -> Option<&Platform> {
        self.platform.as_ref()
    }

    pub fn get_declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Composes a [String] to write to a clean manifest file.
    pub fn write_empty(platform: &Platform) -> String {
        format!(
            r#"platform = "{}"

# Declare each dependency with a [[dependency]] table:
#
# [[dependency]]
# name = "zlib"
# url = "https://example.com/zlib.git"
# rev = "0cf2c2f"
#
# [[dependency]]
# name = "shared-utils"
# path = "../shared-utils"
"#,
            platform
        )
    }

    /// Locates the single manifest file residing in `dir`.
    pub fn find_in_dir(dir: &Path) -> Result<PathBuf, Fault> {
        let pattern = dir.join(format!("*.{}", MANIFEST_EXTENSION));
        let mut matches = Vec::new();
        for entry in glob::glob(&pattern.display().to_string())? {
            if let Ok(p) = entry {
                matches.push(p);
            }
        }
        match matches.len() {
            0 => Err(Error::ManifestNotFound(
                dir.to_path_buf(),
                Hint::NewManifest,
            ))?,
            1 => Ok(matches.remove(0)),
            _ => Err(Error::AmbiguousManifest(
                dir.to_path_buf(),
                Hint::ManifestOption,
            ))?,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const APP_MANIFEST: &str = r#"
platform = "ios"

[[dependency]]
name = "networking"
url = "https://example.com/repos/networking.git"
rev = "7f3a9b2"

[[dependency]]
name = "shared-utils"
path = "libs/shared-utils"

[[dependency]]
name = "parser"
url = "https://example.com/repos/parser.git"
"#;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn parse_preserves_declaration_order() {
        let man = Manifest::parse(name("app"), APP_MANIFEST, Path::new("/ws")).unwrap();
        let names: Vec<&str> = man
            .get_declarations()
            .iter()
            .map(|d| d.get_name().as_ref())
            .collect();
        assert_eq!(names, vec!["networking", "shared-utils", "parser"]);
        assert_eq!(man.get_platform().unwrap().to_string(), "ios");
    }

    #[test]
    fn parse_resolves_local_paths_against_root() {
        let man = Manifest::parse(name("app"), APP_MANIFEST, Path::new("/ws")).unwrap();
        assert_eq!(
            man.get_declarations()[1].get_path(),
            Some(Path::new("/ws/libs/shared-utils"))
        );
    }

    #[test]
    fn parse_rejects_sourceless_dependencies() {
        let text = "[[dependency]]\nname = \"zlib\"\n";
        assert!(Manifest::parse(name("app"), text, Path::new("/ws")).is_err());
    }

    #[test]
    fn parse_rejects_bad_toml() {
        assert!(Manifest::parse(name("app"), "platform = [", Path::new("/ws")).is_err());
    }

    #[test]
    fn empty_manifest_parses_back() {
        let text = Manifest::write_empty(&Platform::from_str("ios").unwrap());
        let man = Manifest::parse(name("fresh"), &text, Path::new("/ws")).unwrap();
        assert_eq!(man.get_declarations().len(), 0);
        assert_eq!(man.get_platform().unwrap().to_string(), "ios");
    }

    #[test]
    fn locate_single_manifest() {
        let dir = tempfile::tempdir().unwrap();
        // none yet
        assert!(Manifest::find_in_dir(dir.path()).is_err());
        std::fs::write(dir.path().join("app.roost"), "platform = \"ios\"\n").unwrap();
        assert_eq!(
            Manifest::find_in_dir(dir.path()).unwrap(),
            dir.path().join("app.roost")
        );
        // a second manifest makes the choice ambiguous
        std::fs::write(dir.path().join("other.roost"), "platform = \"ios\"\n").unwrap();
        assert!(Manifest::find_in_dir(dir.path()).is_err());
    }
}
