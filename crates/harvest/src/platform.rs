//! Platform identification and the named per-user base directories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ProbeError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Linux,
    Darwin,
    Windows,
    Other(String),
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => Platform::Linux,
            "macos" => Platform::Darwin,
            "windows" => Platform::Windows,
            other => Platform::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Platform::Linux => "linux",
            Platform::Darwin => "darwin",
            Platform::Windows => "win32",
            Platform::Other(tag) => tag,
        }
    }
}

impl FromStr for Platform {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        match tag.as_str() {
            "linux" => Ok(Platform::Linux),
            "darwin" | "macos" => Ok(Platform::Darwin),
            "win32" | "windows" => Ok(Platform::Windows),
            "" => Err(ProbeError::InvalidArgument("empty platform tag".into())),
            t if t.chars().all(|c| c.is_ascii_alphanumeric()) => Ok(Platform::Other(t.to_string())),
            _ => Err(ProbeError::InvalidArgument(format!(
                "malformed platform tag: {s}"
            ))),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamedDir {
    Home,
    AppData,
    Temp,
    Desktop,
    Documents,
}

impl NamedDir {
    pub const ALL: [NamedDir; 5] = [
        NamedDir::Home,
        NamedDir::AppData,
        NamedDir::Temp,
        NamedDir::Desktop,
        NamedDir::Documents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NamedDir::Home => "home",
            NamedDir::AppData => "appData",
            NamedDir::Temp => "temp",
            NamedDir::Desktop => "desktop",
            NamedDir::Documents => "documents",
        }
    }
}

impl FromStr for NamedDir {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NamedDir::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ProbeError::InvalidArgument(format!("unknown named directory: {s}")))
    }
}

/// Snapshot of the OS-provided per-user directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseDirs {
    pub home: PathBuf,
    pub app_data: PathBuf,
    pub temp: PathBuf,
    pub desktop: PathBuf,
    pub documents: PathBuf,
}

impl BaseDirs {
    /// Asks the OS path provider for the current user's directories.
    pub fn discover() -> Result<Self, ProbeError> {
        let base = directories::BaseDirs::new().ok_or(ProbeError::NoHomeDirectory)?;
        let home = base.home_dir().to_path_buf();
        let user = directories::UserDirs::new();

        let desktop = user
            .as_ref()
            .and_then(|u| u.desktop_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| home.join("Desktop"));
        let documents = user
            .as_ref()
            .and_then(|u| u.document_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| home.join("Documents"));

        Ok(Self {
            app_data: base.config_dir().to_path_buf(),
            temp: std::env::temp_dir(),
            home,
            desktop,
            documents,
        })
    }

    /// Conventional layout under a single home directory, used when the
    /// caller wants to point the whole catalog somewhere else.
    pub fn rooted_at(platform: &Platform, home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let app_data = match platform {
            Platform::Darwin => home.join("Library").join("Application Support"),
            Platform::Windows => home.join("AppData").join("Roaming"),
            _ => home.join(".config"),
        };
        Self {
            temp: std::env::temp_dir(),
            desktop: home.join("Desktop"),
            documents: home.join("Documents"),
            app_data,
            home,
        }
    }

    pub fn get(&self, dir: NamedDir) -> &Path {
        match dir {
            NamedDir::Home => &self.home,
            NamedDir::AppData => &self.app_data,
            NamedDir::Temp => &self.temp,
            NamedDir::Desktop => &self.desktop,
            NamedDir::Documents => &self.documents,
        }
    }
}

/// Resolves named directories and composes relative suffixes onto them.
#[derive(Debug, Clone)]
pub struct PathResolver {
    platform: Platform,
    dirs: BaseDirs,
}

impl PathResolver {
    pub fn new(platform: Platform, dirs: BaseDirs) -> Self {
        Self { platform, dirs }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn dirs(&self) -> &BaseDirs {
        &self.dirs
    }

    pub fn resolve(&self, name: &str) -> Result<PathBuf, ProbeError> {
        let dir: NamedDir = name.parse()?;
        Ok(self.dirs.get(dir).to_path_buf())
    }

    /// `base` joined with a `/`-separated suffix, one component at a time so
    /// the platform separator is used throughout.
    pub fn join(&self, dir: NamedDir, suffix: &str) -> PathBuf {
        join_suffix(self.dirs.get(dir), suffix)
    }
}

pub(crate) fn join_suffix(base: &Path, suffix: &str) -> PathBuf {
    suffix
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(base.to_path_buf(), |path, part| path.join(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> BaseDirs {
        BaseDirs::rooted_at(&Platform::Linux, "/home/alice")
    }

    #[test]
    fn test_platform_tags() {
        assert_eq!("linux".parse::<Platform>().unwrap(), Platform::Linux);
        assert_eq!("darwin".parse::<Platform>().unwrap(), Platform::Darwin);
        assert_eq!("macos".parse::<Platform>().unwrap(), Platform::Darwin);
        assert_eq!("win32".parse::<Platform>().unwrap(), Platform::Windows);
        assert_eq!(
            "freebsd".parse::<Platform>().unwrap(),
            Platform::Other("freebsd".into())
        );
        assert!("".parse::<Platform>().is_err());
        assert!("win/32".parse::<Platform>().is_err());
    }

    #[test]
    fn test_resolve_known_names() {
        let resolver = PathResolver::new(Platform::Linux, fixture());
        assert_eq!(resolver.resolve("home").unwrap(), PathBuf::from("/home/alice"));
        assert_eq!(
            resolver.resolve("appData").unwrap(),
            PathBuf::from("/home/alice/.config")
        );
        assert_eq!(
            resolver.resolve("documents").unwrap(),
            PathBuf::from("/home/alice/Documents")
        );
    }

    #[test]
    fn test_resolve_unknown_name_is_invalid_argument() {
        let resolver = PathResolver::new(Platform::Linux, fixture());
        assert!(matches!(
            resolver.resolve("downloads"),
            Err(ProbeError::InvalidArgument(_))
        ));
        assert!(matches!(
            resolver.resolve("AppData"),
            Err(ProbeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_join_suffix_splits_components() {
        let resolver = PathResolver::new(Platform::Linux, fixture());
        let joined = resolver.join(NamedDir::Home, ".docker/config.json");
        assert_eq!(joined, PathBuf::from("/home/alice/.docker/config.json"));
        assert_eq!(joined.components().count(), 5);
    }

    #[test]
    fn test_rooted_at_per_platform_app_data() {
        let mac = BaseDirs::rooted_at(&Platform::Darwin, "/Users/bob");
        assert_eq!(
            mac.app_data,
            PathBuf::from("/Users/bob/Library/Application Support")
        );
        let win = BaseDirs::rooted_at(&Platform::Windows, "C:/Users/bob");
        assert!(win.app_data.ends_with("AppData/Roaming"));
    }
}
