//! Builds the flat list of probe targets. Nothing here touches the disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::platform::{join_suffix, BaseDirs, Platform};
use crate::types::{ProbeKind, ProbeTarget};

pub const GENERAL_GROUP: &str = "general";

/// Application identifiers whose per-user data directories are probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIds {
    pub primary: String,
    pub derivatives: Vec<String>,
}

impl AppIds {
    pub fn new(primary: impl Into<String>, derivatives: Vec<String>) -> Self {
        Self {
            primary: primary.into(),
            derivatives,
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.derivatives.iter().map(String::as_str))
    }
}

impl Default for AppIds {
    fn default() -> Self {
        Self::new("itch", vec!["kitch".to_string()])
    }
}

pub fn build_catalog(
    platform: &Platform,
    dirs: &BaseDirs,
    env: &HashMap<String, String>,
    apps: &AppIds,
) -> Vec<ProbeTarget> {
    let mut targets = Vec::new();
    for app in apps.all() {
        targets.extend(app_targets(platform, dirs, &apps.primary, app));
    }
    targets.extend(general_targets(platform, dirs, env));
    tracing::debug!(
        "Built catalog of {} targets for platform {}",
        targets.len(),
        platform
    );
    targets
}

fn app_targets(platform: &Platform, dirs: &BaseDirs, primary: &str, app: &str) -> Vec<ProbeTarget> {
    let data_dir = dirs.app_data.join(app);
    let under = |suffix: &str| join_suffix(&data_dir, suffix);

    vec![
        ProbeTarget::new(app, "data directory", data_dir.clone(), ProbeKind::Existence),
        ProbeTarget::new(
            app,
            "butler credentials",
            butler_creds_path(platform, dirs, primary),
            ProbeKind::Content,
        ),
        ProbeTarget::new(app, "session database", under("db/butler.db"), ProbeKind::Content),
        ProbeTarget::new(
            app,
            "cookie partitions",
            under("Partitions"),
            ProbeKind::Enumerate {
                child: "Cookies".to_string(),
            },
        ),
        ProbeTarget::new(app, "preferences", under("preferences.json"), ProbeKind::Content),
        ProbeTarget::new(app, "application log", under("logs/itch.txt"), ProbeKind::Content),
    ]
}

// The butler CLI hardcodes its credential directory to the primary app name,
// so derivative builds share the primary's file. On Windows it lives under
// the home directory's .config rather than %APPDATA%.
fn butler_creds_path(platform: &Platform, dirs: &BaseDirs, primary: &str) -> PathBuf {
    let base = match platform {
        Platform::Windows => dirs.home.join(".config"),
        _ => dirs.app_data.clone(),
    };
    base.join(primary).join("butler_creds")
}

fn general_targets(
    platform: &Platform,
    dirs: &BaseDirs,
    env: &HashMap<String, String>,
) -> Vec<ProbeTarget> {
    let home = |suffix: &str| join_suffix(&dirs.home, suffix);
    let mut entries: Vec<(&str, PathBuf)> = vec![
        ("SSH directory", home(".ssh")),
        ("GPG directory", home(".gnupg")),
        ("Git credentials", home(".git-credentials")),
        ("Docker config", home(".docker/config.json")),
    ];

    match platform {
        Platform::Linux => {
            entries.push(("Chrome data", home(".config/google-chrome")));
            entries.push(("Firefox data", home(".mozilla/firefox")));
        }
        Platform::Darwin => {
            entries.push((
                "Chrome data",
                home("Library/Application Support/Google/Chrome"),
            ));
            entries.push((
                "Firefox data",
                home("Library/Application Support/Firefox/Profiles"),
            ));
        }
        Platform::Windows => {
            let local = local_app_data(dirs, env);
            entries.push(("Chrome data", join_suffix(&local, "Google/Chrome/User Data")));
            entries.push((
                "Firefox data",
                join_suffix(&dirs.app_data, "Mozilla/Firefox/Profiles"),
            ));
        }
        Platform::Other(_) => {}
    }

    entries
        .into_iter()
        .map(|(name, path)| ProbeTarget::new(GENERAL_GROUP, name, path, ProbeKind::Existence))
        .collect()
}

fn local_app_data(dirs: &BaseDirs, env: &HashMap<String, String>) -> PathBuf {
    match env.get("LOCALAPPDATA").filter(|v| !v.is_empty()) {
        Some(value) => Path::new(value).to_path_buf(),
        None => join_suffix(&dirs.home, "AppData/Local"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux_dirs() -> BaseDirs {
        BaseDirs::rooted_at(&Platform::Linux, "/home/alice")
    }

    fn names(targets: &[ProbeTarget], group: &str) -> Vec<String> {
        targets
            .iter()
            .filter(|t| t.group == group)
            .map(|t| t.name.clone())
            .collect()
    }

    #[test]
    fn test_every_app_gets_full_target_set() {
        let catalog = build_catalog(
            &Platform::Linux,
            &linux_dirs(),
            &HashMap::new(),
            &AppIds::default(),
        );
        let expected = vec![
            "data directory",
            "butler credentials",
            "session database",
            "cookie partitions",
            "preferences",
            "application log",
        ];
        assert_eq!(names(&catalog, "itch"), expected);
        assert_eq!(names(&catalog, "kitch"), expected);
    }

    #[test]
    fn test_derivative_credentials_live_under_primary() {
        let catalog = build_catalog(
            &Platform::Linux,
            &linux_dirs(),
            &HashMap::new(),
            &AppIds::default(),
        );
        let creds: Vec<_> = catalog
            .iter()
            .filter(|t| t.name == "butler credentials")
            .collect();
        assert_eq!(creds.len(), 2);
        for target in creds {
            assert_eq!(
                target.path,
                PathBuf::from("/home/alice/.config/itch/butler_creds")
            );
        }
    }

    #[test]
    fn test_windows_credentials_under_home_dot_config() {
        let dirs = BaseDirs::rooted_at(&Platform::Windows, "/c/Users/bob");
        let catalog = build_catalog(&Platform::Windows, &dirs, &HashMap::new(), &AppIds::default());
        let creds = catalog
            .iter()
            .find(|t| t.group == "kitch" && t.name == "butler credentials")
            .unwrap();
        assert_eq!(
            creds.path,
            PathBuf::from("/c/Users/bob/.config/itch/butler_creds")
        );
    }

    #[test]
    fn test_app_paths_under_app_data() {
        let catalog = build_catalog(
            &Platform::Linux,
            &linux_dirs(),
            &HashMap::new(),
            &AppIds::default(),
        );
        let db = catalog
            .iter()
            .find(|t| t.group == "kitch" && t.name == "session database")
            .unwrap();
        assert_eq!(db.path, PathBuf::from("/home/alice/.config/kitch/db/butler.db"));

        let partitions = catalog
            .iter()
            .find(|t| t.group == "itch" && t.name == "cookie partitions")
            .unwrap();
        assert_eq!(
            partitions.probe,
            ProbeKind::Enumerate {
                child: "Cookies".into()
            }
        );
    }

    #[test]
    fn test_general_targets_per_platform() {
        let env = HashMap::new();
        let linux = build_catalog(&Platform::Linux, &linux_dirs(), &env, &AppIds::default());
        assert_eq!(names(&linux, GENERAL_GROUP).len(), 6);
        assert!(linux
            .iter()
            .any(|t| t.path == PathBuf::from("/home/alice/.mozilla/firefox")));

        let mac_dirs = BaseDirs::rooted_at(&Platform::Darwin, "/Users/alice");
        let mac = build_catalog(&Platform::Darwin, &mac_dirs, &env, &AppIds::default());
        assert!(mac.iter().any(|t| t.path
            == PathBuf::from("/Users/alice/Library/Application Support/Google/Chrome")));

        let other = build_catalog(
            &Platform::Other("freebsd".into()),
            &linux_dirs(),
            &env,
            &AppIds::default(),
        );
        assert_eq!(
            names(&other, GENERAL_GROUP),
            vec!["SSH directory", "GPG directory", "Git credentials", "Docker config"]
        );
    }

    #[test]
    fn test_windows_chrome_uses_localappdata() {
        let dirs = BaseDirs::rooted_at(&Platform::Windows, "/c/Users/bob");
        let mut env = HashMap::new();
        env.insert("LOCALAPPDATA".to_string(), "/d/Local".to_string());

        let catalog = build_catalog(&Platform::Windows, &dirs, &env, &AppIds::default());
        let chrome = catalog.iter().find(|t| t.name == "Chrome data").unwrap();
        assert_eq!(chrome.path, PathBuf::from("/d/Local/Google/Chrome/User Data"));

        let fallback = build_catalog(&Platform::Windows, &dirs, &HashMap::new(), &AppIds::default());
        let chrome = fallback.iter().find(|t| t.name == "Chrome data").unwrap();
        assert_eq!(
            chrome.path,
            PathBuf::from("/c/Users/bob/AppData/Local/Google/Chrome/User Data")
        );
    }

    #[test]
    fn test_builder_does_not_need_paths_to_exist() {
        let dirs = BaseDirs::rooted_at(&Platform::Linux, "/definitely/not/here");
        let catalog = build_catalog(&Platform::Linux, &dirs, &HashMap::new(), &AppIds::default());
        assert_eq!(catalog.len(), 6 * 2 + 6);
    }
}
