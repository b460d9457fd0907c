use serde::Serialize;
use std::collections::HashMap;
use std::ffi::OsString;

/// Presence of a secret-bearing environment variable. The value is never kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvSecret {
    pub name: String,
    pub chars: Option<usize>,
}

/// The process environment, minus variables whose name or value is not
/// valid UTF-8.
pub fn process_env() -> HashMap<String, String> {
    utf8_env(std::env::vars_os())
}

pub fn utf8_env(vars: impl IntoIterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    let mut env = HashMap::new();
    for (key, value) in vars {
        match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => {
                env.insert(key, value);
            }
            (key, _) => {
                let name = match key {
                    Ok(key) => key,
                    Err(raw) => raw.to_string_lossy().into_owned(),
                };
                tracing::warn!("Skipping environment variable {} (not valid UTF-8)", name);
            }
        }
    }
    env
}

pub fn secret_env_report(env: &HashMap<String, String>, names: &[String]) -> Vec<EnvSecret> {
    names
        .iter()
        .map(|name| EnvSecret {
            name: name.clone(),
            chars: env.get(name).map(|v| v.chars().count()),
        })
        .collect()
}
