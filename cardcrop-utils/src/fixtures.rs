//! Shared test fixtures.
//!
//! Fixture files live in the workspace-level `fixtures/` directory so that the
//! core, utility and CLI crates all read the same prediction samples.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

const FIXTURE_ENV: &str = "CARDCROP_FIXTURE_ROOT";

/// Resolve the directory holding shared test fixtures.
///
/// `CARDCROP_FIXTURE_ROOT` wins when set; otherwise the nearest `fixtures`
/// directory above this crate's manifest is used.
pub fn fixtures_dir() -> Result<PathBuf> {
    if let Ok(value) = env::var(FIXTURE_ENV) {
        return Ok(PathBuf::from(value));
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .map(|ancestor| ancestor.join("fixtures"))
        .find(|candidate| candidate.is_dir())
        .with_context(|| {
            format!(
                "fixtures directory not found starting from {}",
                manifest_dir.display()
            )
        })
}

/// Resolve a path inside the fixture folder, failing if it does not exist.
///
/// # Arguments
///
/// * `relative` - Path relative to the fixtures root, e.g.
///   `predictions/overlapping_cards.json`.
///
/// # Errors
///
/// Returns an error when the fixtures root cannot be located or the file is
/// missing under it.
pub fn fixture_path<P: AsRef<Path>>(relative: P) -> Result<PathBuf> {
    let relative = relative.as_ref();
    let root = fixtures_dir()?;
    let full = root.join(relative);
    anyhow::ensure!(
        full.exists(),
        "fixture {} does not exist under {}",
        relative.display(),
        root.display()
    );
    Ok(full)
}

/// Read a fixture file as raw bytes.
pub fn load_fixture_bytes<P: AsRef<Path>>(relative: P) -> Result<Vec<u8>> {
    let path = fixture_path(relative)?;
    fs::read(&path).with_context(|| format!("failed to read fixture {}", path.display()))
}

/// Load fixture JSON into a strongly-typed structure.
///
/// The file is resolved with [`fixture_path`], so the same lookup rules apply.
/// Parse failures name the offending file.
///
/// # Arguments
///
/// * `relative` - Path of the JSON file relative to the fixtures root.
pub fn load_fixture_json<P, T>(relative: P) -> Result<T>
where
    P: AsRef<Path>,
    T: DeserializeOwned,
{
    let path = fixture_path(relative)?;
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read JSON fixture {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse JSON fixture {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn fixture_path_resolves_existing_file() {
        let path = fixture_path("predictions/overlapping_cards.json").expect("fixture exists");
        assert!(path.ends_with(Path::new("predictions/overlapping_cards.json")));
    }

    #[test]
    fn fixture_path_missing_file_errors() {
        assert!(fixture_path("predictions/missing.json").is_err());
    }

    #[test]
    fn load_fixture_json_parses_predictions() {
        let value: Value =
            load_fixture_json("predictions/overlapping_cards.json").expect("load fixture");
        assert!(value["predictions"].is_array());
    }
}
