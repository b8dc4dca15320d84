// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings file persistence.

use std::path::{Path, PathBuf};

use galleria_core::CorrectionConfig;
use galleria_core::error::Result;
use tracing::{debug, info};

use super::data_dir;

const CONFIG_FILE: &str = "config.json";

/// Default location of the settings file.
pub fn default_config_path() -> PathBuf {
    data_dir::data_dir().join(CONFIG_FILE)
}

/// Load settings from `path`, using defaults when the file does not exist.
///
/// A file that exists but does not parse or validate is an error.
pub fn load_config(path: &Path) -> Result<CorrectionConfig> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file; using defaults");
            return Ok(CorrectionConfig::default());
        }
        Err(err) => return Err(err.into()),
    };
    let config: CorrectionConfig = serde_json::from_str(&data)?;
    config.validate()?;
    Ok(config)
}

/// Write `config` to `path` as pretty-printed JSON.
pub fn persist_config(path: &Path, config: &CorrectionConfig) -> Result<()> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "settings saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use galleria_core::GalleriaError;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config(&dir.path().join("absent.json")).expect("load");
        assert_eq!(config, CorrectionConfig::default());
    }

    #[test]
    fn persisted_settings_load_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = CorrectionConfig {
            jpeg_quality: 0.65,
            preview_max_width: 640,
            ..Default::default()
        };
        persist_config(&path, &config).expect("persist");
        assert_eq!(load_config(&path).expect("load"), config);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            load_config(&path),
            Err(GalleriaError::Serialization(_))
        ));
    }

    #[test]
    fn invalid_values_are_rejected_on_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "min_output_dimension": 0 }"#).expect("write");
        assert!(matches!(load_config(&path), Err(GalleriaError::Config(_))));
    }
}
