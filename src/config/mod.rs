//! Configuration persistante
//!
//! Un petit fichier JSON qui retient le dossier de données.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Nom du fichier de configuration (dans le dossier courant)
pub const CONFIG_FILE_NAME: &str = "wavy.config";

/// Erreurs de configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Impossible de lire {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration invalide dans {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Erreur de sérialisation: {0}")]
    Serialize(serde_json::Error),

    #[error("Impossible d'écrire {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Dossier où sont exportées les données
    pub data_folder: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_folder: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Chemin par défaut du fichier
    pub fn default_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE_NAME)
    }

    /// Charge la configuration; `Ok(None)` si le fichier n'existe pas
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let config = serde_json::from_str(&content).map_err(|e| ConfigError::Malformed {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::info!("Config chargée depuis {}", path.display());
        Ok(Some(config))
    }

    /// Charge la configuration ou retombe sur les valeurs par défaut
    ///
    /// Un fichier absent ou invalide n'est pas fatal.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::warn!(
                    "Pas de configuration ({}), dossier de données: .",
                    path.display()
                );
                Self::default()
            }
            Err(e) => {
                tracing::warn!("{}, dossier de données: .", e);
                Self::default()
            }
        }
    }

    /// Sauvegarde la configuration
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, json).map_err(write_err)?;

        tracing::info!("Config sauvegardée dans {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_is_local_file() {
        assert_eq!(AppConfig::default_path(), PathBuf::from("wavy.config"));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        assert!(AppConfig::load(&path).unwrap().is_none());
        assert_eq!(AppConfig::load_or_default(&path), AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = AppConfig {
            data_folder: PathBuf::from("/data/mesures"),
        };

        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), Some(config));
    }

    #[test]
    fn test_reads_expected_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"data_folder": "/home/user/wavy"}"#).unwrap();

        let config = AppConfig::load(&path).unwrap().unwrap();
        assert_eq!(config.data_folder, PathBuf::from("/home/user/wavy"));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ data_folder: ").unwrap();

        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Malformed { .. })
        ));
        assert_eq!(AppConfig::load_or_default(&path), AppConfig::default());
    }
}
