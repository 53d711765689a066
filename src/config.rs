//! Configuración de los extractores, con valores por defecto y carga desde TOML.

use crate::error::ExtractError;
use crate::markup::MarkupMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// Cómo reacciona el lector de `docProps/` ante markup mal formado.
    pub markup_mode: MarkupMode,
}

impl ExtractorConfig {
    pub fn lenient() -> Self {
        Self {
            markup_mode: MarkupMode::Lenient,
        }
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ExtractError> {
        toml::from_str(input).map_err(|err| ExtractError::Config(err.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ExtractError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            ExtractError::Config(format!("No se pudo leer `{}`: {err}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_to_strict_markup() {
        assert_eq!(ExtractorConfig::default().markup_mode, MarkupMode::Strict);
        assert_eq!(ExtractorConfig::from_toml_str("").unwrap(), ExtractorConfig::default());
    }

    #[test]
    fn parses_lenient_mode() {
        let config = ExtractorConfig::from_toml_str("markup_mode = \"lenient\"\n").unwrap();
        assert_eq!(config, ExtractorConfig::lenient());
    }

    #[test]
    fn rejects_unknown_keys_and_modes() {
        assert!(matches!(
            ExtractorConfig::from_toml_str("strict = false"),
            Err(ExtractError::Config(_))
        ));
        assert!(matches!(
            ExtractorConfig::from_toml_str("markup_mode = \"sloppy\""),
            Err(ExtractError::Config(_))
        ));
    }

    #[test]
    fn loads_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("metalens.toml");
        std::fs::write(&path, "markup_mode = \"strict\"\n")?;

        assert_eq!(ExtractorConfig::load(&path)?, ExtractorConfig::default());
        assert!(ExtractorConfig::load(&dir.path().join("missing.toml")).is_err());
        Ok(())
    }
}
