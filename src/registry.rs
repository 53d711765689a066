//! Directorio de extractores indexado por tipo MIME.

use crate::config::ExtractorConfig;
use crate::extractors::{MetadataExtractor, OfficeOpenXmlExtractor, OleExtractor, PdfExtractor};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Asocia cada tipo MIME con el extractor responsable.
///
/// Un tipo registrado dos veces queda con el último extractor; no se
/// considera un error.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    mime_mapping: BTreeMap<String, Arc<dyn MetadataExtractor>>,
}

impl ExtractorRegistry {
    /// Registro vacío.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registro con los tres extractores incorporados.
    pub fn with_builtin(config: &ExtractorConfig) -> Self {
        let mut registry = Self::new();
        registry.register_extractor(Arc::new(OleExtractor::new()));
        registry.register_extractor(Arc::new(OfficeOpenXmlExtractor::new(config.markup_mode)));
        registry.register_extractor(Arc::new(PdfExtractor::new()));
        registry
    }

    /// Declara a `extractor` responsable de cada tipo en `mime_types`.
    pub fn register<I, S>(&mut self, extractor: Arc<dyn MetadataExtractor>, mime_types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for mime in mime_types {
            let mime = mime.into();
            if let Some(previous) = self.mime_mapping.insert(mime.clone(), extractor.clone()) {
                debug!(
                    "{} reemplaza a {} para {}",
                    extractor.name(),
                    previous.name(),
                    mime
                );
            }
        }
    }

    /// Registra el extractor para los tipos que declara soportar.
    pub fn register_extractor(&mut self, extractor: Arc<dyn MetadataExtractor>) {
        let types = extractor.supported_types();
        self.register(extractor, types.iter().copied());
    }

    /// Busca el extractor de un tipo MIME; `None` si nadie lo reclama.
    pub fn resolve(&self, mime_type: &str) -> Option<Arc<dyn MetadataExtractor>> {
        self.mime_mapping.get(mime_type).cloned()
    }

    /// Tipos registrados junto al nombre de su extractor, en orden alfabético.
    pub fn supported_types(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.mime_mapping
            .iter()
            .map(|(mime, extractor)| (mime.as_str(), extractor.name()))
    }

    pub fn len(&self) -> usize {
        self.mime_mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mime_mapping.is_empty()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.supported_types()).finish()
    }
}
