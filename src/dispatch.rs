//! Punto de entrada: resuelve el extractor por tipo MIME y lo invoca.

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::extractors::MetadataExtractor;
use crate::metadata::Metadata;
use crate::registry::ExtractorRegistry;
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Registro del proceso, inicializado con los extractores incorporados en modo estricto.
static GLOBAL_REGISTRY: Lazy<RwLock<ExtractorRegistry>> =
    Lazy::new(|| RwLock::new(ExtractorRegistry::with_builtin(&ExtractorConfig::default())));

/// Extrae metadata usando un registro explícito.
///
/// Devuelve [`ExtractError::UnsupportedType`] sin invocar ningún extractor si
/// el tipo no está registrado. El resto de errores vienen del extractor.
pub fn extract_with(
    registry: &ExtractorRegistry,
    path: &Path,
    mime_type: &str,
) -> Result<Metadata, ExtractError> {
    invoke(registry.resolve(mime_type), path, mime_type)
}

/// Extrae metadata con el registro global del proceso.
pub fn extract_metadata(path: &Path, mime_type: &str) -> Result<Metadata, ExtractError> {
    // El candado se suelta antes de extraer.
    invoke(resolve_global(mime_type), path, mime_type)
}

fn invoke(
    extractor: Option<Arc<dyn MetadataExtractor>>,
    path: &Path,
    mime_type: &str,
) -> Result<Metadata, ExtractError> {
    let extractor =
        extractor.ok_or_else(|| ExtractError::UnsupportedType(mime_type.to_string()))?;

    debug!("Extrayendo {:?} ({}) con {}", path, mime_type, extractor.name());
    extractor.extract(path)
}

/// Consulta el registro global.
pub fn resolve_global(mime_type: &str) -> Option<Arc<dyn MetadataExtractor>> {
    GLOBAL_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .resolve(mime_type)
}

/// Registra un extractor adicional en el registro global.
pub fn register_global<I, S>(extractor: Arc<dyn MetadataExtractor>, mime_types: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    GLOBAL_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(extractor, mime_types);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingExtractor {
        calls: Arc<AtomicUsize>,
    }

    impl MetadataExtractor for CountingExtractor {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn supported_types(&self) -> &'static [&'static str] {
            &["application/x-counting"]
        }

        fn extract(&self, path: &Path) -> Result<Metadata, ExtractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut metadata = Metadata::new();
            metadata.insert("path".to_string(), path.display().to_string().into());
            Ok(metadata)
        }
    }

    #[test]
    fn unsupported_type_never_invokes_an_extractor() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ExtractorRegistry::new();
        registry.register_extractor(Arc::new(CountingExtractor {
            calls: calls.clone(),
        }));

        let result = extract_with(&registry, Path::new("/tmp/x.bin"), "application/octet-stream");

        match result {
            Err(ExtractError::UnsupportedType(mime)) => assert_eq!(mime, "application/octet-stream"),
            other => panic!("se esperaba UnsupportedType, llegó {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dispatches_to_the_registered_extractor() -> Result<(), Box<dyn std::error::Error>> {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ExtractorRegistry::new();
        registry.register_extractor(Arc::new(CountingExtractor {
            calls: calls.clone(),
        }));

        let metadata = extract_with(&registry, Path::new("/tmp/x.bin"), "application/x-counting")?;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            metadata.get("path").and_then(|v| v.as_text()),
            Some("/tmp/x.bin")
        );
        Ok(())
    }

    #[test]
    fn global_registry_has_builtin_types() {
        assert_eq!(resolve_global("application/pdf").map(|e| e.name()), Some("pdf"));
        assert_eq!(resolve_global("application/msword").map(|e| e.name()), Some("ole"));
        assert!(resolve_global("image/png").is_none());
    }

    #[test]
    fn global_registration_is_visible_to_dispatch() -> Result<(), Box<dyn std::error::Error>> {
        let calls = Arc::new(AtomicUsize::new(0));
        register_global(
            Arc::new(CountingExtractor {
                calls: calls.clone(),
            }),
            ["application/x-global-counting"],
        );

        extract_metadata(Path::new("/tmp/y.bin"), "application/x-global-counting")?;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn global_dispatch_reports_unsupported_type() {
        assert!(matches!(
            extract_metadata(Path::new("/tmp/z.bin"), "application/x-nobody"),
            Err(ExtractError::UnsupportedType(_))
        ));
    }
}
