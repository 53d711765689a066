//! Tipos de error para la extracción de metadata.

use thiserror::Error;

/// Errores que puede devolver una llamada de extracción.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Ningún extractor registrado reclama el tipo MIME.
    #[error("tipo MIME no soportado: {0}")]
    UnsupportedType(String),

    #[error("error de E/S: {0}")]
    Io(#[from] std::io::Error),

    /// El contenedor ZIP de Office Open XML está corrupto.
    #[error("documento Office inválido: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// El archivo compuesto OLE no se pudo abrir o leer.
    #[error("archivo compuesto OLE inválido: {0}")]
    CompoundFile(#[source] std::io::Error),

    /// Un flujo de propiedades OLE existe pero está mal formado.
    #[error("flujo de propiedades OLE inválido: {0}")]
    PropertySet(String),

    #[error("PDF inválido: {0}")]
    Pdf(#[from] lopdf::Error),

    /// El PDF se pudo cargar pero su estructura de metadata no es válida.
    #[error("metadata PDF mal formada: {0}")]
    MalformedPdf(String),

    /// Fragmento de propiedades con markup mal formado en modo estricto.
    #[error("markup mal formado en `{entry}`: {source}")]
    Markup {
        entry: String,
        #[source]
        source: MarkupError,
    },

    #[error("error de configuración: {0}")]
    Config(String),
}

/// Errores del mapeador de etiquetas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// El tokenizador rechazó la entrada.
    #[error("error de sintaxis en el byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("{depth} elemento(s) sin cerrar al final de la entrada")]
    UnclosedElements { depth: usize },
}

pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_type_display_names_the_mime() {
        let err = ExtractError::UnsupportedType("application/x-unknown".to_string());
        assert_eq!(err.to_string(), "tipo MIME no soportado: application/x-unknown");
    }

    #[test]
    fn markup_error_keeps_entry_and_source() {
        let err = ExtractError::Markup {
            entry: "core.xml".to_string(),
            source: MarkupError::UnclosedElements { depth: 2 },
        };
        assert_eq!(
            err.to_string(),
            "markup mal formado en `core.xml`: 2 elemento(s) sin cerrar al final de la entrada"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ExtractError = io_err.into();
        assert!(matches!(err, ExtractError::Io(_)));
    }
}
