//! Extractores de metadata por formato de contenedor.
//!
//! | Extractor | Contenedor | Forma del resultado |
//! |-----------|------------|---------------------|
//! | [`OleExtractor`] | Archivo compuesto OLE (`.doc`, `.xls`, `.ppt`) | Propiedades de resumen con los nombres del lector OLE |
//! | [`OfficeOpenXmlExtractor`] | Paquete ZIP (`.docx`, `.xlsx`, `.pptx`, ...) | Fragmento de `docProps/` → etiqueta → texto |
//! | [`PdfExtractor`] | PDF | Claves del diccionario `/Info` con referencias resueltas |
//!
//! Los nombres de campo no se unifican entre formatos.

pub mod mime;
mod office;
mod ole;
mod pdf;
mod property_set;


pub use office::OfficeOpenXmlExtractor;
pub use ole::OleExtractor;
pub use pdf::PdfExtractor;

use crate::error::ExtractError;
use crate::metadata::Metadata;
use std::path::Path;

/// Contrato común de todos los extractores.
pub trait MetadataExtractor: Send + Sync {
    /// Identificador estable del extractor.
    fn name(&self) -> &'static str;

    /// Tipos MIME que el extractor reclama por defecto al registrarse.
    fn supported_types(&self) -> &'static [&'static str];

    /// Extrae la metadata de un archivo que el llamador supone en este formato.
    fn extract(&self, path: &Path) -> Result<Metadata, ExtractError>;
}
