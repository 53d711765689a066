//! Extracción de metadata de documentos despachada por tipo MIME.
//!
//! El llamador entrega la ruta y el tipo MIME; el [`ExtractorRegistry`]
//! resuelve el extractor del formato (OLE, Office Open XML o PDF) y el
//! resultado es un [`Metadata`] cuya forma depende de ese formato.
//!
//! ```rust,no_run
//! use metalens::{ExtractorConfig, ExtractorRegistry, extract_with};
//! use std::path::Path;
//!
//! let registry = ExtractorRegistry::with_builtin(&ExtractorConfig::default());
//! let metadata = extract_with(&registry, Path::new("informe.pdf"), "application/pdf")?;
//! for (field, value) in &metadata {
//!     println!("{field}: {value:?}");
//! }
//! # Ok::<(), metalens::ExtractError>(())
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod extractors;
pub mod markup;
pub mod metadata;
pub mod registry;

pub use config::ExtractorConfig;
pub use dispatch::{extract_metadata, extract_with, register_global, resolve_global};
pub use error::{ExtractError, MarkupError};
pub use extractors::{MetadataExtractor, OfficeOpenXmlExtractor, OleExtractor, PdfExtractor};
pub use markup::{MarkupMode, TagValueMapper, TagValues};
pub use metadata::{Metadata, MetadataValue};
pub use registry::ExtractorRegistry;
