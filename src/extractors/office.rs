//! Lectura de metadata en documentos Office empaquetados en ZIP.

use super::MetadataExtractor;
use super::mime::OFFICE_OPEN_XML_MIME_TYPES;
use crate::error::ExtractError;
use crate::markup::{MarkupMode, TagValueMapper};
use crate::metadata::{Metadata, MetadataValue};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const DOC_PROPS_DIR: &str = "docProps/";
const UTF8_BOM: &str = "\u{feff}";

/// Recorre `docProps/` y mapea cada fragmento con [`TagValueMapper`].
#[derive(Clone, Copy, Debug, Default)]
pub struct OfficeOpenXmlExtractor {
    mapper: TagValueMapper,
}

impl OfficeOpenXmlExtractor {
    pub fn new(mode: MarkupMode) -> Self {
        Self {
            mapper: TagValueMapper::new(mode),
        }
    }
}

impl MetadataExtractor for OfficeOpenXmlExtractor {
    fn name(&self) -> &'static str {
        "ooxml"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        OFFICE_OPEN_XML_MIME_TYPES
    }

    fn extract(&self, path: &Path) -> Result<Metadata, ExtractError> {
        let file = File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)?;

        let mut metadata = Metadata::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let Some(file_name) = doc_props_file_name(entry.name()) else {
                continue;
            };
            let file_name = file_name.to_string();
            if entry.is_dir() {
                continue;
            }

            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;

            let Ok(text) = String::from_utf8(contents) else {
                debug!("Se omite {} en {:?}: no es texto UTF-8", file_name, path);
                continue;
            };
            let text = text.strip_prefix(UTF8_BOM).unwrap_or(text.as_str());

            let values = self
                .mapper
                .map(text)
                .map_err(|source| ExtractError::Markup {
                    entry: file_name.clone(),
                    source,
                })?;

            let fragment: Metadata = values
                .into_iter()
                .map(|(tag, value)| (tag, MetadataValue::Text(value)))
                .collect();
            metadata.insert(file_name, MetadataValue::Map(fragment));
        }

        Ok(metadata)
    }
}

/// Nombre del archivo si la entrada es hija directa de `docProps/`.
fn doc_props_file_name(entry_name: &str) -> Option<&str> {
    let rest = entry_name.strip_prefix(DOC_PROPS_DIR)?;
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    if rest.is_empty() || rest.contains('/') {
        None
    } else {
        Some(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::doc_props_file_name;

    #[test]
    fn only_direct_children_of_doc_props_are_selected() {
        assert_eq!(doc_props_file_name("docProps/core.xml"), Some("core.xml"));
        assert_eq!(doc_props_file_name("docProps/app.xml"), Some("app.xml"));
        assert_eq!(doc_props_file_name("docProps/"), None);
        assert_eq!(doc_props_file_name("docProps/nested/x.xml"), None);
        assert_eq!(doc_props_file_name("word/document.xml"), None);
        assert_eq!(doc_props_file_name("xdocProps/core.xml"), None);
    }
}
