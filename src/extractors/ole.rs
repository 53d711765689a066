//! Metadata de documentos Office heredados guardados como archivo compuesto OLE.

use super::MetadataExtractor;
use super::mime::OLE_MIME_TYPES;
use super::property_set::{PropertyValue, filetime_to_seconds, filetime_to_value, parse_property_stream};
use crate::error::ExtractError;
use crate::metadata::{Metadata, MetadataValue};
use cfb::CompoundFile;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;

const SUMMARY_INFORMATION: &str = "/\u{0005}SummaryInformation";
const DOCUMENT_SUMMARY_INFORMATION: &str = "/\u{0005}DocumentSummaryInformation";

/// Nombres de las propiedades de SummaryInformation, por id a partir de 1.
const SUMMARY_ATTRIBUTES: &[&str] = &[
    "codepage",
    "title",
    "subject",
    "author",
    "keywords",
    "comments",
    "template",
    "last_saved_by",
    "revision_number",
    "total_edit_time",
    "last_printed",
    "create_time",
    "last_saved_time",
    "num_pages",
    "num_words",
    "num_chars",
    "thumbnail",
    "creating_application",
    "security",
];

/// Nombres de las propiedades de DocumentSummaryInformation, por id a partir de 1.
const DOCUMENT_SUMMARY_ATTRIBUTES: &[&str] = &[
    "codepage_doc",
    "category",
    "presentation_target",
    "bytes",
    "lines",
    "paragraphs",
    "slides",
    "notes",
    "hidden_slides",
    "mm_clips",
    "scale_crop",
    "heading_pairs",
    "titles_of_parts",
    "manager",
    "company",
    "links_dirty",
    "chars_with_spaces",
    "unused",
    "shared_doc",
    "link_base",
    "hlinks",
    "hlinks_changed",
    "version",
    "dig_sig",
    "content_type",
    "content_status",
    "language",
    "doc_version",
];

// total_edit_time es una duración, no un instante.
const TOTAL_EDIT_TIME: &str = "total_edit_time";

/// Expone las propiedades de resumen tal como las nombra el lector OLE,
/// sin traducirlas a los nombres de los otros formatos. Cada nombre conocido
/// aparece siempre; las propiedades ausentes valen `Null`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OleExtractor;

impl OleExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataExtractor for OleExtractor {
    fn name(&self) -> &'static str {
        "ole"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        OLE_MIME_TYPES
    }

    fn extract(&self, path: &Path) -> Result<Metadata, ExtractError> {
        let file = File::open(path)?;
        let mut compound = CompoundFile::open(file).map_err(ExtractError::CompoundFile)?;

        let mut metadata = Metadata::new();
        read_property_set(&mut compound, SUMMARY_INFORMATION, SUMMARY_ATTRIBUTES, &mut metadata)?;
        read_property_set(
            &mut compound,
            DOCUMENT_SUMMARY_INFORMATION,
            DOCUMENT_SUMMARY_ATTRIBUTES,
            &mut metadata,
        )?;

        Ok(metadata)
    }
}

fn read_property_set<F: Read + Seek>(
    compound: &mut CompoundFile<F>,
    stream_path: &str,
    attributes: &[&'static str],
    metadata: &mut Metadata,
) -> Result<(), ExtractError> {
    for name in attributes {
        metadata.insert((*name).to_string(), MetadataValue::Null);
    }

    if !compound.is_stream(stream_path) {
        debug!("El archivo compuesto no tiene {:?}", stream_path);
        return Ok(());
    }

    let mut data = Vec::new();
    compound
        .open_stream(stream_path)
        .and_then(|mut stream| stream.read_to_end(&mut data))
        .map_err(ExtractError::CompoundFile)?;

    for (id, value) in parse_property_stream(&data)? {
        let Some(name) = (id as usize)
            .checked_sub(1)
            .and_then(|index| attributes.get(index))
        else {
            continue;
        };
        let value = match value {
            PropertyValue::Value(value) => value,
            PropertyValue::FileTime(ticks) if *name == TOTAL_EDIT_TIME => filetime_to_seconds(ticks),
            PropertyValue::FileTime(ticks) => filetime_to_value(ticks),
        };
        metadata.insert((*name).to_string(), value);
    }

    Ok(())
}
