//! Extracción de metadata en PDFs mediante lectura del diccionario Info.

use super::MetadataExtractor;
use super::mime::PDF_MIME_TYPES;
use crate::error::ExtractError;
use crate::metadata::{Metadata, MetadataValue};
use lopdf::{Dictionary, Document, Object};
use std::fs::File;
use std::path::Path;
use tracing::debug;

// Cadenas de referencias más largas se consideran ciclos.
const MAX_RESOLVE_DEPTH: usize = 32;

/// Devuelve el diccionario `/Info` del trailer con todas las referencias resueltas.
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn supported_types(&self) -> &'static [&'static str] {
        PDF_MIME_TYPES
    }

    fn extract(&self, path: &Path) -> Result<Metadata, ExtractError> {
        let file = File::open(path)?;
        let doc = Document::load_from(file)?;

        // Solo se usa el primer diccionario Info: el del trailer vigente.
        let info_ref = match doc.trailer.get(b"Info") {
            Ok(info) => info,
            Err(_) => {
                debug!("{:?} no declara diccionario Info", path);
                return Ok(Metadata::new());
            }
        };

        let info_dict = deref_dictionary(&doc, info_ref)?;

        Ok(info_dict
            .iter()
            .map(|(key, value)| {
                (
                    String::from_utf8_lossy(key).into_owned(),
                    resolve_value(&doc, value, 0),
                )
            })
            .collect())
    }
}

fn deref_dictionary<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Dictionary, ExtractError> {
    match obj {
        Object::Reference(reference) => Ok(doc.get_dictionary(*reference)?),
        Object::Dictionary(dict) => Ok(dict),
        other => Err(ExtractError::MalformedPdf(format!(
            "el trailer apunta a un Info que no es diccionario ({})",
            object_kind(other)
        ))),
    }
}

fn object_kind(obj: &Object) -> &'static str {
    match obj {
        Object::Null => "null",
        Object::Boolean(_) => "booleano",
        Object::Integer(_) | Object::Real(_) => "número",
        Object::Name(_) => "nombre",
        Object::String(..) => "cadena",
        Object::Array(_) => "arreglo",
        Object::Dictionary(_) => "diccionario",
        Object::Stream(_) => "flujo",
        Object::Reference(_) => "referencia",
    }
}

/// Convierte un objeto PDF en valor de metadata siguiendo referencias indirectas,
/// también las anidadas en arreglos y diccionarios.
fn resolve_value(doc: &Document, obj: &Object, depth: usize) -> MetadataValue {
    if depth > MAX_RESOLVE_DEPTH {
        debug!("Cadena de referencias demasiado profunda, se trunca a null");
        return MetadataValue::Null;
    }

    match obj {
        Object::Reference(reference) => match doc.get_object(*reference) {
            Ok(inner) => resolve_value(doc, inner, depth + 1),
            Err(_) => {
                debug!("Referencia {:?} sin objeto, se trata como null", reference);
                MetadataValue::Null
            }
        },
        Object::String(bytes, _) => MetadataValue::Bytes(bytes.clone()),
        Object::Name(name) => MetadataValue::Text(String::from_utf8_lossy(name).into_owned()),
        Object::Integer(value) => MetadataValue::Integer(*value),
        Object::Real(value) => MetadataValue::Real(f64::from(*value)),
        Object::Boolean(value) => MetadataValue::Boolean(*value),
        Object::Null => MetadataValue::Null,
        Object::Array(items) => MetadataValue::List(
            items
                .iter()
                .map(|item| resolve_value(doc, item, depth + 1))
                .collect(),
        ),
        Object::Dictionary(dict) => MetadataValue::Map(resolve_dictionary(doc, dict, depth + 1)),
        Object::Stream(stream) => MetadataValue::Bytes(stream.content.clone()),
    }
}

fn resolve_dictionary(doc: &Document, dict: &Dictionary, depth: usize) -> Metadata {
    dict.iter()
        .map(|(key, value)| {
            (
                String::from_utf8_lossy(key).into_owned(),
                resolve_value(doc, value, depth),
            )
        })
        .collect()
}
