//! Mapeo superficial de etiquetas a texto para fragmentos de propiedades XML.
//!
//! La etiqueta abierta más recientemente se convierte en la clave implícita
//! del siguiente texto que aparezca. No se siguen cierres, anidamiento ni
//! atributos: un elemento anidado reemplaza a su padre como clave aunque el
//! padre siga abierto. Es suficiente para el esquema plano de `docProps/*.xml`
//! y no pretende ser un lector XML general.
//!
//! Los nombres de etiqueta se normalizan a minúsculas (`cp:lastmodifiedby`).
//! El texto formado solo por espacios cuenta como valor cuando sigue
//! directamente a una etiqueta de apertura; tras un cierre es sangría y se
//! descarta.

use crate::error::MarkupError;
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Resultado del mapeo: nombre de etiqueta → último texto visto bajo ella.
pub type TagValues = BTreeMap<String, String>;

/// Qué hacer cuando el markup está mal formado.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupMode {
    /// El error se devuelve al llamador.
    #[default]
    Strict,
    /// El error se registra y se conserva lo acumulado hasta ese punto.
    Lenient,
}

#[derive(Debug, Default)]
struct MapperState {
    last_opened_tag: Option<String>,
    result: TagValues,
    // Nada se ha visto desde la última etiqueta de apertura.
    just_opened: bool,
}

impl MapperState {
    fn open_tag(&mut self, tag: String) {
        self.last_opened_tag = Some(tag);
        self.just_opened = true;
    }

    fn close_tag(&mut self) {
        self.just_opened = false;
    }

    fn text(&mut self, data: String) {
        self.just_opened = false;
        if let Some(tag) = &self.last_opened_tag {
            self.result.insert(tag.clone(), data);
        }
    }

    /// Entrega el texto pendiente como un único dato. Los tramos formados
    /// solo por espacios tras un cierre son sangría y se descartan.
    fn flush(&mut self, pending: &mut String) {
        if pending.is_empty() {
            return;
        }
        if self.just_opened || !pending.trim().is_empty() {
            self.text(std::mem::take(pending));
        }
        pending.clear();
    }
}

/// Convierte un fragmento de markup en un mapeo plano etiqueta → texto.
#[derive(Clone, Copy, Debug, Default)]
pub struct TagValueMapper {
    mode: MarkupMode,
}

impl TagValueMapper {
    pub fn new(mode: MarkupMode) -> Self {
        Self { mode }
    }

    pub fn strict() -> Self {
        Self::new(MarkupMode::Strict)
    }

    pub fn lenient() -> Self {
        Self::new(MarkupMode::Lenient)
    }

    pub fn mode(&self) -> MarkupMode {
        self.mode
    }

    /// Recorre el markup en una sola pasada y devuelve el mapeo acumulado.
    pub fn map(&self, markup: &str) -> Result<TagValues, MarkupError> {
        let mut reader = Reader::from_str(markup);
        let mut state = MapperState::default();
        let mut pending = String::new();
        let mut depth = 0usize;

        loop {
            let before = reader.buffer_position();
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    state.flush(&mut pending);
                    depth += 1;
                    state.open_tag(qualified_name(e));
                }
                Ok(Event::Empty(ref e)) => {
                    state.flush(&mut pending);
                    state.open_tag(qualified_name(e));
                }
                Ok(Event::End(_)) => {
                    state.flush(&mut pending);
                    state.close_tag();
                    depth = depth.saturating_sub(1);
                }
                Ok(Event::Text(ref e)) => pending.push_str(&String::from_utf8_lossy(e.as_ref())),
                Ok(Event::CData(ref e)) => pending.push_str(&String::from_utf8_lossy(e.as_ref())),
                Ok(Event::GeneralRef(ref e)) => {
                    push_reference(&mut pending, &String::from_utf8_lossy(e.as_ref()))
                }
                Ok(Event::Eof) => break,
                Ok(_) => state.flush(&mut pending),
                Err(error) => {
                    let recoverable = matches!(error, quick_xml::Error::IllFormed(_));
                    self.handle_error(MarkupError::Syntax {
                        position: reader.buffer_position() as u64,
                        message: error.to_string(),
                    })?;
                    if !recoverable || reader.buffer_position() == before {
                        break;
                    }
                }
            }
        }
        state.flush(&mut pending);

        if depth > 0 {
            self.handle_error(MarkupError::UnclosedElements { depth })?;
        }

        Ok(state.result)
    }

    fn handle_error(&self, error: MarkupError) -> Result<(), MarkupError> {
        match self.mode {
            MarkupMode::Strict => Err(error),
            MarkupMode::Lenient => {
                warn!("Markup mal formado, se conserva lo acumulado: {}", error);
                Ok(())
            }
        }
    }
}

fn qualified_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).to_lowercase()
}

/// Resuelve `&amp;`, `&#233;`, `&#xE9;` y similares; las entidades
/// desconocidas se conservan literalmente.
fn push_reference(pending: &mut String, name: &str) {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        if let Some(ch) = parsed.and_then(char::from_u32) {
            pending.push(ch);
            return;
        }
    } else if let Some(resolved) = resolve_predefined_entity(name) {
        pending.push_str(resolved);
        return;
    }
    pending.push('&');
    pending.push_str(name);
    pending.push(';');
}
