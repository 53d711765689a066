//! Decodificación de flujos de propiedades OLE ([MS-OLEPS]).
//!
//! Solo se lee la primera sección de cada flujo, que es la que contiene las
//! propiedades de resumen estándar.

use crate::error::ExtractError;
use crate::metadata::MetadataValue;
use chrono::DateTime;
use std::collections::BTreeMap;
use tracing::debug;

const BYTE_ORDER_MARK: u16 = 0xFFFE;
const FIRST_SECTION_OFFSET: usize = 44;
const MAX_PROPERTIES: u32 = 1000;
const MAX_VECTOR_LEN: u32 = 4096;

const VT_EMPTY: u16 = 0;
const VT_NULL: u16 = 1;
const VT_I2: u16 = 2;
const VT_I4: u16 = 3;
const VT_R4: u16 = 4;
const VT_R8: u16 = 5;
const VT_BSTR: u16 = 8;
const VT_ERROR: u16 = 10;
const VT_BOOL: u16 = 11;
const VT_VARIANT: u16 = 12;
const VT_I1: u16 = 16;
const VT_UI1: u16 = 17;
const VT_UI2: u16 = 18;
const VT_UI4: u16 = 19;
const VT_I8: u16 = 20;
const VT_UI8: u16 = 21;
const VT_INT: u16 = 22;
const VT_UINT: u16 = 23;
const VT_LPSTR: u16 = 30;
const VT_LPWSTR: u16 = 31;
const VT_FILETIME: u16 = 64;
const VT_BLOB: u16 = 65;
const VT_CF: u16 = 71;
const VT_VECTOR: u16 = 0x1000;

// Segundos entre 1601-01-01 y 1970-01-01.
const FILETIME_UNIX_EPOCH_SECONDS: i64 = 11_644_473_600;
const FILETIME_TICKS_PER_SECOND: u64 = 10_000_000;

/// Valor crudo de una propiedad, antes de darle nombre.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PropertyValue {
    Value(MetadataValue),
    /// FILETIME sin interpretar; el llamador decide si es instante o duración.
    FileTime(u64),
}

/// Decodifica la primera sección de un flujo de propiedades.
pub(crate) fn parse_property_stream(data: &[u8]) -> Result<BTreeMap<u32, PropertyValue>, ExtractError> {
    let byte_order = read_u16(data, 0)?;
    if byte_order != BYTE_ORDER_MARK {
        return Err(malformed(format!("orden de bytes inesperado {byte_order:#06x}")));
    }
    let section_count = read_u32(data, 24)?;
    if section_count == 0 {
        return Ok(BTreeMap::new());
    }

    let section = read_u32(data, FIRST_SECTION_OFFSET)? as usize;
    let property_count = read_u32(data, section + 4)?.min(MAX_PROPERTIES);

    let mut properties = BTreeMap::new();
    for index in 0..property_count as usize {
        let entry = section + 8 + index * 8;
        let id = read_u32(data, entry)?;
        let value_offset = section + read_u32(data, entry + 4)? as usize;

        // El id 0 es el diccionario de nombres y el 0x80000000 la configuración regional.
        if id == 0 || id == 0x8000_0000 {
            continue;
        }

        let value_type = read_u16(data, value_offset)?;
        match read_typed_value(data, value_offset + 4, value_type)? {
            Some((value, _)) => {
                properties.insert(id, value);
            }
            None => debug!("Propiedad {} con tipo {:#06x} no soportado", id, value_type),
        }
    }

    Ok(properties)
}

/// Lee un valor del tipo indicado y devuelve también los bytes consumidos.
fn read_typed_value(
    data: &[u8],
    offset: usize,
    value_type: u16,
) -> Result<Option<(PropertyValue, usize)>, ExtractError> {
    if value_type & VT_VECTOR != 0 {
        return read_vector(data, offset, value_type & !VT_VECTOR);
    }

    let found = |value: MetadataValue, size: usize| -> Result<Option<(PropertyValue, usize)>, ExtractError> {
        Ok(Some((PropertyValue::Value(value), size)))
    };

    match value_type {
        VT_EMPTY | VT_NULL => found(MetadataValue::Null, 0),
        VT_I1 => found(MetadataValue::Integer(i64::from(read_bytes(data, offset, 1)?[0] as i8)), 4),
        VT_UI1 => found(MetadataValue::Integer(i64::from(read_bytes(data, offset, 1)?[0])), 4),
        VT_I2 => found(MetadataValue::Integer(i64::from(read_u16(data, offset)? as i16)), 4),
        VT_UI2 => found(MetadataValue::Integer(i64::from(read_u16(data, offset)?)), 4),
        VT_I4 | VT_INT | VT_ERROR => {
            found(MetadataValue::Integer(i64::from(read_u32(data, offset)? as i32)), 4)
        }
        VT_UI4 | VT_UINT => found(MetadataValue::Integer(i64::from(read_u32(data, offset)?)), 4),
        VT_I8 => found(MetadataValue::Integer(read_u64(data, offset)? as i64), 8),
        VT_UI8 => {
            let raw = read_u64(data, offset)?;
            match i64::try_from(raw) {
                Ok(number) => found(MetadataValue::Integer(number), 8),
                Err(_) => found(MetadataValue::Real(raw as f64), 8),
            }
        }
        VT_R4 => found(
            MetadataValue::Real(f64::from(f32::from_bits(read_u32(data, offset)?))),
            4,
        ),
        VT_R8 => found(MetadataValue::Real(f64::from_bits(read_u64(data, offset)?)), 8),
        VT_BOOL => found(MetadataValue::Boolean(read_u16(data, offset)? != 0), 4),
        VT_LPSTR | VT_BSTR => {
            let len = read_u32(data, offset)? as usize;
            let bytes = read_bytes(data, offset + 4, len)?;
            let trimmed = trim_trailing_nuls(bytes);
            found(MetadataValue::Bytes(trimmed.to_vec()), padded(4 + len))
        }
        VT_LPWSTR => {
            let chars = read_u32(data, offset)? as usize;
            let bytes = read_bytes(data, offset + 4, chars * 2)?;
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .take_while(|unit| *unit != 0)
                .collect();
            found(
                MetadataValue::Text(String::from_utf16_lossy(&units)),
                padded(4 + chars * 2),
            )
        }
        VT_FILETIME => Ok(Some((PropertyValue::FileTime(read_u64(data, offset)?), 8))),
        VT_BLOB | VT_CF => {
            let len = read_u32(data, offset)? as usize;
            let bytes = read_bytes(data, offset + 4, len)?;
            found(MetadataValue::Bytes(bytes.to_vec()), padded(4 + len))
        }
        _ => Ok(None),
    }
}

fn read_vector(
    data: &[u8],
    offset: usize,
    element_type: u16,
) -> Result<Option<(PropertyValue, usize)>, ExtractError> {
    let count = read_u32(data, offset)?;
    if count > MAX_VECTOR_LEN {
        return Err(malformed(format!("vector de {count} elementos")));
    }

    let mut items = Vec::with_capacity(count as usize);
    let mut cursor = offset + 4;
    for _ in 0..count {
        let (item_type, header) = if element_type == VT_VARIANT {
            let item_type = read_u16(data, cursor)?;
            // Un VARIANT dentro de un vector no puede ser a su vez un vector.
            if item_type & VT_VECTOR != 0 {
                return Err(malformed(format!(
                    "vector anidado de tipo {item_type:#06x} dentro de un vector de VARIANT"
                )));
            }
            (item_type, 4)
        } else {
            (element_type, 0)
        };
        let Some((item, size)) = read_typed_value(data, cursor + header, item_type)? else {
            return Ok(None);
        };
        items.push(match item {
            PropertyValue::Value(value) => value,
            PropertyValue::FileTime(ticks) => filetime_to_value(ticks),
        });
        cursor += header + size;
    }

    Ok(Some((
        PropertyValue::Value(MetadataValue::List(items)),
        cursor - offset,
    )))
}

/// Convierte un FILETIME absoluto en marca de tiempo UTC. El cero significa "sin fecha".
pub(crate) fn filetime_to_value(ticks: u64) -> MetadataValue {
    if ticks == 0 {
        return MetadataValue::Null;
    }
    let seconds = (ticks / FILETIME_TICKS_PER_SECOND) as i64 - FILETIME_UNIX_EPOCH_SECONDS;
    let nanos = ((ticks % FILETIME_TICKS_PER_SECOND) * 100) as u32;
    match DateTime::from_timestamp(seconds, nanos) {
        Some(time) => MetadataValue::Timestamp(time),
        None => MetadataValue::Integer(ticks as i64),
    }
}

/// Convierte un FILETIME usado como duración en segundos.
pub(crate) fn filetime_to_seconds(ticks: u64) -> MetadataValue {
    MetadataValue::Integer((ticks / FILETIME_TICKS_PER_SECOND) as i64)
}

fn padded(size: usize) -> usize {
    size.div_ceil(4) * 4
}

fn trim_trailing_nuls(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |pos| pos + 1);
    &bytes[..end]
}

fn read_bytes(data: &[u8], offset: usize, len: usize) -> Result<&[u8], ExtractError> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| malformed(format!("lectura de {len} bytes fuera de rango en {offset}")))
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16, ExtractError> {
    let bytes = read_bytes(data, offset, 2)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32, ExtractError> {
    let bytes = read_bytes(data, offset, 4)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_u64(data: &[u8], offset: usize) -> Result<u64, ExtractError> {
    let bytes = read_bytes(data, offset, 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok(u64::from_le_bytes(raw))
}

fn malformed(message: String) -> ExtractError {
    ExtractError::PropertySet(message)
}

/// Escritura mínima de flujos de propiedades para las pruebas.
#[cfg(test)]
pub(crate) mod writer {
    pub(crate) enum TestProperty<'a> {
        Ansi(&'a str),
        Unicode(&'a str),
        I4(i32),
        FileTime(u64),
        AnsiVector(&'a [&'a str]),
    }

    pub(crate) fn build_property_stream(properties: &[(u32, TestProperty<'_>)]) -> Vec<u8> {
        let mut values = Vec::new();
        let mut offsets = Vec::new();
        let table_len = 8 + properties.len() * 8;

        for (id, property) in properties {
            offsets.push((*id, (table_len + values.len()) as u32));
            match property {
                TestProperty::Ansi(text) => {
                    values.extend_from_slice(&30u32.to_le_bytes());
                    push_ansi(&mut values, text);
                }
                TestProperty::Unicode(text) => {
                    values.extend_from_slice(&31u32.to_le_bytes());
                    let units: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
                    values.extend_from_slice(&(units.len() as u32).to_le_bytes());
                    for unit in units {
                        values.extend_from_slice(&unit.to_le_bytes());
                    }
                    pad(&mut values);
                }
                TestProperty::I4(number) => {
                    values.extend_from_slice(&3u32.to_le_bytes());
                    values.extend_from_slice(&number.to_le_bytes());
                }
                TestProperty::FileTime(ticks) => {
                    values.extend_from_slice(&64u32.to_le_bytes());
                    values.extend_from_slice(&ticks.to_le_bytes());
                }
                TestProperty::AnsiVector(items) => {
                    values.extend_from_slice(&(0x1000u32 | 30).to_le_bytes());
                    values.extend_from_slice(&(items.len() as u32).to_le_bytes());
                    for item in *items {
                        push_ansi(&mut values, item);
                    }
                }
            }
        }

        let mut section = Vec::new();
        section.extend_from_slice(&((table_len + values.len()) as u32).to_le_bytes());
        section.extend_from_slice(&(properties.len() as u32).to_le_bytes());
        for (id, offset) in offsets {
            section.extend_from_slice(&id.to_le_bytes());
            section.extend_from_slice(&offset.to_le_bytes());
        }
        section.extend_from_slice(&values);

        let mut stream = Vec::new();
        stream.extend_from_slice(&0xFFFEu16.to_le_bytes());
        stream.extend_from_slice(&0u16.to_le_bytes());
        stream.extend_from_slice(&0x0002_0006u32.to_le_bytes());
        stream.extend_from_slice(&[0u8; 16]);
        stream.extend_from_slice(&1u32.to_le_bytes());
        stream.extend_from_slice(&[0xE0; 16]);
        stream.extend_from_slice(&48u32.to_le_bytes());
        stream.extend_from_slice(&section);
        stream
    }

    fn push_ansi(values: &mut Vec<u8>, text: &str) {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        values.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        values.extend_from_slice(&bytes);
        pad(values);
    }

    fn pad(values: &mut Vec<u8>) {
        while values.len() % 4 != 0 {
            values.push(0);
        }
    }
}
