//! Mapeo de metadata devuelto por cada llamada de extracción.

mod model;

pub use model::{Metadata, MetadataValue};
