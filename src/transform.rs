//! Retargeting of converted monitor documents at the destination data source.

use serde_yaml::{Mapping, Value};
use uuid::Uuid;

use crate::error::{Result, TransferError};
use crate::store::Document;

/// How documents are rewritten for the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retarget {
    /// Prepended to every monitor name as `"{prefix} - {name}"`.
    pub name_prefix: String,
    /// Data source id written into every dataset's `datasource`.
    pub destination_datasource: String,
}

impl Retarget {
    pub fn new(name_prefix: impl Into<String>, destination_datasource: impl Into<String>) -> Self {
        Self {
            name_prefix: name_prefix.into(),
            destination_datasource: destination_datasource.into(),
        }
    }

    fn rename(&self, name: &str) -> String {
        format!("{} - {}", self.name_prefix, name)
    }
}

/// Rewrite `document` so it can be created on the destination data source.
///
/// - `id` is replaced with a fresh UUID
/// - `name` gets the configured prefix
/// - `tags` is removed
/// - each dataset loses its `id`; its `datasource` (when present) loses its
///   `name`, and an `id` already set there now points at the destination
///
/// `file` only names the document in errors. The document is validated
/// before any field is touched.
pub fn transform(mut document: Document, target: &Retarget, file: &str) -> Result<Document> {
    let root = document
        .as_mapping_mut()
        .ok_or_else(|| TransferError::malformed(file, "document is not a mapping"))?;

    let name = match root.get("name") {
        Some(Value::String(name)) => name.clone(),
        Some(_) => return Err(TransferError::malformed(file, "`name` is not a string")),
        None => return Err(TransferError::malformed(file, "missing `name`")),
    };
    match root.get("datasets") {
        None | Some(Value::Null) | Some(Value::Sequence(_)) => {}
        Some(_) => return Err(TransferError::malformed(file, "`datasets` is not a sequence")),
    }

    root.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
    root.insert("name".into(), Value::String(target.rename(&name)));
    root.shift_remove("tags");

    if let Some(Value::Sequence(datasets)) = root.get_mut("datasets") {
        for dataset in datasets.iter_mut().filter_map(Value::as_mapping_mut) {
            retarget_dataset(dataset, &target.destination_datasource);
        }
    }

    Ok(document)
}

fn retarget_dataset(dataset: &mut Mapping, destination: &str) {
    dataset.shift_remove("id");
    if let Some(datasource) = dataset.get_mut("datasource").and_then(Value::as_mapping_mut) {
        if let Some(id) = datasource.get_mut("id") {
            *id = Value::String(destination.to_string());
        }
        datasource.shift_remove("name");
    }
}
