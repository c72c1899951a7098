//! Color state store: per-field values seeded from and written to storage.

use serde::Serialize;

use crate::config::ColorConfig;
use crate::controller::ControllerError;
use crate::storage::Storage;

/// One named color input. `name` is both the storage key and query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorField {
    pub name: String,
    pub value: String,
    #[serde(skip)]
    default: String,
}

impl ColorField {
    pub fn new(name: impl Into<String>, default: impl Into<String>) -> Self {
        let default = default.into();
        Self {
            name: name.into(),
            value: default.clone(),
            default,
        }
    }
}

/// Authoritative values of every color field, in document order.
#[derive(Debug, Clone, Default)]
pub struct ColorStore {
    fields: Vec<ColorField>,
}

impl ColorStore {
    pub fn new(fields: Vec<ColorField>) -> Self {
        Self { fields }
    }

    pub fn from_config(colors: &[ColorConfig]) -> Self {
        Self::new(
            colors
                .iter()
                .map(|c| ColorField::new(c.name.clone(), c.default.clone()))
                .collect(),
        )
    }

    pub fn fields(&self) -> &[ColorField] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// `(name, value)` pairs in document order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str()))
    }

    /// Adopt persisted values; fields with no entry keep their default.
    ///
    /// Empty entries count as absent. Returns how many fields were restored.
    pub fn initialize(&mut self, storage: &dyn Storage) -> usize {
        let mut restored = 0;
        for field in &mut self.fields {
            match storage.get(&field.name) {
                Some(value) if !value.is_empty() => {
                    field.value = value;
                    restored += 1;
                }
                Some(_) => {
                    tracing::warn!(field = %field.name, "ignoring empty persisted color");
                    field.value = field.default.clone();
                }
                None => field.value = field.default.clone(),
            }
        }
        tracing::debug!(restored, total = self.fields.len(), "color store initialized");
        restored
    }

    /// Record a committed edit and persist it under the field's key.
    pub fn set(
        &mut self,
        name: &str,
        value: &str,
        storage: &mut dyn Storage,
    ) -> Result<(), ControllerError> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| ControllerError::UnknownField(name.to_string()))?;
        field.value = value.to_string();
        storage.set(name, value)?;
        Ok(())
    }
}
