use crate::error::{Result, VkeError};
use crate::key::Key;
use log::{error, info};
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};

/// One entry in the ordered key chain
#[derive(Debug)]
pub struct Layer {
    /// Key spec exactly as given on input, not necessarily UTF-8
    pub name: OsString,
    /// Position used in user-facing prompts
    pub index: usize,
    /// Resolved key material, `None` until resolution succeeds
    pub key: Option<Key>,
}

impl Layer {
    /// Name for log lines; invalid UTF-8 is replaced
    pub fn display_name(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }
}

/// Ordered collection of layers, consumed in registration order
#[derive(Debug, Default)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer at the tail of the chain
    pub fn append(&mut self, name: impl AsRef<OsStr>, index: usize) -> Result<()> {
        let name = name.as_ref();
        info!("Adding new layer {}", name.to_string_lossy());
        self.layers
            .try_reserve(1)
            .map_err(|_| VkeError::allocation(format!("layer {}", name.to_string_lossy())))?;
        self.layers.push(Layer {
            name: name.to_os_string(),
            index,
            key: None,
        });
        Ok(())
    }

    /// Build a chain from positional arguments
    ///
    /// The source takes position 0, so keys number from 1.
    pub fn from_specs<S: AsRef<OsStr>>(specs: &[S]) -> Result<Self> {
        let mut registry = Self::new();
        for (i, spec) in specs.iter().enumerate() {
            registry.append(spec, i)?;
        }
        Ok(registry)
    }

    /// Detach the first layer, which names the source rather than a key
    ///
    /// Remaining layers keep their registration order.
    pub fn split_source(&mut self) -> Option<OsString> {
        if self.layers.is_empty() {
            return None;
        }
        let source = self.layers.remove(0);
        Some(source.name)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        self.layers.iter_mut()
    }

    /// Release every layer and its resolved key
    ///
    /// Never stops early; returns the number of layers whose release failed.
    pub fn release_all(&mut self) -> usize {
        info!("Cleaning up all layers");
        let mut failures = 0;
        for mut layer in self.layers.drain(..) {
            if let Some(key) = layer.key.take() {
                if let Err(e) = key.release() {
                    error!("Unable to release key {}: {}", layer.display_name(), e);
                    failures += 1;
                }
            }
        }
        failures
    }
}
