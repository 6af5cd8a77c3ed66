//! Gesture Registry
//!
//! Holds the set of known gesture descriptions together with the curve
//! library they are scored against. Registration happens once through
//! [`GestureRegistryBuilder`]; the built registry is immutable and can be
//! shared across threads behind an `Arc`.

use std::collections::HashSet;

use crate::curve::CurveLibrary;
use crate::description::{GestureDescription, GestureTemplate};
use crate::error::{GestureError, Result};

/// Immutable, ordered set of gesture descriptions.
#[derive(Clone, Debug, Default)]
pub struct GestureRegistry {
    library: CurveLibrary,
    gestures: Vec<GestureDescription>,
}

impl GestureRegistry {
    /// Builder over the standard curve library
    pub fn builder() -> GestureRegistryBuilder {
        GestureRegistryBuilder::new(CurveLibrary::default())
    }

    pub fn builder_with_library(library: CurveLibrary) -> GestureRegistryBuilder {
        GestureRegistryBuilder::new(library)
    }

    /// Load a JSON array of gesture templates.
    ///
    /// Every template goes through the same checks as [`GestureRegistryBuilder::register`];
    /// the first rejected template fails the whole load.
    pub fn from_json(library: CurveLibrary, json: &str) -> Result<Self> {
        let templates: Vec<GestureTemplate> = serde_json::from_str(json)?;
        let mut builder = Self::builder_with_library(library);
        for template in &templates {
            builder.register_template(template)?;
        }
        Ok(builder.build())
    }

    pub fn library(&self) -> &CurveLibrary {
        &self.library
    }

    pub fn get(&self, name: &str) -> Option<&GestureDescription> {
        self.gestures.iter().find(|g| g.name() == name)
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.gestures.iter().map(|g| g.name()).collect()
    }

    /// Descriptions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &GestureDescription> {
        self.gestures.iter()
    }

    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    /// Export every description as a JSON-authorable template
    pub fn templates(&self) -> Vec<GestureTemplate> {
        self.gestures.iter().map(|g| g.to_template()).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.templates())?)
    }
}

/// Validates and collects descriptions before freezing them into a registry.
#[derive(Debug)]
pub struct GestureRegistryBuilder {
    library: CurveLibrary,
    gestures: Vec<GestureDescription>,
    names: HashSet<String>,
}

impl GestureRegistryBuilder {
    pub fn new(library: CurveLibrary) -> Self {
        Self {
            library,
            gestures: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Add one description.
    ///
    /// Rejected descriptions leave the builder unchanged.
    pub fn register(&mut self, description: GestureDescription) -> Result<&mut Self> {
        if let Err(e) = self.check(&description) {
            tracing::warn!(gesture = %description.name(), error = %e, "Gesture registration rejected");
            return Err(e);
        }

        tracing::debug!(
            gesture = %description.name(),
            fingers = description.constrained_fingers().count(),
            "Gesture registered"
        );
        self.names.insert(description.name().to_string());
        self.gestures.push(description);
        Ok(self)
    }

    pub fn register_template(&mut self, template: &GestureTemplate) -> Result<&mut Self> {
        let description = template.to_description().map_err(|e| {
            tracing::warn!(gesture = %template.name, error = %e, "Gesture template rejected");
            e
        })?;
        self.register(description)
    }

    pub fn register_all(
        &mut self,
        descriptions: impl IntoIterator<Item = GestureDescription>,
    ) -> Result<&mut Self> {
        for description in descriptions {
            self.register(description)?;
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    pub fn build(self) -> GestureRegistry {
        tracing::debug!(gestures = self.gestures.len(), "Gesture registry built");
        GestureRegistry {
            library: self.library,
            gestures: self.gestures,
        }
    }

    fn check(&self, description: &GestureDescription) -> Result<()> {
        description.validate(&self.library)?;
        if self.names.contains(description.name()) {
            return Err(GestureError::DuplicateGestureName(description.name().to_string()));
        }
        Ok(())
    }
}

// ==================== Unit Tests ====================
