//! Encoder/aligner: raw record -> schema-ordered feature vector
//!
//! Emits values in the registry's exact column order. Zero fill applies only
//! to schema columns the working mapping never produced (indicator columns
//! the registry grew after the caller was written); a missing required
//! attribute is an error, never a zero.

use std::collections::HashMap;

use crate::features::record::RawRecord;
use crate::schema::SchemaRegistry;
use crate::{HousingError, Result};

/// Ordered numeric input for the price model
///
/// Length and order always equal the registry schema it was aligned against.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedVector {
    values: Vec<f64>,
}

impl AlignedVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a schema position
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }
}

/// Builds aligned vectors for one registry
pub struct Aligner<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> Aligner<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Aligner { registry }
    }

    /// Align one record against the registry schema
    ///
    /// Numeric attributes pass through unvalidated; bounds are the boundary
    /// layer's concern. Output length always equals the schema length.
    pub fn align(&self, record: &RawRecord) -> Result<AlignedVector> {
        let mut working: HashMap<String, f64> = HashMap::new();

        for &attribute in self.registry.numeric_attributes() {
            let value = record.number(attribute).ok_or_else(|| {
                HousingError::SchemaMismatch(format!(
                    "Required numeric attribute `{}` missing from record",
                    attribute
                ))
            })?;
            working.insert(attribute.to_string(), value);
        }

        for family in self.registry.families() {
            let label = record.label(family.attribute()).ok_or_else(|| {
                HousingError::SchemaMismatch(format!(
                    "Required categorical attribute `{}` missing from record",
                    family.attribute()
                ))
            })?;
            for (column, bit) in self.registry.encode_category(family.attribute(), label)? {
                working.insert(column, bit);
            }
        }

        let values = self
            .registry
            .schema()
            .columns()
            .iter()
            .map(|column| working.get(column).copied().unwrap_or(0.0))
            .collect();

        Ok(AlignedVector { values })
    }
}
