//! Schema registry: versioned column lists and categorical encoding rules
//!
//! Column order is byte-significant. A vector built against a different
//! order produces silently wrong predictions, so the registry is the single
//! source of truth and is validated against the deployed model at startup.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{HousingError, Result};

/// Numeric attributes that appear in the schema under their own names
pub const NUMERIC_ATTRIBUTES: [&str; 5] = ["Rooms", "Bathroom", "Car", "Landsize", "Distance"];

/// Attribute name for the property type family
pub const PROPERTY_TYPE: &str = "PropertyType";

/// Attribute name for the region family
pub const REGION: &str = "Region";

/// Deployed schema generation
///
/// V1 is the column list the dashboard shipped with (three metropolitan
/// region indicators). V2 adds the South-Eastern Metropolitan indicator in
/// its sorted position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    V1,
    V2,
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::V1 => write!(f, "v1"),
            SchemaVersion::V2 => write!(f, "v2"),
        }
    }
}

/// The frozen, ordered list of training-time feature columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    fn new(columns: Vec<String>) -> Self {
        FeatureSchema { columns }
    }

    /// Column names in training order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column, if present
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// One categorical attribute and its indicator columns
///
/// The reference label is the category dropped by the training encoding; a
/// record carrying it sets every indicator in the family to 0.
#[derive(Debug, Clone)]
pub struct CategoricalFamily {
    attribute: &'static str,
    reference: &'static str,
    members: Vec<(&'static str, &'static str)>,
}

impl CategoricalFamily {
    pub fn attribute(&self) -> &'static str {
        self.attribute
    }

    pub fn reference(&self) -> &'static str {
        self.reference
    }

    /// (label, indicator column) pairs, in schema order
    pub fn members(&self) -> &[(&'static str, &'static str)] {
        &self.members
    }

    /// Every label this family accepts, reference first
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = vec![self.reference];
        labels.extend(self.members.iter().map(|(label, _)| *label));
        labels
    }
}

/// Authoritative registry of columns and encoding rules for one schema version
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    version: SchemaVersion,
    schema: FeatureSchema,
    families: Vec<CategoricalFamily>,
}

impl SchemaRegistry {
    /// Build the registry for a schema generation
    pub fn for_version(version: SchemaVersion) -> Self {
        let property_type = CategoricalFamily {
            attribute: PROPERTY_TYPE,
            reference: "House",
            members: vec![("Townhouse", "Type_t"), ("Unit", "Type_u")],
        };

        // Region indicator columns follow the sorted order of the training
        // category levels, with the first level dropped as the reference.
        let region_members: Vec<(&'static str, &'static str)> = match version {
            SchemaVersion::V1 => vec![
                ("Northern Metropolitan", "Regionname_Northern Metropolitan"),
                ("Southern Metropolitan", "Regionname_Southern Metropolitan"),
                ("Western Metropolitan", "Regionname_Western Metropolitan"),
            ],
            SchemaVersion::V2 => vec![
                ("Northern Metropolitan", "Regionname_Northern Metropolitan"),
                (
                    "South-Eastern Metropolitan",
                    "Regionname_South-Eastern Metropolitan",
                ),
                ("Southern Metropolitan", "Regionname_Southern Metropolitan"),
                ("Western Metropolitan", "Regionname_Western Metropolitan"),
            ],
        };
        let region = CategoricalFamily {
            attribute: REGION,
            reference: "Eastern Metropolitan",
            members: region_members,
        };

        let mut columns: Vec<String> = NUMERIC_ATTRIBUTES.iter().map(|s| s.to_string()).collect();
        for family in [&property_type, &region] {
            columns.extend(family.members.iter().map(|(_, col)| col.to_string()));
        }

        SchemaRegistry {
            version,
            schema: FeatureSchema::new(columns),
            families: vec![property_type, region],
        }
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// The frozen training-time column list
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Numeric attributes required in every record
    pub fn numeric_attributes(&self) -> &'static [&'static str] {
        &NUMERIC_ATTRIBUTES
    }

    /// Categorical families required in every record
    pub fn families(&self) -> &[CategoricalFamily] {
        &self.families
    }

    /// Indicator assignment for one categorical attribute
    ///
    /// Returns the 0/1 value for every indicator column in the attribute's
    /// family. The submitted label must match a known category exactly; a
    /// case variant or unlisted label is a lookup failure, never a silent
    /// all-zero default.
    pub fn encode_category(&self, attribute: &str, raw_value: &str) -> Result<Vec<(String, f64)>> {
        let family = self
            .families
            .iter()
            .find(|f| f.attribute == attribute)
            .ok_or_else(|| {
                HousingError::SchemaMismatch(format!(
                    "No categorical family named `{}` in schema {}",
                    attribute, self.version
                ))
            })?;

        if raw_value != family.reference && !family.members.iter().any(|(l, _)| *l == raw_value) {
            return Err(HousingError::UnknownCategory {
                attribute: attribute.to_string(),
                value: raw_value.to_string(),
            });
        }

        Ok(family
            .members
            .iter()
            .map(|(label, column)| {
                let bit = if *label == raw_value { 1.0 } else { 0.0 };
                (column.to_string(), bit)
            })
            .collect())
    }

    /// Accepted labels for a categorical attribute, reference first
    pub fn valid_labels(&self, attribute: &str) -> Option<Vec<&'static str>> {
        self.families
            .iter()
            .find(|f| f.attribute == attribute)
            .map(|f| f.labels())
    }
}
