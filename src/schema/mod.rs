//! Frozen training-time feature schema
//!
//! The authoritative column list the deployed model was fitted on, and the
//! categorical encoding rules tied to that exact list.

pub mod registry;

pub use registry::{
    CategoricalFamily, FeatureSchema, NUMERIC_ATTRIBUTES, PROPERTY_TYPE, REGION, SchemaRegistry,
    SchemaVersion,
};
