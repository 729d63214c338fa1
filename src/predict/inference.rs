//! Model inference for price estimates

use std::path::Path;

use crate::features::{Aligner, RawRecord};
use crate::model::{PriceModel, TreeEnsemble};
use crate::schema::SchemaRegistry;
use crate::{Config, HousingError, PriceEstimate, Result};

/// Serves price estimates for raw attribute records
///
/// Constructed once at startup; registry and model are immutable afterwards,
/// so concurrent readers need no locking.
#[derive(Debug)]
pub struct Predictor<M: PriceModel> {
    registry: SchemaRegistry,
    model: M,
}

impl<M: PriceModel> Predictor<M> {
    /// Create a predictor, refusing to serve if the registry's column list
    /// differs from the columns the model was trained on
    pub fn new(registry: SchemaRegistry, model: M) -> Result<Self> {
        let expected = registry.schema().columns();
        let actual = model.columns();

        if expected.len() != actual.len() {
            return Err(HousingError::SchemaMismatch(format!(
                "Registry {} has {} columns but the model artifact records {}",
                registry.version(),
                expected.len(),
                actual.len()
            )));
        }
        for (position, (want, got)) in expected.iter().zip(actual.iter()).enumerate() {
            if want != got {
                return Err(HousingError::SchemaMismatch(format!(
                    "Column {} differs: registry {} has `{}`, model artifact has `{}`",
                    position,
                    registry.version(),
                    want,
                    got
                )));
            }
        }

        log::info!(
            "Predictor ready: schema {} with {} columns",
            registry.version(),
            expected.len()
        );
        Ok(Predictor { registry, model })
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Estimate the price for one record
    ///
    /// The aligned vector is built, handed to the model once, and dropped.
    /// Alignment failures surface as-is; a price is never produced from a
    /// partially-filled vector.
    pub fn estimate(&self, record: &RawRecord) -> Result<PriceEstimate> {
        let vector = Aligner::new(&self.registry).align(record)?;
        log::debug!("Aligned vector: {:?}", vector.values());

        let price_aud = self.model.predict(&vector)?;
        Ok(PriceEstimate { price_aud })
    }
}

impl Predictor<TreeEnsemble> {
    /// Load the deployed predictor described by the configuration
    pub fn load(config: &Config) -> Result<Self> {
        let registry = SchemaRegistry::for_version(config.schema.version);
        let model = TreeEnsemble::load(Path::new(&config.model.artifact_path))?;
        Self::new(registry, model)
    }

    /// The loaded artifact, for reporting metrics and metadata
    pub fn model(&self) -> &TreeEnsemble {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::AlignedVector;
    use crate::schema::SchemaVersion;

    /// Test double: returns the sum of the vector it is handed
    #[derive(Debug)]
    struct StubModel {
        columns: Vec<String>,
    }

    impl StubModel {
        fn matching(registry: &SchemaRegistry) -> Self {
            StubModel {
                columns: registry.schema().columns().to_vec(),
            }
        }
    }

    impl PriceModel for StubModel {
        fn columns(&self) -> &[String] {
            &self.columns
        }

        fn predict(&self, features: &AlignedVector) -> Result<f64> {
            Ok(features.values().iter().sum())
        }
    }

    fn full_record() -> RawRecord {
        RawRecord::new()
            .with_number("Rooms", 3.0)
            .with_number("Bathroom", 2.0)
            .with_number("Car", 2.0)
            .with_number("Landsize", 500.0)
            .with_number("Distance", 6.5)
            .with_label("PropertyType", "House")
            .with_label("Region", "Northern Metropolitan")
    }

    #[test]
    fn test_estimate_goes_through_aligned_vector() {
        let registry = SchemaRegistry::for_version(SchemaVersion::V1);
        let model = StubModel::matching(&registry);
        let predictor = Predictor::new(registry, model).unwrap();

        let estimate = predictor.estimate(&full_record()).unwrap();
        // 3 + 2 + 2 + 500 + 6.5 + region indicator
        assert_eq!(estimate.price_aud, 514.5);
    }

    #[test]
    fn test_construction_rejects_column_drift() {
        let registry = SchemaRegistry::for_version(SchemaVersion::V1);
        let mut columns = registry.schema().columns().to_vec();
        columns.swap(0, 1);
        let model = StubModel { columns };

        let err = Predictor::new(registry, model).unwrap_err();
        match err {
            HousingError::SchemaMismatch(msg) => assert!(msg.contains("Column 0")),
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_construction_rejects_width_drift() {
        // V2 registry against a model trained on the V1 column set
        let v1 = SchemaRegistry::for_version(SchemaVersion::V1);
        let model = StubModel::matching(&v1);
        let registry = SchemaRegistry::for_version(SchemaVersion::V2);

        let err = Predictor::new(registry, model).unwrap_err();
        assert!(matches!(err, HousingError::SchemaMismatch(_)));
    }

    #[test]
    fn test_alignment_errors_are_not_swallowed() {
        let registry = SchemaRegistry::for_version(SchemaVersion::V1);
        let model = StubModel::matching(&registry);
        let predictor = Predictor::new(registry, model).unwrap();

        let incomplete = RawRecord::new().with_number("Rooms", 3.0);
        let err = predictor.estimate(&incomplete).unwrap_err();
        assert!(matches!(err, HousingError::SchemaMismatch(_)));

        let bad_label = full_record().with_label("PropertyType", "Castle");
        let err = predictor.estimate(&bad_label).unwrap_err();
        assert!(matches!(err, HousingError::UnknownCategory { .. }));
    }

    #[test]
    fn test_deployed_artifact_serves_the_default_request() {
        let predictor = Predictor::load(&Config::default()).unwrap();
        let estimate = predictor.estimate(&full_record()).unwrap();

        assert_eq!(estimate.price_aud, 1_110_000.0);
    }

    #[test]
    fn test_load_fails_closed_without_an_artifact() {
        let mut config = Config::default();
        config.model.artifact_path = "missing/model.json".to_string();

        let err = Predictor::load(&config).unwrap_err();
        assert!(matches!(err, HousingError::ModelUnavailable(_)));
    }
}
