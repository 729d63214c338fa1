//! Dashboard-facing boundary layer
//!
//! Validates user input against the widget bounds, converts every error
//! kind into a readable message (withholding the price), and renders the
//! pre-built insight plots with a placeholder fallback.

use std::path::{Path, PathBuf};

use crate::features::RawRecord;
use crate::model::ModelMetrics;
use crate::schema::{PROPERTY_TYPE, REGION, SchemaRegistry};
use crate::{HousingError, PriceEstimate, Result};

/// Widget bounds from the input form
const ROOMS_BOUNDS: (f64, f64) = (1.0, 5.0);
const BATHROOM_BOUNDS: (f64, f64) = (1.0, 3.0);
const CAR_BOUNDS: (f64, f64) = (0.0, 4.0);
const LANDSIZE_BOUNDS: (f64, f64) = (50.0, 2000.0);
const DISTANCE_BOUNDS: (f64, f64) = (1.0, 48.0);

/// Typed user input for one prediction
#[derive(Debug, Clone)]
pub struct PredictionRequest {
    pub rooms: u32,
    pub bathroom: u32,
    pub car: u32,
    /// Land size in square metres
    pub landsize: f64,
    /// Distance to the city centre in kilometres
    pub distance: f64,
    pub property_type: String,
    pub region: String,
}

impl PredictionRequest {
    /// Enforce the input widget bounds
    ///
    /// The aligner passes numerics through unvalidated; out-of-range values
    /// are stopped here, before a record is built.
    pub fn validate(&self) -> Result<()> {
        check_range("Rooms", self.rooms as f64, ROOMS_BOUNDS)?;
        check_range("Bathroom", self.bathroom as f64, BATHROOM_BOUNDS)?;
        check_range("Car", self.car as f64, CAR_BOUNDS)?;
        check_range("Landsize", self.landsize, LANDSIZE_BOUNDS)?;
        check_range("Distance", self.distance, DISTANCE_BOUNDS)?;
        Ok(())
    }

    /// Build the raw attribute record handed to the aligner
    pub fn to_record(&self) -> RawRecord {
        RawRecord::new()
            .with_number("Rooms", self.rooms as f64)
            .with_number("Bathroom", self.bathroom as f64)
            .with_number("Car", self.car as f64)
            .with_number("Landsize", self.landsize)
            .with_number("Distance", self.distance)
            .with_label(PROPERTY_TYPE, &self.property_type)
            .with_label(REGION, &self.region)
    }
}

fn check_range(attribute: &str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if value < min || value > max {
        return Err(HousingError::OutOfRange {
            attribute: attribute.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Format an amount as whole Australian dollars with thousands separators
pub fn format_aud(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.abs().to_string();

    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Format a price estimate for terminal display
pub fn format_estimate(
    request: &PredictionRequest,
    estimate: &PriceEstimate,
    metrics: Option<&ModelMetrics>,
) -> String {
    let fit = match metrics {
        Some(m) => format!("R\u{b2} {:.2}, RMSE {} AUD", m.r2, format_aud(m.rmse)),
        None => "unavailable".to_string(),
    };

    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {}-room {}, {}
├─────────────────────────────────────────────────┤
│  Estimated price:  {} AUD
│  Model fit:        {}
└─────────────────────────────────────────────────┘
"#,
        request.rooms,
        request.property_type,
        request.region,
        format_aud(estimate.price_aud),
        fit
    )
}

/// Convert an error into the message shown in place of a price
///
/// Unknown-category messages list the accepted choices so the caller can
/// re-prompt; no message ever carries a fallback price.
pub fn error_message(err: &HousingError, registry: &SchemaRegistry) -> String {
    match err {
        HousingError::UnknownCategory { attribute, value } => {
            let choices = registry
                .valid_labels(attribute)
                .map(|labels| labels.join(", "))
                .unwrap_or_default();
            format!(
                "Unknown {} value: {}. Choose one of: {}",
                attribute, value, choices
            )
        }
        HousingError::SchemaMismatch(msg) => {
            format!(
                "Prediction unavailable ({}). Retrying with the same input will not help.",
                msg
            )
        }
        HousingError::ModelUnavailable(msg) => {
            format!("The price model could not be loaded: {}", msg)
        }
        other => other.to_string(),
    }
}

/// A pre-rendered insight plot shipped alongside the model
#[derive(Debug, Clone)]
pub struct Artifact {
    pub title: String,
    pub path: PathBuf,
}

/// Outcome of rendering an artifact
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// The artifact file exists and can be displayed
    Image(PathBuf),
    /// The artifact is missing; show this text instead
    Placeholder(String),
}

/// Render an artifact, falling back to a placeholder when the file is absent
pub fn render(artifact: &Artifact) -> Rendered {
    if artifact.path.is_file() {
        Rendered::Image(artifact.path.clone())
    } else {
        Rendered::Placeholder(format!("{} not available", artifact.title))
    }
}

/// The insight plots the dashboard displays next to an estimate
pub fn insight_artifacts(image_dir: &str) -> Vec<Artifact> {
    let dir = Path::new(image_dir);
    vec![
        Artifact {
            title: "Categorical Feature Analysis".to_string(),
            path: dir.join("cat_features.png"),
        },
        Artifact {
            title: "Landsize Impact".to_string(),
            path: dir.join("landsize_impact.png"),
        },
        Artifact {
            title: "Feature Importance".to_string(),
            path: dir.join("feature_importance.png"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaVersion;

    fn request() -> PredictionRequest {
        PredictionRequest {
            rooms: 3,
            bathroom: 2,
            car: 2,
            landsize: 500.0,
            distance: 10.0,
            property_type: "House".to_string(),
            region: "Northern Metropolitan".to_string(),
        }
    }

    #[test]
    fn test_in_bounds_request_validates() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_out_of_bounds_values_are_rejected() {
        let mut r = request();
        r.rooms = 6;
        assert!(matches!(
            r.validate().unwrap_err(),
            HousingError::OutOfRange { .. }
        ));

        let mut r = request();
        r.landsize = 49.0;
        match r.validate().unwrap_err() {
            HousingError::OutOfRange { attribute, .. } => assert_eq!(attribute, "Landsize"),
            other => panic!("expected OutOfRange, got {:?}", other),
        }

        let mut r = request();
        r.distance = 50.0;
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_car_spaces_may_be_zero() {
        let mut r = request();
        r.car = 0;
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_to_record_carries_every_attribute() {
        let record = request().to_record();

        assert_eq!(record.number("Rooms"), Some(3.0));
        assert_eq!(record.number("Landsize"), Some(500.0));
        assert_eq!(record.label(PROPERTY_TYPE), Some("House"));
        assert_eq!(record.label(REGION), Some("Northern Metropolitan"));
        assert_eq!(record.len(), 7);
    }

    #[test]
    fn test_format_aud_groups_thousands() {
        assert_eq!(format_aud(283941.0), "$283,941");
        assert_eq!(format_aud(1_050_000.4), "$1,050,000");
        assert_eq!(format_aud(950.0), "$950");
        assert_eq!(format_aud(-1234.0), "-$1,234");
    }

    #[test]
    fn test_format_estimate_shows_price_and_fit() {
        let estimate = PriceEstimate { price_aud: 800000.0 };
        let metrics = ModelMetrics {
            r2: 0.73,
            rmse: 283941.0,
        };
        let card = format_estimate(&request(), &estimate, Some(&metrics));

        assert!(card.contains("$800,000 AUD"));
        assert!(card.contains("0.73"));
        assert!(card.contains("Northern Metropolitan"));
    }

    #[test]
    fn test_unknown_category_message_lists_choices() {
        let registry = SchemaRegistry::for_version(SchemaVersion::V1);
        let err = HousingError::UnknownCategory {
            attribute: REGION.to_string(),
            value: "Mars".to_string(),
        };

        let message = error_message(&err, &registry);
        assert!(message.contains("Mars"));
        assert!(message.contains("Eastern Metropolitan"));
        assert!(message.contains("Western Metropolitan"));
    }

    #[test]
    fn test_schema_mismatch_message_discourages_retry() {
        let registry = SchemaRegistry::for_version(SchemaVersion::V1);
        let err = HousingError::SchemaMismatch("column drift".to_string());

        let message = error_message(&err, &registry);
        assert!(message.contains("will not help"));
    }

    #[test]
    fn test_render_missing_artifact_gives_placeholder() {
        let artifact = Artifact {
            title: "Categorical Feature Analysis".to_string(),
            path: PathBuf::from("no/such/dir/cat_features.png"),
        };

        match render(&artifact) {
            Rendered::Placeholder(text) => {
                assert_eq!(text, "Categorical Feature Analysis not available")
            }
            other => panic!("expected placeholder, got {:?}", other),
        }
    }

    #[test]
    fn test_render_existing_artifact_gives_image() {
        let path = std::env::temp_dir().join("housing_render_test.png");
        std::fs::write(&path, b"png").unwrap();

        let artifact = Artifact {
            title: "Feature Importance".to_string(),
            path: path.clone(),
        };
        assert_eq!(render(&artifact), Rendered::Image(path.clone()));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_insight_artifacts_live_under_the_image_dir() {
        let artifacts = insight_artifacts("images");
        assert_eq!(artifacts.len(), 3);
        assert!(artifacts
            .iter()
            .all(|a| a.path.starts_with("images")));
    }
}
