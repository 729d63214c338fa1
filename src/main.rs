//! Melbourne Housing Price Prediction CLI
//!
//! Enter property attributes and get an estimated sale price from the
//! deployed model.

use clap::{Parser, Subcommand};
use housing::{Config, Result};

#[derive(Parser)]
#[command(name = "housing")]
#[command(about = "Melbourne house price prediction", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the price of a property
    Predict {
        /// Number of rooms (1-5)
        #[arg(long, default_value = "3")]
        rooms: u32,
        /// Number of bathrooms (1-3)
        #[arg(long, default_value = "2")]
        bathroom: u32,
        /// Number of car spaces (0-4)
        #[arg(long, default_value = "2")]
        car: u32,
        /// Land size in square metres (50-2000)
        #[arg(long, default_value = "500")]
        landsize: f64,
        /// Distance to the city centre in km (1.0-48.0)
        #[arg(long, default_value = "10.0")]
        distance: f64,
        /// Property type (House, Townhouse, Unit)
        #[arg(long, default_value = "House")]
        property_type: String,
        /// Region name
        #[arg(long, default_value = "Northern Metropolitan")]
        region: String,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Schema registry commands
    Schema {
        #[command(subcommand)]
        action: SchemaCommands,
    },
    /// Model artifact commands
    Model {
        #[command(subcommand)]
        action: ModelCommands,
    },
    /// Initialize a new deployment with default config
    Init,
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Print the deployed column list and encoding rules
    Show,
    /// Validate the registry against the model artifact's columns
    Check,
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Print artifact metadata and evaluation metrics
    Info,
}

#[derive(Debug, Clone, Copy)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Run command
    let result = match cli.command {
        Commands::Predict {
            rooms,
            bathroom,
            car,
            landsize,
            distance,
            property_type,
            region,
            format,
        } => {
            let request = housing::app::PredictionRequest {
                rooms,
                bathroom,
                car,
                landsize,
                distance,
                property_type,
                region,
            };
            commands::predict(&config, request, format)
        }
        Commands::Schema { action } => match action {
            SchemaCommands::Show => commands::schema_show(&config),
            SchemaCommands::Check => commands::schema_check(&config),
        },
        Commands::Model { action } => match action {
            ModelCommands::Info => commands::model_info(&config),
        },
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use housing::app::{self, PredictionRequest, Rendered};
    use housing::model::{PriceModel, TreeEnsemble};
    use housing::predict::Predictor;
    use housing::schema::SchemaRegistry;

    pub fn predict(config: &Config, request: PredictionRequest, format: OutputFormat) -> Result<()> {
        let registry = SchemaRegistry::for_version(config.schema.version);

        // Every failure on the prediction path becomes a readable message
        // and the price output is withheld.
        if let Err(e) = request.validate() {
            eprintln!("{}", app::error_message(&e, &registry));
            std::process::exit(1);
        }

        let predictor = match Predictor::load(config) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{}", app::error_message(&e, &registry));
                std::process::exit(1);
            }
        };

        let estimate = match predictor.estimate(&request.to_record()) {
            Ok(est) => est,
            Err(e) => {
                eprintln!("{}", app::error_message(&e, predictor.registry()));
                std::process::exit(1);
            }
        };

        match format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "price_aud": estimate.price_aud,
                    "schema": format!("{}", predictor.registry().version()),
                });
                println!("{}", serde_json::to_string_pretty(&json).unwrap());
            }
            OutputFormat::Table => {
                let metrics = predictor.model().metrics();
                print!("{}", app::format_estimate(&request, &estimate, Some(metrics)));

                println!("Insights:");
                for artifact in app::insight_artifacts(&config.assets.image_dir) {
                    match app::render(&artifact) {
                        Rendered::Image(path) => {
                            println!("  {}: {}", artifact.title, path.display())
                        }
                        Rendered::Placeholder(text) => println!("  {}", text),
                    }
                }
            }
        }

        Ok(())
    }

    pub fn schema_show(config: &Config) -> Result<()> {
        let registry = SchemaRegistry::for_version(config.schema.version);

        println!(
            "Schema {} ({} columns):",
            registry.version(),
            registry.schema().len()
        );
        for (position, column) in registry.schema().columns().iter().enumerate() {
            println!("  {:2}  {}", position, column);
        }

        println!("\nCategorical encoding:");
        for family in registry.families() {
            println!(
                "  {} (reference: {} -> all indicators 0)",
                family.attribute(),
                family.reference()
            );
            for (label, column) in family.members() {
                println!("    {} -> {}", label, column);
            }
        }

        Ok(())
    }

    pub fn schema_check(config: &Config) -> Result<()> {
        let registry = SchemaRegistry::for_version(config.schema.version);
        let model = TreeEnsemble::load(std::path::Path::new(&config.model.artifact_path))?;

        match Predictor::new(registry, model) {
            Ok(predictor) => {
                println!(
                    "Schema {} matches the model artifact ({} columns).",
                    predictor.registry().version(),
                    predictor.registry().schema().len()
                );
                Ok(())
            }
            Err(e) => {
                eprintln!("Schema drift detected: {}", e);
                std::process::exit(1);
            }
        }
    }

    pub fn model_info(config: &Config) -> Result<()> {
        let model = TreeEnsemble::load(std::path::Path::new(&config.model.artifact_path))?;
        let metrics = model.metrics();

        println!("Artifact:  {}", config.model.artifact_path);
        println!("Columns:   {}", model.columns().len());
        println!("Trees:     {}", model.tree_count());
        println!("R\u{b2}:        {:.2}", metrics.r2);
        println!("RMSE:      {} AUD", app::format_aud(metrics.rmse));

        Ok(())
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("model")?;
        std::fs::create_dir_all("images")?;
        println!("Created model/ and images/ directories");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Place the exported model artifact at model/house_price_model.json");
        println!("  3. Run 'housing schema check' to validate the deployment");
        println!("  4. Run 'housing predict --rooms 3 --region \"Northern Metropolitan\"'");

        Ok(())
    }
}
