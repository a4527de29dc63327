use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cdss_core::config::data_dir_from_env_value;
use cdss_core::{AddPlanInput, CdssError, CoreConfig, DocumentStore, NonEmptyText, PlanService};

#[derive(Parser)]
#[command(name = "cdss")]
#[command(about = "CDSS medication plan CLI")]
struct Cli {
    /// Document store directory
    #[arg(long, env = "CDSS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all medication plans
    List,
    /// Add a medication plan
    Add {
        /// Patient identifier
        patient_id: String,
        /// Medication name
        medication_name: String,
        /// Dosage, e.g. "5mg"
        dosage: String,
        /// Medication type: western or tcm
        #[arg(long = "type", default_value = "western")]
        medication_type: String,
        /// Schedule, e.g. "Once a day in the morning"
        #[arg(long)]
        schedule: String,
        /// Ingredients (comma-separated, tcm only)
        #[arg(long)]
        ingredients: Option<String>,
    },
    /// Check a medication against a patient's active plans without adding it
    Check {
        /// Patient identifier
        patient_id: String,
        /// Medication name
        medication_name: String,
    },
}

fn split_ingredients(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cdss=info".parse()?)
                .add_directive("cdss_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'cdss --help' for commands");
        return Ok(());
    };

    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| data_dir_from_env_value(None));
    let cfg = Arc::new(CoreConfig::new(data_dir)?);
    let service = PlanService::new(Arc::new(DocumentStore::open(cfg)?));

    match command {
        Commands::List => {
            let plans = service.list_plans()?;
            if plans.is_empty() {
                println!("No medication plans found.");
            }
            for plan in plans {
                let patient = plan
                    .patient
                    .as_ref()
                    .map_or("N/A", |p| p.name.as_str());
                match &plan.medication {
                    Some(med) => {
                        println!(
                            "Patient: {}, Medication: {} ({}), Type: {}, Schedule: {}, Active: {}",
                            patient, med.name, med.dosage, med.medication_type, plan.schedule,
                            plan.is_active
                        );
                        if let Some(ingredients) = &med.ingredients {
                            println!("  Ingredients: {}", ingredients.join(", "));
                        }
                    }
                    None => println!(
                        "Patient: {}, Medication: N/A, Schedule: {}, Active: {}",
                        patient, plan.schedule, plan.is_active
                    ),
                }
            }
        }
        Commands::Add {
            patient_id,
            medication_name,
            dosage,
            medication_type,
            schedule,
            ingredients,
        } => {
            let input = AddPlanInput {
                patient_id: Some(patient_id),
                medication_name: Some(medication_name),
                dosage: Some(dosage),
                medication_type: Some(medication_type),
                ingredients: ingredients.as_deref().map(split_ingredients),
                schedule: Some(schedule),
            };
            match service.add_plan(input) {
                Ok(plan) => {
                    tracing::info!("plan {} stored for patient {}", plan.id, plan.patient);
                    println!("Medication plan added successfully! ID: {}", plan.id);
                }
                Err(CdssError::InteractionDetected(message)) => {
                    tracing::warn!("plan refused: {}", message);
                    std::process::exit(2);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Check {
            patient_id,
            medication_name,
        } => {
            let result = service.check_interactions(
                &NonEmptyText::new(medication_name)?,
                &NonEmptyText::new(patient_id)?,
            )?;
            match result.message {
                Some(message) if result.interacts => println!("Warning: {}", message),
                _ => println!("No interaction found."),
            }
        }
    }

    Ok(())
}
