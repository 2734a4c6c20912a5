mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    BudgetArgs, PlanArgs, cmd_budget, cmd_complete, cmd_plan, cmd_recipes, cmd_rules, json_error,
};
use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "assiette",
    version,
    about = "Meal plans from a profile, practitioner guidance and food lists",
    long_about = "\n\n   assiette\n   know what goes on the plate.\n\n\
        Reads the food lists (petit_dejeuner, dejeuner, diner) and the\n\
        practitioner document (consignes.txt) from the data directory."
)]
struct Cli {
    /// Data directory holding food lists, consignes.txt and planner.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute BMR, TDEE, daily calories and macro targets
    Budget {
        /// Profile JSON file (French or English field names); flags override it
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,
        /// Height in cm
        #[arg(long)]
        height: Option<f64>,
        /// Age in years
        #[arg(long)]
        age: Option<f64>,
        /// homme/femme (male/female)
        #[arg(long)]
        sex: Option<String>,
        /// sedentaire, leger, modere, intense, extreme
        #[arg(long)]
        activity: Option<String>,
        /// perte, maintien, prise
        #[arg(long)]
        objective: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Extract calorie rules and food guidelines from a practitioner document
    Rules {
        /// Document to read (default: consignes.txt in the data directory)
        file: Option<PathBuf>,
        /// Apply the rules to this computed daily budget
        #[arg(long)]
        calories: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a food list with estimated macros filled in
    Complete {
        /// Food list (CSV or JSON)
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the recipes a food list can realize for a meal slot
    Recipes {
        /// Meal slot: petit_dejeuner, dejeuner, diner
        slot: String,
        /// Food list (default: the slot's list in the data directory)
        #[arg(long)]
        pool: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a meal, a day (default) or a week
    Plan {
        /// Profile JSON file
        #[arg(long)]
        profile: PathBuf,
        /// Generate a single meal for this slot
        #[arg(long, conflicts_with = "week")]
        slot: Option<String>,
        /// Generate seven days
        #[arg(long)]
        week: bool,
        /// With --week, also list the groceries for the week
        #[arg(long, requires = "week")]
        shopping: bool,
        /// Intermittent fasting: skip breakfast
        #[arg(long)]
        fasting: bool,
        /// Seed for reproducible plans
        #[arg(long)]
        seed: Option<u64>,
        /// Practitioner document (default: consignes.txt in the data directory)
        #[arg(long)]
        document: Option<PathBuf>,
        /// First day of the week (YYYY-MM-DD, today, tomorrow, monday)
        #[arg(long)]
        start: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    fn json(&self) -> bool {
        match self {
            Commands::Budget { json, .. }
            | Commands::Rules { json, .. }
            | Commands::Complete { json, .. }
            | Commands::Recipes { json, .. }
            | Commands::Plan { json, .. } => *json,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ASSIETTE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.command.json();

    if let Err(e) = run(cli) {
        if json {
            println!("{}", json_error(&format!("{e:#}")));
        } else {
            eprintln!("Error: {e:#}");
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.data_dir)?;

    match cli.command {
        Commands::Budget {
            profile,
            weight,
            height,
            age,
            sex,
            activity,
            objective,
            json,
        } => cmd_budget(
            &BudgetArgs {
                profile,
                weight,
                height,
                age,
                sex,
                activity,
                objective,
            },
            json,
        ),
        Commands::Rules {
            file,
            calories,
            json,
        } => cmd_rules(&config, file.as_deref(), calories, json),
        Commands::Complete { file, json } => cmd_complete(&file, json),
        Commands::Recipes { slot, pool, json } => {
            cmd_recipes(&config, &slot, pool.as_deref(), json)
        }
        Commands::Plan {
            profile,
            slot,
            week,
            shopping,
            fasting,
            seed,
            document,
            start,
            json,
        } => cmd_plan(
            &config,
            &PlanArgs {
                profile,
                slot,
                week,
                shopping,
                fasting,
                seed,
                document,
                start,
            },
            json,
        ),
    }
}
