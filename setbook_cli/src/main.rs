use clap::{Parser, Subcommand};
use setbook_core::aggregate::{personal_records, weekly_volume};
use setbook_core::catalog::CatalogLookup;
use setbook_core::preview::{
    catalog_entry_preview, exercise_preview, session_preview, set_label,
};
use setbook_core::wal::read_workouts;
use setbook_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "setbook")]
#[command(about = "Strength workout log with catalog-backed validation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a workout JSON file without logging it
    Validate {
        /// Path to the workout JSON
        file: PathBuf,
    },

    /// Validate a workout JSON file and log it
    Log {
        /// Path to the workout JSON
        file: PathBuf,
    },

    /// Show logged workouts, most recent first
    Show {
        /// Maximum number of workouts to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// List catalog exercises
    Catalog {
        /// Include deactivated exercises
        #[arg(long)]
        all: bool,
    },

    /// Deactivate a catalog exercise so it can no longer be chosen
    Deactivate {
        /// Catalog entry id
        id: String,
    },

    /// Weekly volume and personal records
    Stats,

    /// Export every logged set to CSV
    Export {
        /// Output file (defaults to <data-dir>/workouts.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Resolved paths and settings shared by every command
struct Context {
    config: Config,
    data_dir: PathBuf,
    catalog_path: PathBuf,
    wal_path: PathBuf,
}

impl Context {
    fn catalog(&self) -> Result<Catalog> {
        let catalog = Catalog::load_or_default(&self.catalog_path)?;
        let errors = catalog.validate();
        if !errors.is_empty() {
            eprintln!("Catalog validation errors:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            return Err(Error::CatalogValidation("Invalid catalog".into()));
        }
        Ok(catalog)
    }
}

fn main() -> Result<()> {
    setbook_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    let ctx = Context {
        catalog_path: config.catalog_path(&data_dir),
        wal_path: data_dir.join("wal").join("workouts.wal"),
        data_dir,
        config,
    };

    match cli.command {
        Commands::Validate { file } => cmd_validate(&ctx, &file),
        Commands::Log { file } => cmd_log(&ctx, &file),
        Commands::Show { limit } => cmd_show(&ctx, limit),
        Commands::Catalog { all } => cmd_catalog(&ctx, all),
        Commands::Deactivate { id } => cmd_deactivate(&ctx, &id),
        Commands::Stats => cmd_stats(&ctx),
        Commands::Export { out } => cmd_export(&ctx, out),
    }
}

fn read_draft(file: &Path) -> Result<WorkoutDraft> {
    let contents = std::fs::read_to_string(file)?;
    tracing::debug!("Read workout draft from {:?}", file);
    Ok(serde_json::from_str(&contents)?)
}

/// Validate a draft, printing every violation on rejection
fn check_draft(file: &Path, catalog: &Catalog) -> Result<WorkoutSession> {
    let draft = read_draft(file)?;
    match validate_workout(&draft, catalog) {
        Ok(workout) => Ok(workout),
        Err(violations) => {
            eprintln!("✗ Workout rejected with {} violation(s):", violations.len());
            for violation in &violations {
                eprintln!("  - {}", violation);
            }
            Err(Error::Validation(violations))
        }
    }
}

fn cmd_validate(ctx: &Context, file: &Path) -> Result<()> {
    let catalog = ctx.catalog()?;
    let workout = check_draft(file, &catalog)?;

    println!("✓ Workout is valid");
    display_workout(&workout, &catalog, &ctx.config.display);
    Ok(())
}

fn cmd_log(ctx: &Context, file: &Path) -> Result<()> {
    let catalog = ctx.catalog()?;
    let workout = check_draft(file, &catalog)?;

    let mut sink = JsonlSink::new(&ctx.wal_path);
    let stored = sink.append(&workout)?;

    println!("✓ Workout logged ({})", stored.id);
    display_workout(&workout, &catalog, &ctx.config.display);
    Ok(())
}

fn cmd_show(ctx: &Context, limit: usize) -> Result<()> {
    let catalog = ctx.catalog()?;
    let workouts = read_workouts(&ctx.wal_path)?;

    if workouts.is_empty() {
        println!("No workouts logged yet.");
        return Ok(());
    }

    for stored in workouts.iter().rev().take(limit) {
        display_workout(&stored.workout, &catalog, &ctx.config.display);
    }
    Ok(())
}

fn cmd_catalog(ctx: &Context, all: bool) -> Result<()> {
    let catalog = ctx.catalog()?;
    let entries = if all {
        catalog.all()
    } else {
        catalog.selectable()
    };

    for entry in entries {
        let preview = catalog_entry_preview(entry);
        let status = if entry.is_active { "" } else { " [inactive]" };
        let media = if preview.media.is_some() { " [image]" } else { "" };
        println!(
            "  {:<18} {:<24} {}{}{}",
            entry.id, preview.title, preview.subtitle, media, status
        );
    }
    Ok(())
}

fn cmd_deactivate(ctx: &Context, id: &str) -> Result<()> {
    let mut catalog = ctx.catalog()?;
    catalog.deactivate(id)?;
    catalog.save(&ctx.catalog_path)?;

    println!("✓ Deactivated {}", id);
    println!("  Catalog: {}", ctx.catalog_path.display());
    Ok(())
}

fn cmd_stats(ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let workouts: Vec<WorkoutSession> = read_workouts(&ctx.wal_path)?
        .into_iter()
        .map(|stored| stored.workout)
        .collect();

    if workouts.is_empty() {
        println!("No workouts logged yet.");
        return Ok(());
    }

    println!("Weekly volume");
    for week in weekly_volume(&workouts) {
        println!(
            "  {}-W{:02}  {} workouts, {} sets, {:.1} kg",
            week.iso_year, week.iso_week, week.workouts, week.sets, week.volume_kg
        );
    }

    println!();
    println!("Personal records");
    for record in personal_records(&workouts) {
        let name = catalog
            .resolve(&record.exercise_ref)
            .map_or(record.exercise_ref.as_str(), |e| e.name.as_str());
        println!(
            "  {:<24} {} {} x {} ({})",
            name,
            record.weight,
            record.weight_unit,
            record.reps,
            ctx.config.display.format_date(&record.date)
        );
    }
    Ok(())
}

fn cmd_export(ctx: &Context, out: Option<PathBuf>) -> Result<()> {
    let catalog = ctx.catalog()?;
    let workouts = read_workouts(&ctx.wal_path)?;
    let out = out.unwrap_or_else(|| ctx.data_dir.join("workouts.csv"));

    let rows = setbook_core::export::export_csv(&workouts, &catalog, &out)?;

    println!("✓ Exported {} sets", rows);
    println!("  CSV: {}", out.display());
    Ok(())
}

fn display_workout(workout: &WorkoutSession, catalog: &Catalog, display: &DateDisplay) {
    let preview = session_preview(workout, display);
    println!();
    println!("{}", preview.title);
    println!("  {}", preview.subtitle);

    for entry in &workout.exercises {
        let exercise = exercise_preview(entry, catalog);
        println!("  ▸ {} ({})", exercise.title, exercise.subtitle);
        for set in &entry.sets {
            let label = set_label(set);
            println!("      {} · {}", label.title, label.subtitle);
        }
    }
}
