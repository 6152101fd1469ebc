use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Deserialize;
use crate::config::Config;
use crate::db::DbConnection;
use crate::logging;
use crate::models::{slugify, ProcurementInstance, StageEntry, StageTemplate};
use crate::repo::{InstanceRepo, ProcurementTypeRepo, ProgramRepo, SqliteLedger};
use crate::schedule::{create_schedule, instance_report, percent_complete, set_planned_dates, update_stage, StageUpdate};
use crate::cli::output::{
    format_instance_detail, format_instance_list, format_percent, format_program_list,
    format_type_detail, format_type_list, instance_json, type_json, InstanceSummary,
};
use crate::cli::error::{user_error, validate_budget, validate_instance_id, validate_non_empty, validate_sequence};
use crate::utils::{format_date, parse_date, parse_optional_date, today};
use anyhow::{Context, Result};

#[derive(Parser)]
#[command(name = "tahap")]
#[command(about = "Procurement stage ledger - schedules and tracks the stages of government procurement")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Procurement type catalog commands
    Types {
        #[command(subcommand)]
        subcommand: TypeCommands,
    },
    /// Program management commands
    Programs {
        #[command(subcommand)]
        subcommand: ProgramCommands,
    },
    /// Register a procurement and plan its stages
    Add {
        /// Procurement type (ID or exact name)
        #[arg(value_name = "TYPE")]
        type_ref: String,
        /// Procurement title
        #[arg(long)]
        title: String,
        /// Program slug the procurement belongs to
        #[arg(long)]
        program: Option<String>,
        /// Budget in rupiah
        #[arg(long)]
        budget: Option<i64>,
        /// Anchor date; the first stage starts the day after (default: today)
        #[arg(long)]
        anchor: Option<String>,
    },
    /// List procurements with their progress
    List {
        /// Only procurements of this program
        #[arg(long)]
        program: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show a procurement and its stage schedule
    Show {
        /// Procurement ID
        instance: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Override the planned dates of one stage (no cascade)
    Plan {
        /// Procurement ID
        instance: String,
        /// Stage number
        sequence: u32,
        /// New planned start date
        #[arg(long)]
        start: Option<String>,
        /// New planned end date
        #[arg(long)]
        end: Option<String>,
    },
    /// Record actual progress on a stage
    Update {
        /// Procurement ID
        instance: String,
        /// Stage number
        sequence: u32,
        /// Date work on the stage actually started
        #[arg(long = "actual-start")]
        actual_start: Option<String>,
        /// Date the stage actually finished (marks it completed)
        #[arg(long = "actual-end")]
        actual_end: Option<String>,
        /// Free-text note for the stage
        #[arg(long)]
        note: Option<String>,
    },
    /// Mark a stage completed (default date: today)
    Done {
        /// Procurement ID
        instance: String,
        /// Stage number
        sequence: u32,
        /// Actual completion date
        date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TypeCommands {
    /// List procurement types
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the stage templates of a procurement type
    Show {
        /// Procurement type (ID or exact name)
        #[arg(value_name = "TYPE")]
        type_ref: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Import a procurement type from a JSON file
    Import {
        /// Path to a JSON file: {"name": .., "stages": [..]}
        file: std::path::PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ProgramCommands {
    /// Create a new program
    Add {
        /// Program name
        name: String,
        /// Owning agency
        #[arg(long)]
        agency: Option<String>,
    },
    /// List programs
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// JSON document accepted by `types import`
#[derive(Debug, Deserialize)]
struct TypeImport {
    name: String,
    stages: Vec<StageTemplate>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;
    logging::init(config.log_level.as_deref());
    for key in &config.ignored_keys {
        log::warn!("Ignoring unknown config key '{}'", key);
    }
    log::debug!("Using ledger database at {}", config.data_location.display());

    let conn = DbConnection::connect_at(&config.data_location)
        .context("Failed to connect to database")?;
    handle_command(&conn, cli)
}

fn handle_command(conn: &Connection, cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Types { subcommand } => handle_types(conn, subcommand),
        Commands::Programs { subcommand } => handle_programs(conn, subcommand),
        Commands::Add { type_ref, title, program, budget, anchor } => {
            handle_add(conn, &type_ref, &title, program.as_deref(), budget, anchor.as_deref())
        }
        Commands::List { program, json } => handle_list(conn, program.as_deref(), json),
        Commands::Show { instance, json } => handle_show(conn, &instance, json),
        Commands::Plan { instance, sequence, start, end } => {
            handle_plan(conn, &instance, sequence, start.as_deref(), end.as_deref())
        }
        Commands::Update { instance, sequence, actual_start, actual_end, note } => {
            handle_update(conn, &instance, sequence, actual_start.as_deref(), actual_end.as_deref(), note)
        }
        Commands::Done { instance, sequence, date } => handle_done(conn, &instance, sequence, date.as_deref()),
    }
}

fn handle_types(conn: &Connection, cmd: TypeCommands) -> Result<()> {
    match cmd {
        TypeCommands::List { json } => {
            let mut types = Vec::new();
            for ty in ProcurementTypeRepo::list(conn).context("Failed to list procurement types")? {
                let stages = ProcurementTypeRepo::get_stages(conn, ty.id.unwrap_or(0))?;
                types.push((ty, stages));
            }

            if json {
                let json_types: Vec<serde_json::Value> = types
                    .iter()
                    .map(|(ty, stages)| type_json(ty, stages))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&json_types)?);
            } else {
                print!("{}", format_type_list(&types));
                if types.is_empty() {
                    println!();
                }
            }
            Ok(())
        }
        TypeCommands::Show { type_ref, json } => {
            let ty = match ProcurementTypeRepo::resolve(conn, &type_ref)? {
                Some(ty) => ty,
                None => user_error(&format!("Procurement type '{}' not found", type_ref)),
            };
            let stages = ProcurementTypeRepo::get_stages(conn, ty.id.unwrap_or(0))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&type_json(&ty, &stages))?);
            } else {
                print!("{}", format_type_detail(&ty, &stages));
            }
            Ok(())
        }
        TypeCommands::Import { file } => {
            let contents = match std::fs::read_to_string(&file) {
                Ok(contents) => contents,
                Err(e) => user_error(&format!("Cannot read '{}': {}", file.display(), e)),
            };
            let import: TypeImport = match serde_json::from_str(&contents) {
                Ok(import) => import,
                Err(e) => user_error(&format!("Invalid procurement type file '{}': {}", file.display(), e)),
            };
            if let Err(e) = validate_non_empty(&import.name, "Procurement type name") {
                user_error(&e);
            }
            if ProcurementTypeRepo::get_by_name(conn, &import.name)?.is_some() {
                user_error(&format!("Procurement type '{}' already exists", import.name));
            }

            let (ty, stages) = ProcurementTypeRepo::create_with_stages(conn, &import.name, &import.stages)?;
            println!(
                "Imported procurement type '{}' (id: {}) with {} stages",
                ty.name,
                ty.id.unwrap_or(0),
                stages.len()
            );
            Ok(())
        }
    }
}

fn handle_programs(conn: &Connection, cmd: ProgramCommands) -> Result<()> {
    match cmd {
        ProgramCommands::Add { name, agency } => {
            if let Err(e) = validate_non_empty(&name, "Program name") {
                user_error(&e);
            }
            if slugify(&name).is_empty() {
                user_error(&format!("Program name '{}' must contain letters or digits", name));
            }

            let program = ProgramRepo::create(conn, name.trim(), agency.as_deref())
                .context("Failed to create program")?;
            println!("Created program '{}' (slug: {})", program.name, program.slug);
            Ok(())
        }
        ProgramCommands::List { json } => {
            let programs = ProgramRepo::list(conn).context("Failed to list programs")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&programs)?);
            } else {
                print!("{}", format_program_list(&programs));
                if programs.is_empty() {
                    println!();
                }
            }
            Ok(())
        }
    }
}

fn handle_add(
    conn: &Connection,
    type_ref: &str,
    title: &str,
    program: Option<&str>,
    budget: Option<i64>,
    anchor: Option<&str>,
) -> Result<()> {
    if let Err(e) = validate_non_empty(title, "Title") {
        user_error(&e);
    }
    if let Some(amount) = budget {
        if let Err(e) = validate_budget(amount) {
            user_error(&e);
        }
    }

    let ty = match ProcurementTypeRepo::resolve(conn, type_ref)? {
        Some(ty) => ty,
        None => user_error(&format!("Procurement type '{}' not found", type_ref)),
    };
    let type_id = ty.id.unwrap_or(0);
    let program_id = match program {
        Some(slug) => match ProgramRepo::get_by_slug(conn, slug)? {
            Some(p) => p.id,
            None => user_error(&format!("Program '{}' not found", slug)),
        },
        None => None,
    };
    let anchor = match anchor {
        Some(expr) => parse_date("anchor date", expr)?,
        None => today(),
    };
    let templates = ProcurementTypeRepo::get_stages(conn, type_id)?;

    // The instance row and its schedule commit together
    let tx = conn.unchecked_transaction()?;
    let instance = InstanceRepo::create(&tx, type_id, program_id, title.trim(), budget, anchor)?;
    let instance_id = instance.id.unwrap_or(0);
    let rows = create_schedule(&mut SqliteLedger::new(&tx), instance_id, &templates, anchor)?;
    tx.commit().context("Failed to commit procurement")?;

    log::info!("Created procurement {} ({}) with {} stages", instance_id, instance.uuid, rows.len());
    println!(
        "Created procurement {}: {} ({}, {} stages, first stage starts {})",
        instance_id,
        instance.title,
        ty.name,
        rows.len(),
        format_date(rows.first().and_then(|r| r.planned_start))
    );
    Ok(())
}

fn handle_list(conn: &Connection, program: Option<&str>, json: bool) -> Result<()> {
    let program_id = match program {
        Some(slug) => match ProgramRepo::get_by_slug(conn, slug)? {
            Some(p) => p.id,
            None => user_error(&format!("Program '{}' not found", slug)),
        },
        None => None,
    };

    let instances = InstanceRepo::list(conn, program_id).context("Failed to list procurements")?;
    let mut summaries = Vec::with_capacity(instances.len());
    for instance in instances {
        summaries.push(summarize(conn, instance)?);
    }

    if json {
        let json_list: Vec<serde_json::Value> = summaries.iter().map(instance_json).collect();
        println!("{}", serde_json::to_string_pretty(&json_list)?);
    } else {
        print!("{}", format_instance_list(&summaries));
        if summaries.is_empty() {
            println!();
        }
    }
    Ok(())
}

fn handle_show(conn: &Connection, instance: &str, json: bool) -> Result<()> {
    let instance = load_instance(conn, instance)?;
    let summary = summarize(conn, instance)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&instance_json(&summary))?);
    } else {
        print!("{}", format_instance_detail(&summary));
    }
    Ok(())
}

fn handle_plan(conn: &Connection, instance: &str, sequence: u32, start: Option<&str>, end: Option<&str>) -> Result<()> {
    let instance_id = resolve_instance_id(conn, instance)?;
    let sequence = checked_sequence(sequence);
    let start = parse_optional_date("planned start", start)?;
    let end = parse_optional_date("planned end", end)?;

    let progress = set_planned_dates(&mut SqliteLedger::new(conn), instance_id, sequence, start, end)?;
    if start.is_none() && end.is_none() {
        println!("No planned dates given; stage {} of procurement {} unchanged.", sequence, instance_id);
    } else {
        println!(
            "Planned stage {} of procurement {}: {} to {}",
            sequence,
            instance_id,
            format_date(progress.planned_start),
            format_date(progress.planned_end)
        );
    }
    Ok(())
}

fn handle_update(
    conn: &Connection,
    instance: &str,
    sequence: u32,
    actual_start: Option<&str>,
    actual_end: Option<&str>,
    note: Option<String>,
) -> Result<()> {
    let instance_id = resolve_instance_id(conn, instance)?;
    let sequence = checked_sequence(sequence);
    let update = StageUpdate {
        actual_start: parse_optional_date("actual start", actual_start)?,
        actual_end: parse_optional_date("actual end", actual_end)?,
        note,
    };

    if update.is_empty() {
        println!("Nothing to update for stage {} of procurement {}.", sequence, instance_id);
        return Ok(());
    }
    let completed = update.actual_end.is_some();
    let stages = update_stage(&mut SqliteLedger::new(conn), instance_id, sequence, update)?;
    report_stage_change(instance_id, sequence, completed, &stages);
    Ok(())
}

fn handle_done(conn: &Connection, instance: &str, sequence: u32, date: Option<&str>) -> Result<()> {
    let instance_id = resolve_instance_id(conn, instance)?;
    let sequence = checked_sequence(sequence);
    let actual_end = match date {
        Some(expr) => parse_date("actual end", expr)?,
        None => today(),
    };

    let update = StageUpdate {
        actual_end: Some(actual_end),
        ..StageUpdate::default()
    };
    let stages = update_stage(&mut SqliteLedger::new(conn), instance_id, sequence, update)?;
    report_stage_change(instance_id, sequence, true, &stages);
    Ok(())
}

fn report_stage_change(instance_id: i64, sequence: u32, completed: bool, stages: &[StageEntry]) {
    if completed {
        println!("Completed stage {} of procurement {}", sequence, instance_id);
    } else {
        println!("Updated stage {} of procurement {}", sequence, instance_id);
    }
    if let Some(next) = stages.iter().find(|e| e.sequence() == sequence + 1) {
        if completed {
            println!(
                "Next: stage {} {} planned {} to {}",
                next.sequence(),
                next.template.name,
                format_date(next.progress.planned_start),
                format_date(next.progress.planned_end)
            );
        }
    }
    println!("Progress: {}", format_percent(percent_complete(stages)));
}

fn checked_sequence(sequence: u32) -> u32 {
    match validate_sequence(sequence) {
        Ok(sequence) => sequence,
        Err(e) => user_error(&e),
    }
}

fn load_instance(conn: &Connection, id_str: &str) -> Result<ProcurementInstance> {
    let instance_id = match validate_instance_id(id_str) {
        Ok(id) => id,
        Err(e) => user_error(&e),
    };
    match InstanceRepo::get_by_id(conn, instance_id)? {
        Some(instance) => Ok(instance),
        None => user_error(&format!("Procurement {} not found", instance_id)),
    }
}

fn resolve_instance_id(conn: &Connection, id_str: &str) -> Result<i64> {
    Ok(load_instance(conn, id_str)?.id.unwrap_or(0))
}

fn summarize(conn: &Connection, instance: ProcurementInstance) -> Result<InstanceSummary> {
    let instance_id = instance.id.unwrap_or(0);
    let type_name = ProcurementTypeRepo::get_by_id(conn, instance.type_id)?
        .map(|t| t.name)
        .unwrap_or_else(|| format!("[{}]", instance.type_id));
    let program = match instance.program_id {
        Some(id) => ProgramRepo::get_by_id(conn, id)?,
        None => None,
    };
    let report = instance_report(&SqliteLedger::new(conn), instance_id)?;

    Ok(InstanceSummary {
        instance,
        type_name,
        program,
        report,
    })
}
