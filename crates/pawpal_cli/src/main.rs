use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use pawpal_cli::cli::{
    Cli, Command, OwnerCommand, PetCommand, TaskCommand, collect_overrides, expand_alias,
    scan_config_overrides, split_command_line,
};
use pawpal_cli::render;
use pawpal_core::care_api::{self, NewPet, NewTask, PlanQuery};
use pawpal_core::config::{Config, load_config_with_fallback, merge_overrides};
use pawpal_core::error::AppError;
use pawpal_core::model::TaskStatus;
use pawpal_core::recurrence::Recurrence;
use pawpal_core::timestamp::{format_due_at, parse_date, parse_due_at};
use std::io::{self, BufRead};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "PAWPAL_LOG";
const PROGRAM_NAME: &str = "pawpal";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn base_config() -> Config {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error {
        warn!(error = %err, "using default configuration");
    }
    loaded.config
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::validation(message)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

/// Applies per-invocation overrides and alias expansion ahead of clap.
fn prepare(args: Vec<String>, base: &Config) -> Result<(Vec<String>, Config), AppError> {
    let overrides =
        collect_overrides(&scan_config_overrides(&args)).map_err(AppError::validation)?;
    let config = merge_overrides(base, &overrides);
    let expanded = expand_alias(args, &config.aliases).map_err(AppError::validation)?;
    Ok((expanded, config))
}

fn execute(args: Vec<String>, base: &Config) -> Result<(), AppError> {
    let (args, config) = prepare(args, base)?;
    debug!(?args, "running command");

    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push(PROGRAM_NAME.to_string());
    argv.extend(args);

    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(normalize_parse_error(err)),
    };

    run_command(cli, &config)
}

fn optional_date(raw: Option<&str>) -> Result<Option<time::Date>, AppError> {
    raw.map(parse_date).transpose()
}

fn run_command(cli: Cli, config: &Config) -> Result<(), AppError> {
    let json = cli.json;
    match cli.command {
        Command::Owner { command } => match command {
            OwnerCommand::Add { name } => {
                let owner = care_api::add_owner(&name)?;
                if json {
                    println!("{}", serde_json::json!({ "name": owner.name, "pets": [] }));
                } else {
                    println!("Added owner: {}", owner.name);
                }
            }
            OwnerCommand::Remove { name } => {
                let owner = care_api::remove_owner(&name)?;
                if json {
                    render::print_owners(std::slice::from_ref(&owner), true);
                } else {
                    println!("Removed owner: {} ({} pets)", owner.name, owner.pets.len());
                }
            }
            OwnerCommand::List => {
                render::print_owners(&care_api::list_owners()?, json);
            }
        },
        Command::Pet { command } => match command {
            PetCommand::Add {
                owner,
                name,
                species,
                age,
                notes,
            } => {
                let pet = care_api::add_pet(
                    &owner,
                    &NewPet {
                        name,
                        species,
                        age,
                        notes,
                    },
                )?;
                if json {
                    println!("{}", render::pet_json(&pet));
                } else {
                    println!("Added pet: {} ({}) for {}", pet.name, pet.species, owner.trim());
                }
            }
            PetCommand::Remove { owner, name } => {
                let pet = care_api::remove_pet(&owner, &name)?;
                if json {
                    println!("{}", render::pet_json(&pet));
                } else {
                    println!("Removed pet: {} ({} tasks)", pet.name, pet.tasks.len());
                }
            }
            PetCommand::List { owner } => {
                render::print_pets(&care_api::list_pets(&owner)?, json);
            }
        },
        Command::Task { command } => match command {
            TaskCommand::Add {
                owner,
                pet,
                title,
                at,
                priority,
                repeat,
            } => {
                let new_task = NewTask {
                    title,
                    due_at: parse_due_at(&at)?,
                    priority: priority.unwrap_or_else(|| config.default_priority().value()),
                    recurrence: repeat.parse::<Recurrence>()?,
                };
                let task = care_api::add_task(&owner, &pet, &new_task)?;
                if json {
                    render::print_task_json(&task);
                } else {
                    println!(
                        "Scheduled task: {} ({}) at {}",
                        task.title,
                        task.id,
                        format_due_at(task.due_at)
                    );
                }
            }
            TaskCommand::Remove { id } => {
                let task = care_api::remove_task(&id)?;
                if json {
                    render::print_task_json(&task);
                } else {
                    println!("Removed task: {} ({})", task.title, task.id);
                }
            }
        },
        Command::Show { id } => {
            let task = care_api::get_task(&id)?;
            if json {
                render::print_task_json(&task);
            } else {
                render::print_task_plain(&task);
            }
        }
        Command::Done { id } => {
            let completion = care_api::complete_task(&id)?;
            render::print_completion(&completion, json);
        }
        Command::Plan {
            date,
            status,
            owner,
            pet,
        } => {
            let query = PlanQuery {
                date: optional_date(date.as_deref())?,
                status: status
                    .as_deref()
                    .map(str::parse::<TaskStatus>)
                    .transpose()?,
                pet: owner.zip(pet),
            };
            let result = care_api::daily_plan(&query)?;
            render::print_plan(&result, &config.palette(), json);
        }
        Command::Conflicts { date } => {
            let query = PlanQuery {
                date: optional_date(date.as_deref())?,
                ..PlanQuery::default()
            };
            let result = care_api::daily_plan(&query)?;
            render::print_conflicts(&result, &config.palette(), json);
        }
    }

    Ok(())
}

fn run_interactive(base: &Config) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(message) => {
                eprintln!("ERROR: {}", AppError::validation(message));
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        if let Err(err) = execute(args, base) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    init_logging();
    let base = base_config();
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        if let Err(err) = run_interactive(&base) {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    if let Err(err) = execute(args, &base) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
