//! Command handlers

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::{Cli, Commands};
use crate::output::{
    output_history, output_receipt, output_spot_preview, output_status, output_ticket, SpotStatus,
};
use crate::shell;
use parkit_app::app::{self, ParkingService};
use parkit_app::config::Config;
use parkit_app::repository::{
    load_layout, open_spot_repo, open_spot_repo_at, open_store_lock, open_ticket_repo,
};
use parkit_domain::service::FareCalculator;
use parkit_domain::{InputReader, ParkingSpotRepository, StoreLock, TicketRepository};
use parkit_infra::console_input::{ConsoleInputReader, PresetInput};
use parkit_infra::layout_loader::FacilityLayout;
use parkit_infra::persistence::{FileParkingSpotRepository, FileStoreLock, FileTicketRepository};
use parkit_infra::ticket_export::export_tickets_to_csv;
use parkit_types::{ConfigError, Error, OutputFormat, ParkingType, Result};

/// Opened stores plus the fare rules from config
pub struct Facility {
    pub spots: Arc<FileParkingSpotRepository>,
    pub tickets: Arc<FileTicketRepository>,
    store_lock: Arc<FileStoreLock>,
    fare_calculator: FareCalculator,
}

impl Facility {
    pub fn open(config: &Config) -> Result<Self> {
        Ok(Self {
            spots: Arc::new(open_spot_repo(config)?),
            tickets: Arc::new(open_ticket_repo(config)?),
            store_lock: Arc::new(open_store_lock(config)?),
            fare_calculator: FareCalculator::new(config.fare.clone()),
        })
    }

    /// Parking service reading its answers from `input`
    pub fn service(&self, input: Arc<dyn InputReader>) -> ParkingService {
        ParkingService::new(input, self.spots.clone(), self.tickets.clone())
            .with_store_lock(self.store_lock.clone())
            .with_fare_calculator(self.fare_calculator.clone())
    }
}

/// Console reader that stays quiet when stdout carries JSON
pub fn console(output_format: OutputFormat) -> ConsoleInputReader<std::io::BufReader<std::io::Stdin>> {
    ConsoleInputReader::stdin(output_format == OutputFormat::Table)
}

pub fn execute(cli: Cli) -> Result<()> {
    let Cli {
        command,
        config: config_file,
        store_dir,
        format,
        ..
    } = cli;

    let config_path = match config_file {
        Some(path) => path,
        None => Config::config_path()?,
    };

    // Load config and apply CLI overrides; the config command edits the stored file instead
    let load = |config_path: &Path| -> Result<(Config, OutputFormat)> {
        let mut config = Config::load_from(config_path)?;
        if let Some(dir) = store_dir {
            config.store_dir = Some(dir);
        }
        let output_format = format.unwrap_or(config.output_format);
        debug!(config = %config_path.display(), format = %output_format, "loaded configuration");
        Ok((config, output_format))
    };

    match command {
        Commands::Enter {
            parking_type,
            plate,
        } => {
            let (config, output_format) = load(&config_path)?;
            cmd_enter(&config, output_format, parking_type, plate)
        }

        Commands::Exit { plate } => {
            let (config, output_format) = load(&config_path)?;
            cmd_exit(&config, output_format, plate)
        }

        Commands::Peek { parking_type } => {
            let (config, output_format) = load(&config_path)?;
            cmd_peek(&config, output_format, parking_type)
        }

        Commands::Status => {
            let (config, output_format) = load(&config_path)?;
            cmd_status(&config, output_format)
        }

        Commands::History { plate, open, limit } => {
            let (config, output_format) = load(&config_path)?;
            cmd_history(&config, output_format, plate, open, limit)
        }

        Commands::Export { output } => {
            let (config, _) = load(&config_path)?;
            cmd_export(&config, &output)
        }

        Commands::Init { layout, force } => {
            let (config, _) = load(&config_path)?;
            cmd_init(&config, layout, force)
        }

        Commands::Shell => {
            let (config, output_format) = load(&config_path)?;
            let facility = Facility::open(&config)?;
            shell::run(&facility, output_format)
        }

        Commands::Config {
            show,
            set_free_minutes,
            set_discount_rate,
            set_rate,
            set_store_dir,
            set_layout,
            set_format,
            reset,
        } => cmd_config(
            &config_path,
            ConfigUpdate {
                show,
                free_minutes: set_free_minutes,
                discount_rate: set_discount_rate,
                rates: set_rate,
                store_dir: set_store_dir,
                layout: set_layout,
                output_format: set_format,
                reset,
            },
        ),
    }
}

fn cmd_enter(
    config: &Config,
    output_format: OutputFormat,
    parking_type: Option<ParkingType>,
    plate: Option<String>,
) -> Result<()> {
    let facility = Facility::open(config)?;
    let input = PresetInput::new(
        parking_type.map(ParkingType::selection_code),
        plate,
        console(output_format),
    );
    let ticket = facility.service(Arc::new(input)).process_incoming_vehicle()?;
    output_ticket(output_format, &ticket)
}

fn cmd_exit(config: &Config, output_format: OutputFormat, plate: Option<String>) -> Result<()> {
    let facility = Facility::open(config)?;
    let input = PresetInput::new(None, plate, console(output_format));
    let receipt = facility.service(Arc::new(input)).process_exiting_vehicle()?;
    output_receipt(output_format, &receipt)?;

    if !receipt.ticket_persisted {
        eprintln!("Warning: ticket was not saved; the vehicle is still registered as parked");
    }
    Ok(())
}

fn cmd_peek(
    config: &Config,
    output_format: OutputFormat,
    parking_type: Option<ParkingType>,
) -> Result<()> {
    let facility = Facility::open(config)?;
    let input = PresetInput::new(
        parking_type.map(ParkingType::selection_code),
        None,
        console(output_format),
    );
    let spot = facility
        .service(Arc::new(input))
        .get_next_parking_number_if_available()?;
    output_spot_preview(output_format, &spot)
}

fn cmd_status(config: &Config, output_format: OutputFormat) -> Result<()> {
    let facility = Facility::open(config)?;

    let parked: HashMap<u32, _> = facility
        .tickets
        .find_all()?
        .into_iter()
        .filter(|t| t.is_open())
        .map(|t| (t.parking_spot.id, t))
        .collect();

    let rows: Vec<SpotStatus> = facility
        .spots
        .find_all()?
        .into_iter()
        .map(|spot| {
            let ticket = if spot.available { None } else { parked.get(&spot.id) };
            SpotStatus {
                vehicle_reg_number: ticket.map(|t| t.vehicle_reg_number.clone()),
                since: ticket.and_then(|t| t.in_time),
                spot,
            }
        })
        .collect();

    output_status(output_format, &rows)
}

fn cmd_history(
    config: &Config,
    output_format: OutputFormat,
    plate: Option<String>,
    open_only: bool,
    limit: usize,
) -> Result<()> {
    let tickets = open_ticket_repo(config)?;

    let mut entries = match plate {
        Some(plate) => {
            let vehicle = app::parking_service::normalize_vehicle_reg_number(&plate)?;
            tickets.find_by_vehicle(&vehicle)?
        }
        None => tickets.find_all()?,
    };
    if open_only {
        entries.retain(|t| t.is_open());
    }

    // Newest first
    entries.sort_by(|a, b| b.id.cmp(&a.id));
    let total = entries.len();
    entries.truncate(limit);

    output_history(output_format, &entries)?;

    if output_format == OutputFormat::Table && total > limit {
        println!();
        println!("... and {} more tickets", total - limit);
    }
    Ok(())
}

fn cmd_export(config: &Config, output: &Path) -> Result<()> {
    let tickets = open_ticket_repo(config)?.find_all()?;
    export_tickets_to_csv(&tickets, output)?;
    println!("Exported {} tickets to {}", tickets.len(), output.display());
    Ok(())
}

fn cmd_init(config: &Config, layout_path: Option<PathBuf>, force: bool) -> Result<()> {
    let layout = match layout_path {
        Some(ref path) => FacilityLayout::load_from_file(path)?,
        None => load_layout(config)?,
    };
    let store_dir = config.store_dir()?;
    let store_lock = open_store_lock(config)?;

    // No entry or exit may run between the parked check and the reset
    let mut initialized = 0;
    store_lock.exclusive(&mut || {
        let spots = if FileParkingSpotRepository::exists(&store_dir) {
            if !force {
                return Err(ConfigError::Invalid(format!(
                    "a spot store already exists in {}; pass --force to replace it",
                    store_dir.display()
                ))
                .into());
            }

            let parked = open_ticket_repo(config)?
                .find_all()?
                .iter()
                .filter(|t| t.is_open())
                .count();
            if parked > 0 {
                return Err(Error::Persistence(format!(
                    "{} vehicle(s) still parked; process their exits before replacing the layout",
                    parked
                )));
            }

            let spots = FileParkingSpotRepository::open(store_dir.clone())?;
            spots.reset(&layout)?;
            info!(store = %store_dir.display(), spots = layout.len(), "replaced facility layout");
            spots
        } else {
            open_spot_repo_at(store_dir.clone(), &layout)?
        };
        initialized = spots.find_all()?.len();
        Ok(())
    })?;

    println!(
        "Initialized {} spots ({} CAR, {} BIKE) in {}",
        initialized,
        layout.count(ParkingType::Car),
        layout.count(ParkingType::Bike),
        store_dir.display()
    );
    Ok(())
}

struct ConfigUpdate {
    show: bool,
    free_minutes: Option<f64>,
    discount_rate: Option<f64>,
    rates: Vec<String>,
    store_dir: Option<PathBuf>,
    layout: Option<PathBuf>,
    output_format: Option<OutputFormat>,
    reset: bool,
}

/// Parse a "car=1.5" rate assignment
fn parse_rate_arg(arg: &str) -> Result<(ParkingType, f64)> {
    let (name, value) = arg.split_once('=').ok_or_else(|| {
        ConfigError::ParseError(format!("expected TYPE=RATE, got '{}'", arg))
    })?;
    let parking_type: ParkingType = name.parse().map_err(ConfigError::ParseError)?;
    let rate: f64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ParseError(format!("'{}' is not a number", value.trim())))?;
    Ok((parking_type, rate))
}

fn cmd_config(config_path: &Path, update: ConfigUpdate) -> Result<()> {
    if update.reset {
        let config = Config::default();
        config.save_to(config_path)?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load_from(config_path)?;
    let mut modified = false;

    if let Some(minutes) = update.free_minutes {
        config.fare.free_duration_hours = minutes / 60.0;
        modified = true;
    }

    if let Some(discount_rate) = update.discount_rate {
        config.fare.discount_rate = discount_rate;
        modified = true;
    }

    for arg in &update.rates {
        let (parking_type, rate) = parse_rate_arg(arg)?;
        config.fare.rates.insert(parking_type, rate);
        modified = true;
    }

    if let Some(store_dir) = update.store_dir {
        config.store_dir = Some(store_dir);
        modified = true;
    }

    if let Some(layout) = update.layout {
        // Fail early on a layout that could never seed the store
        FacilityLayout::load_from_file(&layout)?;
        config.layout_path = Some(layout);
        modified = true;
    }

    if let Some(output_format) = update.output_format {
        config.output_format = output_format;
        modified = true;
    }

    if modified {
        config.save_to(config_path)?;
        println!("Configuration updated");
    }

    if update.show || !modified {
        println!("{}", config);
    }

    Ok(())
}
