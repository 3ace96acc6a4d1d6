//! CLI definition using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parkit_types::{OutputFormat, ParkingType};

#[derive(Parser)]
#[command(name = "parkit")]
#[command(version)]
#[command(about = "Parking lot entry/exit tracking with time-based fares")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ~/.config/parkit/config.json
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the spot and ticket stores. Uses config value if not specified.
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register an incoming vehicle and print its ticket
    Enter {
        /// Vehicle type; asked interactively if omitted
        #[arg(long = "type", short = 't', value_enum)]
        parking_type: Option<ParkingType>,

        /// Vehicle registration number; asked interactively if omitted
        #[arg(long, short = 'p')]
        plate: Option<String>,
    },

    /// Register an exiting vehicle and print the fare
    Exit {
        /// Vehicle registration number; asked interactively if omitted
        #[arg(long, short = 'p')]
        plate: Option<String>,
    },

    /// Show which spot the next vehicle of a type would get
    Peek {
        /// Vehicle type; asked interactively if omitted
        #[arg(long = "type", short = 't', value_enum)]
        parking_type: Option<ParkingType>,
    },

    /// Show occupancy of every spot
    Status,

    /// Show ticket history
    History {
        /// Only tickets of this vehicle
        #[arg(long, short = 'p')]
        plate: Option<String>,

        /// Only vehicles still parked
        #[arg(long)]
        open: bool,

        /// Limit number of entries shown
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Export all tickets to CSV
    Export {
        /// Output CSV file path
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Create the spot store from a layout
    Init {
        /// Layout TOML file. Uses config value or the built-in layout if not specified.
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Replace an existing spot store
        #[arg(long)]
        force: bool,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set the free parking window in minutes
        #[arg(long)]
        set_free_minutes: Option<f64>,

        /// Set the recurring-customer fare multiplier (e.g. 0.95)
        #[arg(long)]
        set_discount_rate: Option<f64>,

        /// Set an hourly rate, e.g. car=1.5 (repeatable)
        #[arg(long)]
        set_rate: Vec<String>,

        /// Set the store directory
        #[arg(long)]
        set_store_dir: Option<PathBuf>,

        /// Set the layout TOML file
        #[arg(long)]
        set_layout: Option<PathBuf>,

        /// Set the default output format
        #[arg(long)]
        set_format: Option<OutputFormat>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },

    /// Interactive menu for the gate attendant
    Shell,
}
