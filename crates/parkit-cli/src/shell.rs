//! Interactive gate attendant menu

use std::io::ErrorKind;
use std::sync::Arc;

use tracing::debug;

use crate::commands::{console, Facility};
use crate::output::{output_receipt, output_ticket};
use parkit_types::{Error, OutputFormat, Result};

const MENU: [&str; 4] = [
    "Please select an option. Simply enter the number to choose an action",
    "1 New Vehicle Entering - Allocate Parking Space",
    "2 Vehicle Exiting - Generate Ticket Price",
    "3 Shutdown System",
];

/// Run the menu loop until the attendant shuts it down or input ends
pub fn run(facility: &Facility, output_format: OutputFormat) -> Result<()> {
    let input = Arc::new(console(output_format));
    let service = facility.service(input.clone());
    let table = output_format == OutputFormat::Table;

    if table {
        println!("Welcome to Parking System!");
    }
    loop {
        if table {
            for line in MENU {
                println!("{}", line);
            }
        }

        let choice = match input.read_line() {
            Ok(choice) => choice,
            Err(Error::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                debug!("input closed, leaving shell");
                break;
            }
            Err(e) => return Err(e),
        };

        match choice.as_str() {
            "1" => report(
                service
                    .process_incoming_vehicle()
                    .and_then(|ticket| output_ticket(output_format, &ticket)),
            ),
            "2" => report(
                service
                    .process_exiting_vehicle()
                    .and_then(|receipt| output_receipt(output_format, &receipt)),
            ),
            "3" => {
                if table {
                    println!("Exiting from the system!");
                }
                break;
            }
            other => eprintln!(
                "Unsupported option '{}'. Please enter a number between 1 and 3",
                other
            ),
        }
    }
    Ok(())
}

/// Failed flows are reported and the menu continues
fn report(result: Result<()>) {
    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }
}
