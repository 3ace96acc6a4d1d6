//! CSV export of ticket history

use std::io::Write;
use std::path::Path;

use parkit_domain::Ticket;
use parkit_types::Result;

const HEADERS: [&str; 8] = [
    "ticket_id",
    "vehicle_reg_number",
    "spot",
    "parking_type",
    "in_time",
    "out_time",
    "price",
    "recurring_customer",
];

/// Write tickets to a CSV file at `output_path`
pub fn export_tickets_to_csv(tickets: &[Ticket], output_path: &Path) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    write_tickets_csv(tickets, file)
}

/// Write tickets as CSV, one row per ticket, open tickets with an empty out_time
pub fn write_tickets_csv<W: Write>(tickets: &[Ticket], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADERS)?;
    for ticket in tickets {
        csv_writer.write_record([
            ticket.id.to_string(),
            ticket.vehicle_reg_number.clone(),
            ticket.parking_spot.id.to_string(),
            ticket.parking_spot.parking_type.to_string(),
            ticket.in_time.map(|t| t.to_rfc3339()).unwrap_or_default(),
            ticket.out_time.map(|t| t.to_rfc3339()).unwrap_or_default(),
            format!("{:.2}", ticket.price),
            ticket.recurring_customer.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}
