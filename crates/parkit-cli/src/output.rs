//! Output formatting module

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use parkit_app::app::ExitReceipt;
use parkit_domain::{ParkingSpot, Ticket};
use parkit_types::{OutputFormat, Result};

/// One row of the occupancy table
#[derive(Debug, Clone, Serialize)]
pub struct SpotStatus {
    pub spot: ParkingSpot,
    pub vehicle_reg_number: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn local_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Render a duration in hours as "2h 05m"
pub fn format_hours(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round().max(0.0) as u64;
    format!("{}h {:02}m", total_minutes / 60, total_minutes % 60)
}

pub fn output_ticket(output_format: OutputFormat, ticket: &Ticket) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(ticket);
    }

    println!("Generated ticket #{}", ticket.id);
    println!(
        "Please park your vehicle in spot number: {} ({})",
        ticket.parking_spot.id, ticket.parking_spot.parking_type
    );
    println!(
        "Recorded in-time for vehicle number: {} is: {}",
        ticket.vehicle_reg_number,
        local_time(ticket.in_time)
    );
    if ticket.recurring_customer {
        println!("Welcome back! As a recurring user you will get a discount on your fare.");
    }
    Ok(())
}

pub fn output_receipt(output_format: OutputFormat, receipt: &ExitReceipt) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(receipt);
    }

    let ticket = &receipt.ticket;
    if !receipt.ticket_persisted {
        println!("Unable to update ticket information. Spot {} stays occupied.", ticket.parking_spot.id);
        return Ok(());
    }

    println!("Please pay the parking fare: {:.2}", ticket.price);
    if let Some(hours) = ticket.duration_hours() {
        println!("Parked for:      {}", format_hours(hours));
    }
    if receipt.discounted {
        println!("Recurring customer discount applied.");
    }
    println!(
        "Recorded out-time for vehicle number: {} is: {}",
        ticket.vehicle_reg_number,
        local_time(ticket.out_time)
    );
    if !receipt.spot_released {
        println!("Warning: spot {} could not be marked available.", ticket.parking_spot.id);
    }
    Ok(())
}

pub fn output_spot_preview(output_format: OutputFormat, spot: &ParkingSpot) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(spot);
    }

    println!("Next available {} spot: {}", spot.parking_type, spot.id);
    Ok(())
}

pub fn output_status(output_format: OutputFormat, rows: &[SpotStatus]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(rows);
    }

    println!("{:<6} {:<6} {:<10} {:<16} {}", "Spot", "Type", "Status", "Vehicle", "Since");
    println!("{}", "-".repeat(60));
    for row in rows {
        let status = if row.spot.available { "free" } else { "occupied" };
        println!(
            "{:<6} {:<6} {:<10} {:<16} {}",
            row.spot.id,
            row.spot.parking_type,
            status,
            row.vehicle_reg_number.as_deref().unwrap_or("-"),
            local_time(row.since)
        );
    }
    let free = rows.iter().filter(|r| r.spot.available).count();
    println!("\n{} of {} spots free", free, rows.len());
    Ok(())
}

pub fn output_history(output_format: OutputFormat, tickets: &[Ticket]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(tickets);
    }

    if tickets.is_empty() {
        println!("No tickets found.");
        return Ok(());
    }

    println!(
        "{:<6} {:<14} {:<5} {:<19} {:<19} {:>8} {}",
        "Ticket", "Vehicle", "Spot", "In", "Out", "Price", "Duration"
    );
    println!("{}", "-".repeat(85));
    for ticket in tickets {
        let duration = ticket
            .duration_hours()
            .map(format_hours)
            .unwrap_or_else(|| "parked".to_string());
        println!(
            "{:<6} {:<14} {:<5} {:<19} {:<19} {:>8.2} {}",
            ticket.id,
            ticket.vehicle_reg_number,
            ticket.parking_spot.id,
            local_time(ticket.in_time),
            local_time(ticket.out_time),
            ticket.price,
            duration
        );
    }
    Ok(())
}
