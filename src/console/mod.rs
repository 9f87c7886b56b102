use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use crate::cost::{format_cost, format_distance_km};
use crate::directions::DirectionsProvider;
use crate::error::LedgerError;
use crate::location::LocationPublisher;
use crate::models::TripRecord;
use crate::session::{Resolution, Session};
use crate::snapshot::SnapshotRenderer;

pub mod command;

use command::{Command, HELP};

/// Drives a session from stdin until `quit` or end of input.
///
/// Route results are applied as they arrive, between commands.
pub async fn run<D, R>(mut session: Session<D, R>, publisher: LocationPublisher) -> anyhow::Result<()>
where
    D: DirectionsProvider,
    R: SnapshotRenderer,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = execute(&mut session, &publisher, command).await {
                            if matches!(e, LedgerError::Storage(_)) {
                                error!("Storage failure: {}", e);
                            }
                            println!("Error: {}", e);
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
            Some(event) = session.next_event() => {
                match session.apply(event) {
                    Resolution::Resolved => print_status(&session),
                    Resolution::Unavailable => println!("No route found between the selected points"),
                    Resolution::Stale => {}
                }
            }
        }
    }

    info!("Session closed");
    Ok(())
}

async fn execute<D, R>(
    session: &mut Session<D, R>,
    publisher: &LocationPublisher,
    command: Command,
) -> Result<(), LedgerError>
where
    D: DirectionsProvider,
    R: SnapshotRenderer,
{
    match command {
        Command::Tap(coord) => {
            session.tap(coord);
            print_selection(session);
        }
        Command::Locate(coord) => {
            publisher.publish(coord);
            println!("Location updated to {}", coord);
        }
        Command::Here => {
            let coord = session.use_current_location()?;
            println!("Using current location {}", coord);
            print_selection(session);
        }
        Command::RateUp => {
            session.increment_rate();
            print_rate(session);
        }
        Command::RateDown => {
            session.decrement_rate();
            print_rate(session);
        }
        Command::RateSet(value) => {
            session.set_rate(value)?;
            print_rate(session);
        }
        Command::Traffic(on) => {
            session.set_traffic(on);
            println!("Traffic overlay {}", if on { "on" } else { "off" });
        }
        Command::Save => {
            println!("Capturing...");
            let trip_id = session.save().await?;
            println!("Saved trip {}", trip_id);
        }
        Command::List => {
            let trips = session.history().await?;
            if trips.is_empty() {
                println!("No saved trips yet");
            }
            for trip in &trips {
                println!("{}", describe_trip(trip));
            }
        }
        Command::Delete(ids) => {
            let removed = session.delete(&ids).await?;
            println!("Deleted {} trip(s)", removed);
        }
        Command::Recall(trip_id) => {
            let trip = session.recall(trip_id).await?;
            println!("Loaded '{}', resolving route...", trip.name);
        }
        Command::Export(trip_id, path) => {
            let image = session.snapshot(trip_id).await?;
            tokio::fs::write(&path, &image).await?;
            println!("Wrote {} bytes to {}", image.len(), path.display());
        }
        Command::Go => session.start_navigation()?,
        Command::Reset => {
            session.reset();
            println!("Selection cleared");
        }
        Command::Status => print_status(session),
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }

    Ok(())
}

fn describe_trip(trip: &TripRecord) -> String {
    format!(
        "{}  {}  {:<24} {:>9}  {:>9}{}",
        trip.id,
        trip.created_at.format("%Y-%m-%d %H:%M"),
        trip.name,
        format_cost(trip.total_cost),
        format_distance_km(trip.distance_meters),
        if trip.has_snapshot { "  [map]" } else { "" }
    )
}

fn print_selection<D, R>(session: &Session<D, R>)
where
    D: DirectionsProvider,
    R: SnapshotRenderer,
{
    let state = session.state();
    match state.selection().points() {
        [origin] => println!("Origin {}", origin),
        [_, destination] => println!("Destination {}, resolving route...", destination),
        _ => {}
    }
}

fn print_rate<D, R>(session: &Session<D, R>)
where
    D: DirectionsProvider,
    R: SnapshotRenderer,
{
    let rate = session.state().rate().per_km();
    match session.current_cost() {
        Some(cost) => println!("Rate {}/km, total {}", format_cost(rate), format_cost(cost)),
        None => println!("Rate {}/km", format_cost(rate)),
    }
}

fn print_status<D, R>(session: &Session<D, R>)
where
    D: DirectionsProvider,
    R: SnapshotRenderer,
{
    let state = session.state();
    if state.selection().is_empty() {
        println!("No points selected");
    }
    for (i, point) in state.selection().points().iter().enumerate() {
        println!("{} {}", if i == 0 { "Origin     " } else { "Destination" }, point);
    }

    if let (Some(route), Some(cost)) = (state.route(), session.current_cost()) {
        println!(
            "TOTAL {}  {}{}",
            format_cost(cost),
            format_distance_km(route.distance_meters),
            if route.has_tolls { "  (tolls)" } else { "" }
        );
    } else if state.is_loading() {
        println!("Resolving route...");
    }

    println!(
        "Rate {}/km, traffic {}",
        format_cost(state.rate().per_km()),
        if state.show_traffic() { "on" } else { "off" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;
    use chrono::DateTime;
    use uuid::Uuid;

    #[test]
    fn test_describe_trip() {
        let trip = TripRecord {
            id: Uuid::nil(),
            name: "A-6".to_string(),
            created_at: DateTime::from_timestamp(1_760_000_000, 0).unwrap(),
            rate_per_km: 0.28,
            distance_meters: 15_000.0,
            total_cost: 4.2,
            origin: Coordinate::new(40.0, -3.0),
            destination: Coordinate::new(40.1, -3.1),
            has_snapshot: true,
        };

        let line = describe_trip(&trip);
        assert!(line.starts_with("00000000-0000-0000-0000-000000000000  2025-10-09"));
        assert!(line.contains("4.20€"));
        assert!(line.contains("15.0 km"));
        assert!(line.ends_with("[map]"));
    }
}
