//! `coords`: show the keypad strings for a position.

use clap::Args;
use jetload::coord::{render_position, LatLon};
use jetload::sequencer::entry_formats;
use jetload::vehicle::VehicleKind;

use crate::error::CliError;

#[derive(Debug, Args)]
#[command(allow_negative_numbers = true)]
pub struct CoordsArgs {
    /// Latitude in decimal degrees (negative is south)
    pub lat: f64,

    /// Longitude in decimal degrees (negative is west)
    pub lon: f64,

    /// Vehicle whose entry grammar to use
    #[arg(long)]
    pub vehicle: VehicleKind,
}

pub fn run(args: CoordsArgs) -> Result<(), CliError> {
    let position = LatLon::new(args.lat, args.lon)?;

    println!("{} ({})", args.vehicle.display_name(), position);
    for (label, format) in entry_formats(args.vehicle) {
        let (lat, lon) = render_position(&format, &position);
        println!(
            "  {:<8}  {} {}  {} {}",
            label,
            position.lat_hemisphere().letter(),
            lat,
            position.lon_hemisphere().letter(),
            lon
        );
    }
    Ok(())
}
