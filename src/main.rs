use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::path::Path;
use terrace_sun::io::read_overpass;
use terrace_sun::{ExposureConfig, Origin, SunSession};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage: terrace-sun <overpass.json> <lat> <lon> [rfc3339-time] [config.json]";

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "terrace_sun=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        return Err(anyhow!(USAGE));
    }
    let lat: f64 = args[2].parse().with_context(|| format!("Invalid latitude: {}", args[2]))?;
    let lon: f64 = args[3].parse().with_context(|| format!("Invalid longitude: {}", args[3]))?;
    let now = match args.get(4) {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("Invalid time: {s}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };
    let config = match args.get(5) {
        Some(path) => ExposureConfig::from_file(Path::new(path))?,
        None => ExposureConfig::default(),
    };

    let origin = Origin::new(lat, lon);
    let response = read_overpass(Path::new(&args[1]))?;
    let mut session = SunSession::new(origin, config)?;
    let (solids, venues) = session.load_overpass(&response);
    tracing::info!("Loaded {solids} buildings and {venues} venues around {}", origin.geo());

    session.refresh(now);
    let sun = session.sun_position(now);
    let day = session.day_times(now);

    let venues: Vec<_> = session
        .venues()
        .sorted_by(origin.geo())
        .into_iter()
        .map(|v| {
            json!({
                "id": v.id,
                "name": v.name,
                "lat": v.position.lat,
                "lon": v.position.lon,
                "distance_m": origin.geo().distance_m(&v.position).round(),
                "address": v.address(),
                "sun": v.state,
            })
        })
        .collect();

    let out = json!({
        "time": now,
        "origin": origin.geo(),
        "sun": {
            "altitude_deg": sun.altitude.to_degrees(),
            "azimuth_deg": sun.azimuth.to_degrees(),
        },
        "day_times": day,
        "venues": venues,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
