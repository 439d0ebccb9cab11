//! Reading geodata produced by external map services.

pub mod overpass;

pub use overpass::{OverpassResponse, parse_overpass, read_overpass};
