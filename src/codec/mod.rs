//! CPUMonitorJr - Frame codec
//!
//! Pure functions that turn host telemetry into the binary frames understood
//! by the display firmware:
//!
//! - **Time frame** (`0x00`): calendar date, weekday and wall clock
//! - **Identity frame** (`0x01`): `host;lan;external;` as ASCII
//! - **Stats frame** (`0x02`): memory, temperatures and per-core utilisation
//!
//! Every percentage and temperature goes through [`pack_decimal`], which
//! produces the `(whole, tenths)` byte pair the device reassembles as
//! `whole + tenths / 10`.

mod frame;
mod packing;

pub use frame::*;
pub use packing::{pack_decimal, round_half_away_from_zero_1dp, round_percent};
