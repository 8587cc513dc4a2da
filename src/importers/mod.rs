// Import module - positions CSV parser

pub mod positions_csv;

pub use positions_csv::{parse_positions, parse_positions_csv};
