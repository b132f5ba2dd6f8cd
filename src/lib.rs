pub mod address;
pub mod aggregate;
pub mod args;
pub mod config;
pub mod contact;
pub mod marker;
pub mod sqlite;
pub mod stats;
pub mod territory;
pub mod utils;

pub use address::{parse, AddressParts};
pub use aggregate::{aggregate, aggregate_with, unplaced_contacts, AddressGroup, GroupingPolicy};
pub use args::Args;
pub use config::Config;
pub use contact::{ContactRecord, Coordinate, Customer, Prospect};
pub use marker::{color_for, ContactList, Marker, MarkerColor};
pub use stats::{AnalysisResult, TerritoryStats};
pub use territory::analyze_territory;
