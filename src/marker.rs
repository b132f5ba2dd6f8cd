use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

use crate::contact::Coordinate;

/// Which list a marker is filed under. Any customer at the address wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ContactList {
    Customers,
    Prospects,
}

impl ContactList {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactList::Customers => "Customers",
            ContactList::Prospects => "Prospects",
        }
    }
}

impl fmt::Display for ContactList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One map pin: every contact sharing a base address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub address: String,
    pub coordinate: Coordinate,
    pub total_knocks: u32,
    pub unit_count: usize,
    pub contact_count: usize,
    pub list: ContactList,
    pub is_unqualified: bool,
    pub is_multi_unit: bool,
    pub shows_multi_contact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Gray,
    Green,
    Yellow,
    Red,
}

impl MarkerColor {
    pub const ALL: [MarkerColor; 4] = [
        MarkerColor::Gray,
        MarkerColor::Green,
        MarkerColor::Yellow,
        MarkerColor::Red,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerColor::Gray => "gray",
            MarkerColor::Green => "green",
            MarkerColor::Yellow => "yellow",
            MarkerColor::Red => "red",
        }
    }
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unqualified addresses are always red; otherwise the color follows the knock count.
pub fn color_for(marker: &Marker) -> MarkerColor {
    if marker.is_unqualified {
        return MarkerColor::Red;
    }

    match marker.total_knocks {
        0 => MarkerColor::Gray,
        1 => MarkerColor::Green,
        2..=4 => MarkerColor::Yellow,
        _ => MarkerColor::Red,
    }
}
