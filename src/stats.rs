use std::collections::HashMap;

use crate::marker::{color_for, Marker, MarkerColor};

#[derive(Debug)]
pub struct TerritoryStats {
    pub markers: Vec<Marker>,
    pub color_counts: HashMap<MarkerColor, u32>,
    pub multi_unit_markers: u32,
    pub contacts_loaded: u32,
    pub contacts_unplaced: u32,
    pub total_knocks: u32,
}

impl TerritoryStats {
    pub fn from_markers(markers: Vec<Marker>, contacts_loaded: u32, contacts_unplaced: u32) -> Self {
        let mut color_counts = HashMap::new();
        let mut multi_unit_markers = 0;
        let mut total_knocks = 0u32;

        for marker in &markers {
            *color_counts.entry(color_for(marker)).or_insert(0) += 1;
            if marker.is_multi_unit {
                multi_unit_markers += 1;
            }
            total_knocks = total_knocks.saturating_add(marker.total_knocks);
        }

        Self {
            markers,
            color_counts,
            multi_unit_markers,
            contacts_loaded,
            contacts_unplaced,
            total_knocks,
        }
    }

    pub fn color_count(&self, color: MarkerColor) -> u32 {
        self.color_counts.get(&color).copied().unwrap_or(0)
    }
}

#[derive(Debug)]
pub struct AnalysisResult {
    pub date_range: (String, String, i64),
    pub stats: TerritoryStats,
}
