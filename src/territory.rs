use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

use crate::aggregate::{aggregate_with, unplaced_contacts, GroupingPolicy};
use crate::config::Config;
use crate::marker::{color_for, Marker, MarkerColor};
use crate::stats::{AnalysisResult, TerritoryStats};
use crate::utils::{format_number, redact_address};
use crate::{sqlite, Args};

pub fn grouping_policy(args: &Args, config: &Config) -> GroupingPolicy {
    if args.fold_case || config.fold_case {
        GroupingPolicy::FoldCase
    } else {
        GroupingPolicy::Exact
    }
}

pub fn analyze_territory(args: &Args, config: &Config) -> Result<AnalysisResult> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "territory_analysis", "Starting territory analysis");

    let database_path =
        sqlite::resolve_database_path(args.database.as_deref(), config.database.as_deref())?;
    let snapshot = sqlite::copy_database(&database_path, args.temp_path.as_deref())?;

    let outcome = analyze_snapshot(snapshot.path(), grouping_policy(args, config));

    if let Err(e) = snapshot.remove() {
        warn!(action = "cleanup", component = "database_copy", error = %e, "Failed to remove temporary file");
    }

    let result = outcome?;
    info!(
        action = "complete",
        component = "territory_analysis",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Analysis completed successfully"
    );
    Ok(result)
}

fn analyze_snapshot(snapshot_path: &std::path::Path, policy: GroupingPolicy) -> Result<AnalysisResult> {
    let conn = Connection::open(snapshot_path)
        .with_context(|| format!("Failed to open contact store snapshot {:?}", snapshot_path))?;
    info!(action = "connect", component = "database", "Connected to database");

    let date_range = sqlite::get_knock_date_range(&conn)?;
    let contacts = sqlite::load_contacts(&conn)?;
    drop(conn);

    let aggregation_start = Instant::now();
    let markers = aggregate_with(&contacts, policy);
    let unplaced = unplaced_contacts(&contacts, policy);

    info!(
        action = "aggregate",
        component = "marker_aggregation",
        policy = ?policy,
        contact_count = contacts.len(),
        marker_count = markers.len(),
        unplaced_count = unplaced.len(),
        duration_ms = aggregation_start.elapsed().as_millis(),
        "Markers built"
    );
    for contact in &unplaced {
        info!(action = "skip", component = "marker_aggregation", contact_id = contact.id(), address = contact.address(), "Contact has no geocoded address");
    }

    let stats = TerritoryStats::from_markers(
        markers,
        u32::try_from(contacts.len()).unwrap_or(u32::MAX),
        u32::try_from(unplaced.len()).unwrap_or(u32::MAX),
    );
    Ok(AnalysisResult { date_range, stats })
}

/// Most knocks first; ties broken by address so output is stable.
pub fn sorted_markers<'a>(markers: &'a [Marker], args: &Args) -> Vec<&'a Marker> {
    let mut sorted: Vec<&Marker> = markers
        .iter()
        .filter(|marker| args.color.map_or(true, |color| color_for(marker) == color))
        .collect();
    sorted.sort_by(|a, b| {
        b.total_knocks
            .cmp(&a.total_knocks)
            .then_with(|| a.address.cmp(&b.address))
    });
    sorted
}

fn display_address(marker: &Marker, args: &Args) -> String {
    if args.redact {
        redact_address(&marker.address)
    } else {
        marker.address.clone()
    }
}

pub fn format_marker_line(marker: &Marker, args: &Args) -> String {
    let mut line = format!(
        "- {} [{}] {}: {} knocks",
        display_address(marker, args),
        color_for(marker),
        marker.list,
        format_number(marker.total_knocks)
    );
    if marker.is_multi_unit {
        line.push_str(&format!(", {} units", marker.unit_count));
    } else if marker.shows_multi_contact {
        line.push_str(&format!(", {} contacts", marker.contact_count));
    }
    if marker.is_unqualified {
        line.push_str(", unqualified");
    }
    line
}

#[derive(Debug, Serialize)]
struct MarkerView {
    #[serde(flatten)]
    marker: Marker,
    color: MarkerColor,
}

pub fn markers_json(markers: &[Marker], args: &Args) -> Result<String> {
    let views: Vec<MarkerView> = sorted_markers(markers, args)
        .into_iter()
        .map(|marker| MarkerView {
            color: color_for(marker),
            marker: Marker {
                address: display_address(marker, args),
                ..marker.clone()
            },
        })
        .collect();
    Ok(serde_json::to_string_pretty(&views)?)
}

pub fn print_json(result: &AnalysisResult, args: &Args) -> Result<()> {
    println!("{}", markers_json(&result.stats.markers, args)?);
    Ok(())
}

pub fn print_analysis_results(result: &AnalysisResult, args: &Args) {
    let (earliest_date, latest_date, days_between) = &result.date_range;
    let stats = &result.stats;

    println!("\n--- Territory Analysis ---");

    if *days_between > 0 {
        println!(
            "Canvassing range: {} to {} ({} days)",
            earliest_date,
            latest_date,
            format_number(u32::try_from(*days_between).unwrap_or(u32::MAX))
        );
    } else {
        println!("Canvassing range: {} to {}", earliest_date, latest_date);
    }

    println!(
        "Contacts loaded: {}",
        format_number(stats.contacts_loaded)
    );
    println!(
        "Markers placed: {} ({} multi-unit)",
        format_number(u32::try_from(stats.markers.len()).unwrap_or(u32::MAX)),
        format_number(stats.multi_unit_markers)
    );
    println!(
        "Contacts without a geocoded address: {}",
        format_number(stats.contacts_unplaced)
    );
    println!("Total knocks: {}", format_number(stats.total_knocks));

    println!("\nMarkers by color:");
    for color in MarkerColor::ALL {
        println!("- {}: {}", color, format_number(stats.color_count(color)));
    }

    let sorted = sorted_markers(&stats.markers, args);

    if args.top.is_none() && args.bottom.is_none() {
        println!("\nMarkers:");
        for marker in &sorted {
            println!("{}", format_marker_line(marker, args));
        }
        return;
    }

    if let Some(top_count) = args.top {
        println!(
            "\nTop {} most knocked markers:",
            std::cmp::min(top_count, sorted.len())
        );
        for marker in sorted.iter().take(top_count) {
            println!("{}", format_marker_line(marker, args));
        }
    }

    if let Some(bottom_count) = args.bottom {
        println!(
            "\nBottom {} least knocked markers:",
            std::cmp::min(bottom_count, sorted.len())
        );
        for marker in sorted.iter().rev().take(bottom_count) {
            println!("{}", format_marker_line(marker, args));
        }
    }
}
