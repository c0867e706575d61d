//! Terminal rendering of the board.

use chrono::{DateTime, Local, TimeZone, Utc};
use colored::{Color, ColoredString, Colorize};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use tzaharon_core::{tally, Child, Filter, PendingAction, Status, StatusId};
use tzaharon_sync::Session;

#[derive(Tabled)]
struct BoardRow {
    #[tabled(rename = "child")]
    name: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "updated")]
    updated: String,
    #[tabled(rename = "note")]
    note: String,
    #[tabled(rename = "id")]
    id: String,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "status")]
    label: String,
    #[tabled(rename = "color")]
    color: String,
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "id")]
    id: String,
}

#[derive(Serialize)]
struct BoardJson<'a> {
    filter: &'a Filter,
    total: usize,
    children: Vec<&'a Child>,
    counts: Vec<CountJson<'a>>,
}

#[derive(Serialize)]
struct CountJson<'a> {
    id: &'a StatusId,
    label: &'a str,
    count: usize,
}

/// Terminal color for a `bg-<color>-<shade>` class.
pub fn color_for(class: &str) -> Color {
    let name = class
        .strip_prefix("bg-")
        .and_then(|rest| rest.split('-').next())
        .unwrap_or_default();
    match name {
        "slate" | "gray" => Color::BrightBlack,
        "green" => Color::Green,
        "purple" => Color::Magenta,
        "red" => Color::Red,
        "yellow" => Color::Yellow,
        "indigo" => Color::Blue,
        "pink" => Color::BrightMagenta,
        "blue" => Color::BrightBlue,
        _ => Color::White,
    }
}

fn badge(status: &Status) -> ColoredString {
    format!(" {} ", status.label)
        .color(Color::White)
        .on_color(color_for(&status.color))
        .bold()
}

/// Local `HH:MM` of the last status change, `-` if never changed.
pub fn format_time(at: Option<DateTime<Utc>>) -> String {
    format_time_in(at, &Local)
}

fn format_time_in<Tz: TimeZone>(at: Option<DateTime<Utc>>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match at {
        Some(at) => at.with_timezone(tz).format("%H:%M").to_string(),
        None => "-".to_string(),
    }
}

pub fn print_board(session: &Session) {
    let state = session.state();
    let rows = session.board();
    let filter = match session.filter().status().and_then(|id| state.statuses.get(id)) {
        Some(status) => status.label.clone(),
        None => "all".to_string(),
    };

    println!(
        "{} | {} children | showing {} ({})",
        "Tzaharon".bold(),
        state.children.len(),
        rows.len(),
        filter,
    );

    if rows.is_empty() {
        println!("No children on the board.");
    } else {
        let table_rows: Vec<BoardRow> = rows
            .iter()
            .map(|child| BoardRow {
                name: child.full_name(),
                status: state
                    .statuses
                    .get(&child.status_id)
                    .map(|s| s.label.clone())
                    .unwrap_or_else(|| "?".to_string()),
                updated: format_time(child.last_updated),
                note: child.notes.clone().unwrap_or_default(),
                id: short_id(child.id.as_str()).to_string(),
            })
            .collect();
        let mut table = Table::new(table_rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    print_footer(session);
}

fn print_footer(session: &Session) {
    let counts = tally(session.state());
    let parts: Vec<String> = counts
        .per_status
        .iter()
        .map(|entry| format!("{} {}", badge(entry.status), entry.count))
        .collect();
    println!("{}  total {}", parts.join("  "), counts.total);

    match session.pending() {
        PendingAction::None => {}
        PendingAction::Delete(id) => println!("{}", format!("pending: remove {id}").yellow()),
        PendingAction::Reset => println!("{}", "pending: reset all".yellow()),
    }
    if let Some(issue) = session.issue() {
        eprintln!("{} {issue}", "warning:".yellow().bold());
    }
}

pub fn print_board_json(session: &Session) -> anyhow::Result<()> {
    let counts = tally(session.state());
    let payload = BoardJson {
        filter: session.filter(),
        total: counts.total,
        children: session.board(),
        counts: counts
            .per_status
            .iter()
            .map(|entry| CountJson {
                id: &entry.status.id,
                label: &entry.status.label,
                count: entry.count,
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

pub fn print_statuses(statuses: &[Status]) {
    if statuses.is_empty() {
        println!("No statuses defined.");
        println!("Run: tzaharon status add <label>");
        return;
    }
    let rows: Vec<StatusRow> = statuses
        .iter()
        .enumerate()
        .map(|(index, status)| StatusRow {
            position: index + 1,
            label: status.label.clone(),
            color: status.color.clone(),
            kind: status.kind.to_string(),
            id: status.id.to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

/// Generated ids are uuids; eight characters are plenty to address one.
fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(end, _)| &id[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use rstest::rstest;

    #[rstest]
    #[case("bg-green-500", Color::Green)]
    #[case("bg-slate-500", Color::BrightBlack)]
    #[case("bg-gray-400", Color::BrightBlack)]
    #[case("bg-purple-500", Color::Magenta)]
    #[case("text-red-500", Color::White)]
    #[case("", Color::White)]
    fn maps_color_classes(#[case] class: &str, #[case] expected: Color) {
        assert_eq!(color_for(class), expected);
    }

    #[test]
    fn time_is_local_hours_and_minutes() {
        let at = Utc.with_ymd_and_hms(2024, 5, 2, 13, 7, 0).unwrap();
        let israel = FixedOffset::east_opt(3 * 3600).unwrap();
        assert_eq!(format_time_in(Some(at), &israel), "16:07");
        assert_eq!(format_time_in(None, &israel), "-");
    }

    #[rstest]
    #[case("3", "3")]
    #[case("0b7e1c52-9d4f-4e43-9a34-1d2b7f0c9e11", "0b7e1c52")]
    fn shortens_ids(#[case] id: &str, #[case] expected: &str) {
        assert_eq!(short_id(id), expected);
    }
}
