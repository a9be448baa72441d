//! Aligned text table output
//!
//! Column widths depend on every row, so the whole result set is laid out
//! before the first line is written.

use std::io::{self, Write};

use chrono::Duration;

use crate::connection::{DisplayRow, Occupancy};

/// A column of the connection table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub label: &'static str,
    pub min_width: usize,
}

const fn column(label: &'static str, min_width: usize) -> Column {
    Column { label, min_width }
}

pub const COLUMN_COUNT: usize = 9;

pub const COLUMNS: [Column; COLUMN_COUNT] = [
    column("#", 2),
    column("Station", 0),
    column("Platform", 4),
    column("Date", 13),
    column("Time", 5),
    column("Duration", 5),
    column("Chg.", 2),
    column("Travel with", 0),
    column("Occupancy", 9),
];

pub const SEPARATOR: &str = " | ";

const RULE: char = '-';
const DATE_FORMAT: &str = "%a, %d.%m.%y";
const TIME_FORMAT: &str = "%H:%M";

/// Cells of one physical table line
pub type Line = [String; COLUMN_COUNT];

/// Prints padded cells joined by a separator
#[derive(Debug, Clone)]
pub struct TablePrinter {
    widths: Vec<usize>,
    separator: String,
}

impl TablePrinter {
    pub fn new(widths: Vec<usize>, separator: impl Into<String>) -> Self {
        Self {
            widths,
            separator: separator.into(),
        }
    }

    /// Length of a separator rule: all widths plus the separators between them.
    pub fn rule_width(&self) -> usize {
        let gaps = self.widths.len().saturating_sub(1);
        self.widths.iter().sum::<usize>() + gaps * self.separator.chars().count()
    }

    pub fn print_header<W: Write>(&self, out: &mut W, labels: &[&str]) -> io::Result<()> {
        self.print_line(out, labels)
    }

    /// Left-align each value in its column. Longer values are not cut.
    pub fn print_line<W: Write, S: AsRef<str>>(&self, out: &mut W, values: &[S]) -> io::Result<()> {
        debug_assert_eq!(values.len(), self.widths.len());

        let cells: Vec<String> = values
            .iter()
            .zip(&self.widths)
            .map(|(value, &width)| format!("{:<width$}", value.as_ref()))
            .collect();

        writeln!(out, "{}", cells.join(&self.separator))
    }

    pub fn print_separator<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let rule: String = std::iter::repeat(RULE).take(self.rule_width()).collect();
        writeln!(out, "{rule}")
    }
}

/// Per-column widths for a batch of lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub widths: Vec<usize>,
}

impl TableLayout {
    /// Each width is the largest of the column minimum, its label and every
    /// cell in that column. With no lines only the first two count.
    pub fn compute(lines: &[Line]) -> Self {
        let widths = COLUMNS
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let longest = lines
                    .iter()
                    .map(|line| line[i].chars().count())
                    .max()
                    .unwrap_or(0);
                longest.max(col.min_width).max(col.label.chars().count())
            })
            .collect();

        Self { widths }
    }
}

/// `H:MM`, seconds dropped, hours not wrapped at a day.
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes();
    let sign = if minutes < 0 { "-" } else { "" };
    let minutes = minutes.abs();
    format!("{sign}{}:{:02}", minutes / 60, minutes % 60)
}

fn occupancy_cell(class: u8, occupancy: Occupancy) -> String {
    if occupancy.is_known() {
        format!("{class}: {occupancy}")
    } else {
        "-".to_string()
    }
}

/// The two physical lines of connection number `number`.
pub fn connection_lines(number: usize, row: &DisplayRow) -> [Line; 2] {
    let departure = [
        number.to_string(),
        row.station_from.clone(),
        row.platform_from.clone(),
        row.departure.format(DATE_FORMAT).to_string(),
        row.departure.format(TIME_FORMAT).to_string(),
        format_duration(row.duration()),
        row.change_count.clone(),
        row.travelwith.clone(),
        occupancy_cell(1, row.occupancy_1st),
    ];

    let arrival = [
        String::new(),
        row.station_to.clone(),
        row.platform_to.clone(),
        row.arrival.format(DATE_FORMAT).to_string(),
        row.arrival.format(TIME_FORMAT).to_string(),
        String::new(),
        String::new(),
        String::new(),
        occupancy_cell(2, row.occupancy_2nd),
    ];

    [departure, arrival]
}

/// Render the full table: header, rule, then two lines and a rule per connection.
pub fn render_connections<W: Write>(out: &mut W, rows: &[DisplayRow]) -> io::Result<()> {
    let blocks: Vec<[Line; 2]> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| connection_lines(i + 1, row))
        .collect();
    let lines: Vec<Line> = blocks.iter().flatten().cloned().collect();

    let layout = TableLayout::compute(&lines);
    let printer = TablePrinter::new(layout.widths, SEPARATOR);

    let labels: Vec<&str> = COLUMNS.iter().map(|c| c.label).collect();
    printer.print_header(out, &labels)?;
    printer.print_separator(out)?;

    for [departure, arrival] in &blocks {
        printer.print_line(out, departure)?;
        printer.print_line(out, arrival)?;
        printer.print_separator(out)?;
    }

    Ok(())
}
