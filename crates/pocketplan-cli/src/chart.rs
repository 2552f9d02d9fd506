//! Budget pie chart
//!
//! Two renderings of the same `Allocation`:
//! - a full-screen terminal view (ratatui `Canvas` + legend + tips panel)
//!   that blocks until the user closes it
//! - a plain-text table for non-interactive output
//!
//! Slices start at 12 o'clock and run counter-clockwise in allocation order.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use pocketplan_core::tips::format_money;
use pocketplan_core::{Allocation, TipsOutcome};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Paragraph, Wrap,
    },
    Frame,
};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::debug;

use crate::terminal::{restore_terminal, setup_terminal, ChartTerminal};

pub const CHART_TITLE: &str = "Monthly Budget Distribution";

/// Slice colours, reused in order when there are more slices
pub const PALETTE: [Color; 6] = [
    Color::Rgb(0x00, 0x88, 0xFE),
    Color::Rgb(0x00, 0xC4, 0x9F),
    Color::Rgb(0xFF, 0xBB, 0x28),
    Color::Rgb(0xFF, 0x80, 0x42),
    Color::Rgb(0xAA, 0x00, 0xFF),
    Color::Rgb(0xFF, 0x45, 0x60),
];

/// Width of the bar column in the text table
const TEXT_BAR_WIDTH: usize = 20;

/// Radius (in pie units) where percentage labels are placed
const LABEL_RADIUS: f64 = 0.6;

pub fn slice_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

/// How the chart gets shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMode {
    /// Full-screen view, closed with q / Esc / Enter
    Terminal,
    /// Text table written straight to the output
    Text,
}

/// Fraction (0.0-1.0) of the way around the pie for a point on the plane
fn pie_fraction(x: f64, y: f64) -> f64 {
    (y.atan2(x) - FRAC_PI_2).rem_euclid(TAU) / TAU
}

/// Unit-circle coordinates at `fraction` of the way around the pie
fn pie_position(fraction: f64, radius: f64) -> (f64, f64) {
    let angle = FRAC_PI_2 + fraction * TAU;
    (radius * angle.cos(), radius * angle.sin())
}

/// Sample the unit disc on a `resolution` x `resolution` grid
///
/// Returns one coordinate list per slice (same indexing as
/// `allocation.slices`). Zero-sized slices get an empty list.
pub fn pie_points(allocation: &Allocation, resolution: usize) -> Vec<Vec<(f64, f64)>> {
    let mut points = vec![Vec::new(); allocation.slices.len()];
    if allocation.is_empty() || resolution < 2 {
        return points;
    }

    let step = 2.0 / (resolution - 1) as f64;
    for row in 0..resolution {
        let y = -1.0 + row as f64 * step;
        for col in 0..resolution {
            let x = -1.0 + col as f64 * step;
            if x * x + y * y > 1.0 {
                continue;
            }
            if let Some(index) = allocation.slice_at(pie_fraction(x, y)) {
                points[index].push((x, y));
            }
        }
    }
    points
}

/// Where to print each non-empty slice's percentage: `(slice index, x, y)`
pub fn label_positions(allocation: &Allocation) -> Vec<(usize, f64, f64)> {
    let mut positions = Vec::new();
    let mut start = 0.0;
    for (i, slice) in allocation.slices.iter().enumerate() {
        if slice.share <= 0.0 {
            continue;
        }
        let (x, y) = pie_position(start + slice.share / 2.0, LABEL_RADIUS);
        positions.push((i, x, y));
        start += slice.share;
    }
    positions
}

/// `████████░░░░` sized to `share`
fn share_bar(share: f64, width: usize) -> String {
    let filled = ((share.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Write the allocation as a text table
pub fn render_text<W: Write>(allocation: &Allocation, out: &mut W) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", CHART_TITLE)?;

    if allocation.is_empty() {
        writeln!(out, "  Nothing to chart: income and expenses are all zero.")?;
        return Ok(());
    }

    let label_width = allocation
        .slices
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0);

    for slice in &allocation.slices {
        writeln!(
            out,
            "  {:<label_width$}  {:>12}  {:>6}  {}",
            slice.label,
            format_money(slice.amount),
            slice.percent_label(),
            share_bar(slice.share, TEXT_BAR_WIDTH),
        )?;
    }
    Ok(())
}

/// What the tips panel shows
enum TipsPanel {
    Waiting,
    Ready(TipsOutcome),
    /// Sender dropped without reporting (task panicked)
    Unavailable,
}

impl TipsPanel {
    fn poll(&mut self, rx: &mut oneshot::Receiver<TipsOutcome>) {
        if !matches!(self, TipsPanel::Waiting) {
            return;
        }
        match rx.try_recv() {
            Ok(outcome) => {
                debug!(success = outcome.is_tips(), "Tips arrived while chart open");
                *self = TipsPanel::Ready(outcome);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Closed) => *self = TipsPanel::Unavailable,
        }
    }

    fn text(&self) -> String {
        match self {
            TipsPanel::Waiting => "Fetching budgeting tips...".to_string(),
            TipsPanel::Ready(TipsOutcome::Tips(text)) => text.clone(),
            TipsPanel::Ready(outcome) => outcome.to_string(),
            TipsPanel::Unavailable => "Tips unavailable.".to_string(),
        }
    }
}

/// Open the full-screen chart and block until the user closes it
///
/// The terminal is restored even when drawing fails.
pub fn show_terminal(
    allocation: &Allocation,
    mut tips_rx: oneshot::Receiver<TipsOutcome>,
) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_chart_loop(&mut terminal, allocation, &mut tips_rx);
    restore_terminal(&mut terminal)?;
    result
}

fn run_chart_loop(
    terminal: &mut ChartTerminal,
    allocation: &Allocation,
    tips_rx: &mut oneshot::Receiver<TipsOutcome>,
) -> Result<()> {
    let mut panel = TipsPanel::Waiting;
    loop {
        panel.poll(tips_rx);
        terminal.draw(|frame| draw(frame, allocation, &panel))?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter)
                {
                    debug!("Chart closed");
                    return Ok(());
                }
            }
        }
    }
}

fn draw(frame: &mut Frame<'_>, allocation: &Allocation, panel: &TipsPanel) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(allocation.slices.len() as u16 + 2),
            Constraint::Min(3),
        ])
        .split(columns[1]);

    draw_pie(frame, columns[0], allocation);
    draw_legend(frame, side[0], allocation);

    let tips = Paragraph::new(panel.text())
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Budgeting Tips "));
    frame.render_widget(tips, side[1]);

    let hint = Paragraph::new("q / Esc / Enter to close")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, rows[1]);
}

fn draw_pie(frame: &mut Frame<'_>, area: Rect, allocation: &Allocation) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", CHART_TITLE));
    let inner = block.inner(area);

    // Braille dots are roughly square: 2 per cell across, 4 per cell down
    let dots_x = (inner.width as f64 * 2.0).max(1.0);
    let dots_y = (inner.height as f64 * 4.0).max(1.0);
    let margin = 1.1;
    let (x_extent, y_extent) = if dots_x >= dots_y {
        (margin * dots_x / dots_y, margin)
    } else {
        (margin, margin * dots_y / dots_x)
    };

    let resolution = (dots_y.min(dots_x) as usize).clamp(16, 400);
    let points = pie_points(allocation, resolution);
    let labels: Vec<(f64, f64, String)> = label_positions(allocation)
        .into_iter()
        .map(|(i, x, y)| (x, y, allocation.slices[i].percent_label()))
        .collect();
    let empty = allocation.is_empty();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([-x_extent, x_extent])
        .y_bounds([-y_extent, y_extent])
        .paint(move |ctx| {
            if empty {
                ctx.print(-0.4, 0.0, "Nothing to chart");
                return;
            }
            for (i, coords) in points.iter().enumerate() {
                ctx.draw(&Points {
                    coords,
                    color: slice_color(i),
                });
            }
            ctx.layer();
            for (x, y, label) in &labels {
                ctx.print(
                    *x - 0.1,
                    *y,
                    Span::styled(
                        label.clone(),
                        Style::default()
                            .fg(Color::Black)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });

    frame.render_widget(canvas, area);
}

fn draw_legend(frame: &mut Frame<'_>, area: Rect, allocation: &Allocation) {
    let lines: Vec<Line> = allocation
        .slices
        .iter()
        .enumerate()
        .map(|(i, slice)| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(slice_color(i))),
                Span::raw(format!(
                    "{}  {}  {}",
                    slice.label,
                    format_money(slice.amount),
                    slice.percent_label()
                )),
            ])
        })
        .collect();

    let legend =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Legend "));
    frame.render_widget(legend, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketplan_core::{Budget, Expenses};

    fn allocation(items: &[(&str, f64)], income: f64) -> Allocation {
        let expenses: Expenses = items.iter().map(|(n, a)| (*n, *a)).collect();
        Budget::new(income, 0.0, expenses).allocation()
    }

    #[test]
    fn test_pie_fraction_starts_at_top_counter_clockwise() {
        assert!(pie_fraction(0.0, 1.0).abs() < 1e-9);
        assert!((pie_fraction(-1.0, 0.0) - 0.25).abs() < 1e-9);
        assert!((pie_fraction(0.0, -1.0) - 0.5).abs() < 1e-9);
        assert!((pie_fraction(1.0, 0.0) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_pie_points_proportional_to_share() {
        let alloc = allocation(&[("Rent", 1500.0)], 3000.0);
        let points = pie_points(&alloc, 101);
        let rent = points[0].len() as f64;
        let savings = points[1].len() as f64;

        assert!(rent > 0.0 && savings > 0.0);
        assert!((rent / (rent + savings) - 0.5).abs() < 0.05);
        // Rent covers the left half: fractions 0.0-0.5 from 12 o'clock counter-clockwise
        assert!(points[0].iter().all(|(x, _)| *x <= 1e-9));
    }

    #[test]
    fn test_pie_points_empty_allocation() {
        let alloc = allocation(&[], 0.0);
        let points = pie_points(&alloc, 50);
        assert_eq!(points.len(), 1);
        assert!(points[0].is_empty());
    }

    #[test]
    fn test_zero_slice_gets_no_points_or_label() {
        let alloc = allocation(&[("Gym", 0.0), ("Rent", 500.0)], 1000.0);
        assert!(pie_points(&alloc, 60)[0].is_empty());

        let labelled: Vec<usize> = label_positions(&alloc).iter().map(|(i, _, _)| *i).collect();
        assert_eq!(labelled, vec![1, 2]);
    }

    #[test]
    fn test_label_positions_at_slice_middle() {
        let alloc = allocation(&[("Rent", 1000.0)], 1000.0);
        let positions = label_positions(&alloc);
        assert_eq!(positions.len(), 1);
        let (_, x, y) = positions[0];
        // The single slice is the whole pie; its middle is straight down
        assert!(x.abs() < 1e-9);
        assert!((y + LABEL_RADIUS).abs() < 1e-9);
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(slice_color(0), slice_color(6));
        assert_ne!(slice_color(0), slice_color(1));
    }

    #[test]
    fn test_share_bar() {
        assert_eq!(share_bar(0.5, 4), "██░░");
        assert_eq!(share_bar(0.0, 3), "░░░");
        assert_eq!(share_bar(1.5, 2), "██");
    }

    #[test]
    fn test_render_text() {
        let alloc = allocation(&[("Rent", 1000.0), ("Food", 500.0)], 3000.0);
        let mut out = Vec::new();
        render_text(&alloc, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains(CHART_TITLE));
        assert!(text.contains("Rent"));
        assert!(text.contains("$1000.00"));
        assert!(text.contains("33.3%"));
        assert!(text.contains("Savings"));
        assert!(text.contains("50.0%"));
        assert!(text.find("Rent").unwrap() < text.find("Savings").unwrap());
    }

    #[test]
    fn test_render_text_nothing_to_chart() {
        let mut out = Vec::new();
        render_text(&allocation(&[], 0.0), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Nothing to chart"));
    }

    #[test]
    fn test_tips_panel_poll() {
        let (tx, mut rx) = oneshot::channel();
        let mut panel = TipsPanel::Waiting;

        panel.poll(&mut rx);
        assert_eq!(panel.text(), "Fetching budgeting tips...");

        tx.send(TipsOutcome::Tips("Save early.".to_string())).unwrap();
        panel.poll(&mut rx);
        assert_eq!(panel.text(), "Save early.");
    }

    #[test]
    fn test_tips_panel_sender_dropped() {
        let (tx, mut rx) = oneshot::channel::<TipsOutcome>();
        drop(tx);
        let mut panel = TipsPanel::Waiting;
        panel.poll(&mut rx);
        assert_eq!(panel.text(), "Tips unavailable.");
    }
}
