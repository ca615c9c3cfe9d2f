use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Bar, BarChart, BarGroup, Block, Borders},
    Frame,
};

use super::state::{Highlight, UiState};
use crate::model::format_value;

/// Resolution of bar heights handed to the chart.
const BAR_SCALE: u64 = 100;

/// Scale values onto `1..=BAR_SCALE`. Negative inputs are shifted so the smallest
/// value still gets a visible bar.
pub fn bar_heights(values: &[f64]) -> Vec<u64> {
    let floor = values.iter().copied().fold(0.0_f64, f64::min);
    let ceil = values.iter().copied().fold(f64::MIN, f64::max);
    let span = (ceil - floor).max(f64::EPSILON);
    values
        .iter()
        .map(|v| (((v - floor) / span) * BAR_SCALE as f64).round().max(1.0) as u64)
        .collect()
}

pub fn highlight_color(h: Highlight) -> Color {
    match h {
        Highlight::Plain => Color::Blue,
        Highlight::Compare => Color::Yellow,
        Highlight::Swap => Color::Red,
        Highlight::Write => Color::Cyan,
        Highlight::Pivot => Color::Magenta,
        Highlight::Sorted => Color::Green,
    }
}

pub fn draw_bars(area: Rect, f: &mut Frame, state: &UiState) {
    let n = state.values.len().max(1);
    let inner_width = area.width.saturating_sub(2) as usize;
    let gap: u16 = if inner_width >= n * 3 { 1 } else { 0 };
    let bar_width = ((inner_width.saturating_sub((n - 1) * gap as usize)) / n).max(1) as u16;

    let heights = bar_heights(&state.values);
    let bars: Vec<Bar> = state
        .values
        .iter()
        .zip(heights)
        .enumerate()
        .map(|(i, (v, h))| {
            let color = highlight_color(state.highlight(i));
            let label = format_value(*v);
            let bar = Bar::default()
                .value(h)
                .style(Style::default().fg(color))
                .value_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(color)
                        .add_modifier(Modifier::BOLD),
                );
            if label.chars().count() <= bar_width as usize {
                bar.text_value(label)
            } else {
                bar.text_value(String::new())
            }
        })
        .collect();

    let title = match state.last_op {
        Some(op) => format!("{} sort · {}", state.algorithm, op.describe()),
        None => format!("{} sort", state.algorithm),
    };
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(gap)
        .max(BAR_SCALE);
    f.render_widget(chart, area);
}
