use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::bars::highlight_color;
use super::state::Highlight;

fn key_line(key: &'static str, pad: usize, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(format!("{}{action}", " ".repeat(pad))),
    ])
}

fn legend_line(h: Highlight, text: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled("██", Style::default().fg(highlight_color(h))),
        Span::raw(format!(" {text}")),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        key_line("s", 11, "Start sorting (also Enter)"),
        key_line("p", 11, "Pause/Resume (also space)"),
        key_line("g", 11, "Generate array (from edited values, else random)"),
        key_line("r", 11, "Reset to the generated array"),
        key_line("e", 11, "Edit values (comma-separated; Enter applies, Esc cancels)"),
        key_line("+/-", 9, "Faster / slower"),
        key_line("[/]", 9, "Smaller / larger array"),
        key_line("a", 11, "Next algorithm (or 1-5)"),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        Line::from(""),
        Line::from("Size, algorithm, generate and reset are locked while a sort runs."),
        Line::from("Speed changes apply to the very next step."),
        Line::from(""),
        Line::from("Colors:"),
        legend_line(Highlight::Compare, "compare"),
        legend_line(Highlight::Swap, "swap / shift"),
        legend_line(Highlight::Write, "write back"),
        legend_line(Highlight::Pivot, "pivot"),
        legend_line(Highlight::Sorted, "in final position"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
