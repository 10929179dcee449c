//! UI rendering for the monitor.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::alu::display_byte;
use crate::display::lcd::LINES;
use super::app::MonitorApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &MonitorApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(55),
            Constraint::Percentage(45),
        ])
        .split(frame.area());
    
    // Left side: display, inputs and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(8),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(chunks[0]);
    
    draw_lcd(frame, left_chunks[0], app);
    draw_inputs(frame, left_chunks[1], app);
    draw_bus(frame, left_chunks[2], app);
    draw_status(frame, left_chunks[3], app);
    
    // Right side: transaction log and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(5),
        ])
        .split(chunks[1]);
    
    draw_log(frame, right_chunks[0], app);
    draw_help(frame, right_chunks[1]);
}

/// Draw the LCD panel.
fn draw_lcd(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let lines: Vec<Line> = (0..LINES)
        .map(|row| {
            Line::from(Span::styled(
                app.lcd.line(row),
                Style::default().fg(Color::Black).bg(Color::Green),
            ))
        })
        .collect();
    
    let panel = Paragraph::new(lines)
        .block(Block::default()
            .title(" LCD ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));
    
    frame.render_widget(panel, area);
}

/// Draw operand, selector and result values.
fn draw_inputs(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let inputs = &app.inputs;
    let op = inputs.opcode();
    let result = inputs.result();
    
    let content = vec![
        Line::from(vec![
            Span::raw("A: "),
            Span::styled(format!("{:>5}", inputs.a), Style::default().fg(Color::White)),
            Span::raw(format!("  {:08b}", inputs.a as u8)),
        ]),
        Line::from(vec![
            Span::raw("B: "),
            Span::styled(format!("{:>5}", inputs.b), Style::default().fg(Color::White)),
            Span::raw(format!("  {:08b}", inputs.b as u8)),
        ]),
        Line::from(vec![
            Span::raw("Selector: "),
            Span::styled(format!("{:03b}", inputs.selector & 0b111), Style::default().fg(Color::Yellow)),
            Span::raw("  Op: "),
            Span::styled(format!("{}", op), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::raw("Result: "),
            Span::styled(format!("{}", result), Style::default().fg(Color::Cyan)),
            Span::raw(format!("  (0x{:04X}, low byte {})", result as u16, display_byte(result))),
        ]),
        Line::from(vec![
            Span::raw("Expected line: "),
            Span::styled(inputs.frame().text(), Style::default().fg(Color::White)),
        ]),
    ];
    
    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Inputs ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));
    
    frame.render_widget(paragraph, area);
}

/// Draw bus lines and sequencer position.
fn draw_bus(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let bus = app.board.bus();
    let seq = &app.board.seq;
    
    let content = vec![
        Line::from(vec![
            Span::raw("DATA: "),
            Span::styled(format!("0x{:02X}", bus.data), Style::default().fg(Color::White)),
            Span::raw("  RS: "),
            Span::styled(level(bus.rs), line_style(bus.rs)),
            Span::raw("  RW: "),
            Span::styled(level(bus.rw), line_style(bus.rw)),
            Span::raw("  EN: "),
            Span::styled(level(bus.en), line_style(bus.en)),
        ]),
        Line::from(vec![
            Span::raw("Next: "),
            Span::styled(format!("{:?}", seq.step()), Style::default().fg(Color::Yellow)),
            Span::raw(format!("  Steps: {}  Ticks: {}", seq.steps, seq.ticks)),
        ]),
    ];
    
    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Bus ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));
    
    frame.render_widget(paragraph, area);
}

/// Draw the recent transaction log.
fn draw_log(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    
    let items: Vec<ListItem> = app.history
        .iter()
        .rev()
        .take(visible_rows)
        .map(|t| {
            let style = if t.rs {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(format!("{}", t)).style(style)
        })
        .collect();
    
    let list = List::new(items)
        .block(Block::default()
            .title(" Transactions ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));
    
    frame.render_widget(list, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));
    
    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("a/A: A±1  b/B: B±1  o: Next op  0-7: Op"),
        Line::from("space: Run/Pause  s: Step  +/-: Speed"),
        Line::from("x: Reset  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));
    
    frame.render_widget(help, area);
}

fn level(high: bool) -> &'static str {
    if high { "1" } else { "0" }
}

/// Get color style for a logic level.
fn line_style(high: bool) -> Style {
    if high {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Gray)
    }
}
