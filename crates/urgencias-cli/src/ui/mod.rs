//! TUI rendering — header, tab bar, active view, status bar.

pub mod form;
pub mod summary;
pub mod table;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Tabs, Wrap},
};

use crate::app::{App, Tab};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(1), // tabs
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0]);
  draw_tabs(f, rows[1], app);
  draw_body(f, rows[2], app);
  draw_status(f, rows[3], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect) {
  let date = Local::now().format("%d/%m/%Y").to_string();

  let left = Span::styled(
    " 🚨 Gestión de Urgencias",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
    area,
  );
}

// ─── Tabs ─────────────────────────────────────────────────────────────────────

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
  let selected = Tab::ALL.iter().position(|t| *t == app.tab).unwrap_or(0);
  let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
    .select(selected)
    .style(Style::default().fg(Color::DarkGray))
    .highlight_style(
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    )
    .divider("│");
  f.render_widget(tabs, area);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  match app.tab {
    Tab::NewCase => form::draw(f, area, app),
    // Data views never show partial data after a failed load.
    Tab::Summary | Tab::Database if app.load_error.is_some() => {
      draw_load_error(f, area, app.load_error.as_deref().unwrap_or_default())
    }
    Tab::Summary => summary::draw(f, area, app),
    Tab::Database => table::draw(f, area, app),
  }
}

fn draw_load_error(f: &mut Frame, area: Rect, message: &str) {
  let block = Block::default()
    .title(" Error ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));
  let text = vec![
    Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red))),
    Line::from(""),
    Line::from(Span::styled(
      "Presione r para reintentar.",
      Style::default().fg(Color::DarkGray),
    )),
  ];
  f.render_widget(
    Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
    area,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let hints = match app.tab {
    Tab::Summary => "Tab vista  r actualizar  q salir",
    Tab::NewCase => {
      "↑↓ campo  ←→ opción  Enter siguiente  Ctrl-S guardar  Esc volver"
    }
    Tab::Database => "↑↓/jk fila  Tab vista  r actualizar  q salir",
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {} ", app.tab.title().to_uppercase()),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}
