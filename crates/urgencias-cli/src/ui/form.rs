//! New-case entry form.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, Field};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let form = &app.form;

  let block = Block::default()
    .title(" 📝 Registro de Incidente ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let label_width = Field::ALL
    .iter()
    .map(|f| f.label().chars().count())
    .max()
    .unwrap_or(0);

  let mut lines: Vec<Line> = Vec::new();
  for field in Field::ALL {
    let focused = field == form.focus;
    let label_style = if focused {
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    let marker = if focused { "▶ " } else { "  " };
    let label = format!("{marker}{:<label_width$}  ", field.label());

    let value = match form.text(field) {
      Some(text) => {
        let cursor = if focused { "_" } else { "" };
        // Multi-line descriptions render on one row; the view wraps.
        format!("{}{cursor}", text.replace('\n', " ⏎ "))
      }
      None => {
        let current = match field {
          Field::Status => form.status.label(),
          _ => form.category.label(),
        };
        if focused { format!("◀ {current} ▶") } else { current.to_string() }
      }
    };

    lines.push(Line::from(vec![
      Span::styled(label, label_style),
      Span::raw(value),
    ]));
  }

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    "💾 Guardar Caso: Ctrl-S",
    Style::default().fg(Color::Green),
  )));

  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
    area,
  );
}
