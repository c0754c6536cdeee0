//! Raw worksheet browser.

use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::app::App;

/// Render every row of the last snapshot, unfiltered.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(snapshot) = &app.snapshot else {
    f.render_widget(
      Paragraph::new("Cargando…").style(Style::default().fg(Color::DarkGray)),
      area,
    );
    return;
  };
  let table = &snapshot.table;

  let block = Block::default()
    .title(format!(" Base de Datos ({} filas, {}) ", table.len(), snapshot.revision))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let header = Row::new(table.columns().iter().map(|c| Cell::from(c.as_str())))
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let rows = table.rows().iter().map(|row| {
    Row::new(row.iter().map(|cell| Cell::from(cell.as_deref().unwrap_or(""))))
  });

  let widths = vec![Constraint::Fill(1); table.columns().len().max(1)];

  let mut state = TableState::default();
  state.select((!table.is_empty()).then_some(app.table_cursor));

  f.render_stateful_widget(
    Table::new(rows, widths)
      .header(header)
      .block(block)
      .row_highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    area,
    &mut state,
  );
}
