//! Summary view — four headline counts and two distribution charts.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
};
use urgencias_core::summary::{Bucket, Summary};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(summary) = &app.summary else {
    f.render_widget(
      Paragraph::new("Cargando…").style(Style::default().fg(Color::DarkGray)),
      area,
    );
    return;
  };

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(4), Constraint::Min(0)])
    .split(area);

  draw_metrics(f, rows[0], summary);

  let charts = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(rows[1]);

  draw_distribution(
    f,
    charts[0],
    " Estados ",
    &summary.status_distribution,
    Share::Percent,
    Color::Yellow,
  );
  draw_distribution(
    f,
    charts[1],
    " Categorías ",
    &summary.category_distribution,
    Share::Count,
    Color::Magenta,
  );
}

// ─── Metrics ──────────────────────────────────────────────────────────────────

fn draw_metrics(f: &mut Frame, area: Rect, summary: &Summary) {
  let metrics = [
    ("Total Reclamos", summary.total, Color::White),
    ("Pendientes", summary.pending, Color::Red),
    ("En Proceso", summary.in_progress, Color::Yellow),
    ("Cerrados", summary.closed, Color::Green),
  ];

  let cells = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Ratio(1, 4); 4])
    .split(area);

  for ((label, value, color), cell) in metrics.into_iter().zip(cells.iter()) {
    let block = Block::default()
      .title(format!(" {label} "))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    let value = Line::from(Span::styled(
      value.to_string(),
      Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .centered();
    f.render_widget(Paragraph::new(value).block(block), *cell);
  }
}

// ─── Charts ───────────────────────────────────────────────────────────────────

/// How a bar's value is annotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Share {
  /// The raw count.
  Count,
  /// The count and its share of the whole distribution.
  Percent,
}

/// Text shown at the end of each bar.
fn bar_text<T>(
  bucket: &Bucket<T>,
  buckets: &[Bucket<T>],
  share: Share,
) -> String {
  match share {
    Share::Count => bucket.count.to_string(),
    Share::Percent => {
      let total: usize = buckets.iter().map(|b| b.count).sum();
      let pct = if total == 0 {
        0.0
      } else {
        bucket.count as f64 * 100.0 / total as f64
      };
      format!("{} ({pct:.1}%)", bucket.count)
    }
  }
}

fn draw_distribution<T: std::fmt::Display>(
  f: &mut Frame,
  area: Rect,
  title: &str,
  buckets: &[Bucket<T>],
  share: Share,
  color: Color,
) {
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if buckets.is_empty() {
    f.render_widget(
      Paragraph::new("Sin datos.")
        .style(Style::default().fg(Color::DarkGray))
        .block(block),
      area,
    );
    return;
  }

  let bars: Vec<Bar> = buckets
    .iter()
    .map(|b| {
      Bar::default()
        .label(Line::from(b.label.to_string()))
        .value(b.count as u64)
        .text_value(bar_text(b, buckets, share))
        .style(Style::default().fg(color))
    })
    .collect();

  let chart = BarChart::default()
    .block(block)
    .direction(Direction::Horizontal)
    .bar_width(1)
    .bar_gap(1)
    .data(BarGroup::default().bars(&bars));
  f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
  use urgencias_core::{incident::Status, summary::Label};

  use super::*;

  fn buckets() -> Vec<Bucket<Status>> {
    vec![
      Bucket { label: Label::Known(Status::Closed), count: 3 },
      Bucket { label: Label::Known(Status::Unanswered), count: 1 },
    ]
  }

  #[test]
  fn status_bars_show_their_share() {
    let b = buckets();
    assert_eq!(bar_text(&b[0], &b, Share::Percent), "3 (75.0%)");
    assert_eq!(bar_text(&b[1], &b, Share::Percent), "1 (25.0%)");
  }

  #[test]
  fn category_bars_show_the_count() {
    let b = buckets();
    assert_eq!(bar_text(&b[0], &b, Share::Count), "3");
  }
}
