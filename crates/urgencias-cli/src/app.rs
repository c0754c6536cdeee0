//! Application state machine and event dispatcher.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use strum::IntoEnumIterator as _;
use urgencias_core::{
  incident::{Category, DATE_FORMAT, IncidentDraft, Status},
  store::Snapshot,
  summary::Summary,
};

use crate::client::ApiClient;

// ─── Tab ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  /// Metrics and charts over rows that have a location.
  Summary,
  /// Entry form for a new incident.
  NewCase,
  /// The raw worksheet.
  Database,
}

impl Tab {
  pub const ALL: [Tab; 3] = [Tab::Summary, Tab::NewCase, Tab::Database];

  pub fn title(self) -> &'static str {
    match self {
      Tab::Summary => "Panel de Control",
      Tab::NewCase => "Cargar Nuevo Caso",
      Tab::Database => "Base de Datos",
    }
  }

  fn next(self) -> Self {
    match self {
      Tab::Summary => Tab::NewCase,
      Tab::NewCase => Tab::Database,
      Tab::Database => Tab::Summary,
    }
  }

  fn prev(self) -> Self { self.next().next() }
}

// ─── Form ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Date,
  Location,
  Address,
  Neighborhood,
  Status,
  Category,
  Description,
  Assignee,
}

impl Field {
  pub const ALL: [Field; 8] = [
    Field::Date,
    Field::Location,
    Field::Address,
    Field::Neighborhood,
    Field::Status,
    Field::Category,
    Field::Description,
    Field::Assignee,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Field::Date => "Fecha",
      Field::Location => "Número de Local",
      Field::Address => "Dirección",
      Field::Neighborhood => "Barrio",
      Field::Status => "Estado",
      Field::Category => "Categoría",
      Field::Description => "Detalle del Problema",
      Field::Assignee => "Colaborador Asignado",
    }
  }

  fn index(self) -> usize {
    Field::ALL.iter().position(|f| *f == self).unwrap_or(0)
  }
}

/// Entry form state. Text fields are edited in place; status and category
/// cycle through their closed value sets.
#[derive(Debug, Clone)]
pub struct Form {
  pub focus:        Field,
  /// Day/month/year, as typed.
  pub date:         String,
  pub location_id:  String,
  pub address:      String,
  pub neighborhood: String,
  pub status:       Status,
  pub category:     Category,
  pub description:  String,
  pub assignee:     String,
}

impl Form {
  /// A blank form dated `today`.
  pub fn new(today: NaiveDate) -> Self {
    Self {
      focus:        Field::Date,
      date:         today.format(DATE_FORMAT).to_string(),
      location_id:  String::new(),
      address:      String::new(),
      neighborhood: String::new(),
      status:       Status::Scheduled,
      category:     Category::Facility,
      description:  String::new(),
      assignee:     String::new(),
    }
  }

  /// The text buffer behind `field`, or `None` for the choice fields.
  pub fn text(&self, field: Field) -> Option<&str> {
    match field {
      Field::Date => Some(&self.date),
      Field::Location => Some(&self.location_id),
      Field::Address => Some(&self.address),
      Field::Neighborhood => Some(&self.neighborhood),
      Field::Description => Some(&self.description),
      Field::Assignee => Some(&self.assignee),
      Field::Status | Field::Category => None,
    }
  }

  fn text_mut(&mut self, field: Field) -> Option<&mut String> {
    match field {
      Field::Date => Some(&mut self.date),
      Field::Location => Some(&mut self.location_id),
      Field::Address => Some(&mut self.address),
      Field::Neighborhood => Some(&mut self.neighborhood),
      Field::Description => Some(&mut self.description),
      Field::Assignee => Some(&mut self.assignee),
      Field::Status | Field::Category => None,
    }
  }

  pub fn focus_next(&mut self) {
    let i = self.focus.index();
    self.focus = Field::ALL[(i + 1) % Field::ALL.len()];
  }

  pub fn focus_prev(&mut self) {
    let i = self.focus.index();
    self.focus = Field::ALL[(i + Field::ALL.len() - 1) % Field::ALL.len()];
  }

  /// Move the focused choice field one step forward (or back).
  pub fn cycle(&mut self, forward: bool) {
    match self.focus {
      Field::Status => self.status = step(self.status, Status::iter(), forward),
      Field::Category => {
        self.category = step(self.category, Category::iter(), forward)
      }
      _ => {}
    }
  }

  pub fn push_char(&mut self, c: char) {
    let focus = self.focus;
    if let Some(buf) = self.text_mut(focus) {
      buf.push(c);
    }
  }

  pub fn backspace(&mut self) {
    let focus = self.focus;
    if let Some(buf) = self.text_mut(focus) {
      buf.pop();
    }
  }

  /// Validate the form into a draft. Only the date can be malformed.
  pub fn to_draft(&self) -> Result<IncidentDraft, String> {
    let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
      .map_err(|_| format!("Fecha inválida: {:?} (use dd/mm/aaaa)", self.date))?;
    let opt = |s: &str| (!s.trim().is_empty()).then(|| s.trim().to_owned());
    Ok(IncidentDraft {
      date,
      location_id: self.location_id.trim().to_owned(),
      address: opt(&self.address),
      neighborhood: opt(&self.neighborhood),
      status: self.status,
      category: self.category,
      description: opt(&self.description),
      assignee: opt(&self.assignee),
    })
  }
}

/// The value after (or before) `current` in `all`, wrapping around.
fn step<T: PartialEq + Copy>(
  current: T,
  all: impl Iterator<Item = T>,
  forward: bool,
) -> T {
  let all: Vec<T> = all.collect();
  let i = all.iter().position(|v| *v == current).unwrap_or(0);
  let n = all.len();
  if forward { all[(i + 1) % n] } else { all[(i + n - 1) % n] }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub tab: Tab,

  /// Latest summary; `None` until the first successful load.
  pub summary: Option<Summary>,

  /// Latest raw worksheet; `None` until the first successful load.
  pub snapshot: Option<Snapshot>,

  /// Set when the last load failed. Data views show this instead of stale
  /// or partial data.
  pub load_error: Option<String>,

  pub form: Form,

  /// Selected row in the database view.
  pub table_cursor: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      tab: Tab::Summary,
      summary: None,
      snapshot: None,
      load_error: None,
      form: Form::new(Local::now().date_naive()),
      table_cursor: 0,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the summary and the raw worksheet. With `force`, ask the server to
  /// drop its cache first.
  pub async fn load(&mut self, force: bool) -> anyhow::Result<()> {
    self.status_msg = "Cargando…".into();
    let client = self.client.clone();
    let result = async {
      if force {
        client.refresh().await?;
      }
      let summary = client.summary().await?;
      let snapshot = client.records().await?;
      anyhow::Ok((summary, snapshot))
    }
    .await;

    match result {
      Ok((summary, snapshot)) => {
        self.summary = Some(summary);
        self.table_cursor =
          self.table_cursor.min(snapshot.table.len().saturating_sub(1));
        self.snapshot = Some(snapshot);
        self.load_error = None;
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.summary = None;
        self.snapshot = None;
        self.load_error =
          Some(format!("Error al conectar con la base de datos: {e}"));
        self.status_msg = String::new();
        Err(e)
      }
    }
  }

  /// Send the form. On success the form resets and the views reload; on
  /// failure the input is kept so the user can retry.
  async fn submit(&mut self) {
    let draft = match self.form.to_draft() {
      Ok(d) => d,
      Err(msg) => {
        self.status_msg = msg;
        return;
      }
    };

    self.status_msg = "Guardando…".into();
    match self.client.append(&draft).await {
      Ok(receipt) => {
        self.form = Form::new(Local::now().date_naive());
        // Reload errors land in `load_error`; the save itself succeeded.
        let _ = self.load(true).await;
        self.status_msg =
          format!(
            "✅ ¡Guardado exitosamente! ({} filas, {})",
            receipt.rows, receipt.revision
          );
      }
      Err(e) => {
        self.status_msg = format!("No se guardó el caso: {e}");
      }
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL)
      && key.code == KeyCode::Char('c')
    {
      return Ok(false);
    }

    match key.code {
      KeyCode::Tab => {
        self.tab = self.tab.next();
        return Ok(true);
      }
      KeyCode::BackTab => {
        self.tab = self.tab.prev();
        return Ok(true);
      }
      _ => {}
    }

    match self.tab {
      Tab::NewCase => self.handle_form_key(key).await,
      Tab::Summary | Tab::Database => self.handle_view_key(key).await,
    }
  }

  async fn handle_view_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Char('r') => {
        // Failures are rendered from `load_error`.
        let _ = self.load(true).await;
      }

      KeyCode::Down | KeyCode::Char('j') if self.tab == Tab::Database => {
        let len = self.snapshot.as_ref().map_or(0, |s| s.table.len());
        if self.table_cursor + 1 < len {
          self.table_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') if self.tab == Tab::Database => {
        self.table_cursor = self.table_cursor.saturating_sub(1);
      }

      _ => {}
    }
    Ok(true)
  }

  async fn handle_form_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL)
      && key.code == KeyCode::Char('s')
    {
      self.submit().await;
      return Ok(true);
    }

    match key.code {
      KeyCode::Esc => self.tab = Tab::Summary,
      KeyCode::Up => self.form.focus_prev(),
      KeyCode::Down => self.form.focus_next(),
      KeyCode::Left => self.form.cycle(false),
      KeyCode::Right => self.form.cycle(true),
      KeyCode::Enter if self.form.focus == Field::Description => {
        self.form.push_char('\n')
      }
      KeyCode::Enter if self.form.focus == Field::Assignee => self.submit().await,
      KeyCode::Enter => self.form.focus_next(),
      KeyCode::Backspace => self.form.backspace(),
      KeyCode::Char(c) => self.form.push_char(c),
      _ => {}
    }
    Ok(true)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form() -> Form { Form::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()) }

  #[test]
  fn new_form_defaults_to_today() {
    let f = form();
    assert_eq!(f.date, "01/03/2026");
    assert_eq!(f.focus, Field::Date);
  }

  #[test]
  fn typing_goes_to_the_focused_text_field() {
    let mut f = form();
    f.focus = Field::Location;
    for c in "230".chars() {
      f.push_char(c);
    }
    f.backspace();
    assert_eq!(f.location_id, "23");

    // Choice fields ignore typing.
    f.focus = Field::Status;
    f.push_char('x');
    assert_eq!(f.status, Status::Scheduled);
  }

  #[test]
  fn choices_cycle_both_ways() {
    let mut f = form();
    f.focus = Field::Status;
    f.cycle(true);
    assert_eq!(f.status, Status::Unanswered);
    f.cycle(false);
    f.cycle(false);
    assert_eq!(f.status, Status::Closed);

    f.focus = Field::Category;
    f.cycle(false);
    assert_eq!(f.category, Category::Other);
  }

  #[test]
  fn focus_wraps() {
    let mut f = form();
    f.focus_prev();
    assert_eq!(f.focus, Field::Assignee);
    f.focus_next();
    assert_eq!(f.focus, Field::Date);
  }

  #[test]
  fn draft_trims_and_drops_blank_optionals() {
    let mut f = form();
    f.location_id = " 101 ".into();
    f.address = "   ".into();
    f.assignee = "Marta".into();
    let d = f.to_draft().unwrap();
    assert_eq!(d.date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    assert_eq!(d.location_id, "101");
    assert_eq!(d.address, None);
    assert_eq!(d.assignee.as_deref(), Some("Marta"));
  }

  #[test]
  fn bad_date_is_reported_not_sent() {
    let mut f = form();
    f.date = "2026-03-01".into();
    assert!(f.to_draft().is_err());
  }
}
