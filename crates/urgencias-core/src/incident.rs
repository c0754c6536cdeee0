//! Incident records — the rows of the urgencias worksheet.
//!
//! The worksheet is a plain table of text cells; this module names its
//! columns and gives typed shapes to the two enumerated fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Column headers of the incident worksheet, in sheet order.
pub mod columns {
  pub const DATE: &str = "FECHA";
  pub const LOCATION: &str = "LOCAL";
  pub const ADDRESS: &str = "DIRECCION";
  pub const NEIGHBORHOOD: &str = "BARRIO";
  pub const STATUS: &str = "ESTADO";
  pub const CATEGORY: &str = "CATEGORIA";
  pub const DESCRIPTION: &str = "OBSERVACION";
  pub const ASSIGNEE: &str = "COLABORADOR";

  /// The full column set used when a worksheet has no header yet.
  pub const ALL: [&str; 8] = [
    DATE,
    LOCATION,
    ADDRESS,
    NEIGHBORHOOD,
    STATUS,
    CATEGORY,
    DESCRIPTION,
    ASSIGNEE,
  ];
}

/// Day/month/year, the format the sheet stores dates in.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Whether two column headers name the same column. Sheets are edited by hand,
/// so surrounding whitespace and ASCII case are ignored.
pub fn header_matches(a: &str, b: &str) -> bool {
  a.trim().eq_ignore_ascii_case(b.trim())
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where an incident stands. Serialised as the label stored in the sheet.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum Status {
  #[serde(rename = "Programado", alias = "scheduled")]
  #[strum(serialize = "Programado")]
  Scheduled,
  #[serde(rename = "Sin Respuesta", alias = "unanswered")]
  #[strum(serialize = "Sin Respuesta")]
  Unanswered,
  #[serde(rename = "En Proceso", alias = "in_progress")]
  #[strum(serialize = "En Proceso")]
  InProgress,
  #[serde(rename = "Cerrado", alias = "closed")]
  #[strum(serialize = "Cerrado")]
  Closed,
}

impl Status {
  /// The text written to the `ESTADO` column.
  pub fn label(self) -> &'static str { self.into() }

  /// Parse a cell value, ignoring surrounding whitespace.
  pub fn parse_label(s: &str) -> Result<Self> {
    s.trim()
      .parse()
      .map_err(|_| Error::UnknownStatus(s.to_owned()))
  }
}

// ─── Category ────────────────────────────────────────────────────────────────

/// What kind of problem an incident is about.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum Category {
  /// Building fabric: walls, roofs, doors.
  #[serde(rename = "Edilicio", alias = "facility")]
  #[strum(serialize = "Edilicio")]
  Facility,
  #[serde(rename = "Sanitario", alias = "sanitary")]
  #[strum(serialize = "Sanitario")]
  Sanitary,
  #[serde(rename = "Eléctrico", alias = "electrical")]
  #[strum(serialize = "Eléctrico")]
  Electrical,
  #[serde(rename = "Refrigeración", alias = "refrigeration")]
  #[strum(serialize = "Refrigeración")]
  Refrigeration,
  #[serde(rename = "Otro", alias = "other")]
  #[strum(serialize = "Otro")]
  Other,
}

impl Category {
  /// The text written to the `CATEGORIA` column.
  pub fn label(self) -> &'static str { self.into() }

  /// Parse a cell value, ignoring surrounding whitespace.
  pub fn parse_label(s: &str) -> Result<Self> {
    s.trim()
      .parse()
      .map_err(|_| Error::UnknownCategory(s.to_owned()))
  }
}

// ─── IncidentDraft ───────────────────────────────────────────────────────────

/// A new incident as entered in the form, before it becomes a worksheet row.
///
/// `location_id` is not validated. An empty location is stored as-is and never
/// shows up in the summary views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentDraft {
  pub date:         NaiveDate,
  pub location_id:  String,
  pub address:      Option<String>,
  pub neighborhood: Option<String>,
  pub status:       Status,
  pub category:     Category,
  pub description:  Option<String>,
  pub assignee:     Option<String>,
}

impl IncidentDraft {
  /// Convenience constructor with all optional text fields left empty.
  pub fn new(
    date: NaiveDate,
    location_id: impl Into<String>,
    status: Status,
    category: Category,
  ) -> Self {
    Self {
      date,
      location_id: location_id.into(),
      address: None,
      neighborhood: None,
      status,
      category,
      description: None,
      assignee: None,
    }
  }

  /// The draft as `(column header, cell)` pairs in sheet order. Empty text
  /// becomes a missing cell.
  pub fn cells(&self) -> [(&'static str, Option<String>); 8] {
    [
      (columns::DATE, Some(self.date.format(DATE_FORMAT).to_string())),
      (columns::LOCATION, non_blank(Some(&self.location_id))),
      (columns::ADDRESS, non_blank(self.address.as_ref())),
      (columns::NEIGHBORHOOD, non_blank(self.neighborhood.as_ref())),
      (columns::STATUS, Some(self.status.label().to_owned())),
      (columns::CATEGORY, Some(self.category.label().to_owned())),
      (columns::DESCRIPTION, non_blank(self.description.as_ref())),
      (columns::ASSIGNEE, non_blank(self.assignee.as_ref())),
    ]
  }
}

fn non_blank(s: Option<&String>) -> Option<String> {
  s.filter(|s| !s.trim().is_empty()).cloned()
}
