//! Domain models for the survey engine.
//!
//! This module contains the core data structures shared by every pipeline
//! stage:
//!
//! - The fixed questionnaire schema (column order, categories, sentinels)
//! - [`Question`] - the five selectable questions
//! - [`Record`] - one respondent row, dense over the schema
//! - [`WideTable`] - ordered respondent rows, the flattener's output and the
//!   reshaper's input

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

// =============================================================================
// Questionnaire Schema
// =============================================================================

/// Closed set of department/category labels used by Q1, Q3 and Q4.
pub const CATEGORIES: [&str; 7] = [
    "IT",
    "Comptabilite",
    "Multimedia",
    "Gestion de projet",
    "Communication",
    "Editorial",
    "Administration",
];

/// Number of free-text name slots for Q2.
pub const Q2_SLOTS: usize = 9;

/// Respondent identity column.
pub const COL_NAME: &str = "A-Name";

/// Department column.
pub const COL_DEPARTMENT: &str = "Department";

/// Semantic "yes" for the boolean-answer questions (Q1/Q3/Q4).
pub const YES: &str = "Oui";

/// Sentinel meaning "no answer in this slot" for Q2 name columns.
pub const NO_ANSWER: &str = "----";

/// The full ordered column set, fixed at flatten time.
///
/// `A-Name`, `Department`, 7 `Q1-*`, 9 `Q2-Name*`, 7 `Q3-*`, 7 `Q4-*`.
pub static COLUMNS: Lazy<Vec<String>> = Lazy::new(|| {
    let mut cols = vec![COL_NAME.to_string(), COL_DEPARTMENT.to_string()];
    for cat in CATEGORIES {
        cols.push(format!("Q1-{cat}"));
    }
    for i in 1..=Q2_SLOTS {
        cols.push(format!("Q2-Name{i}"));
    }
    for cat in CATEGORIES {
        cols.push(format!("Q3-{cat}"));
    }
    for cat in CATEGORIES {
        cols.push(format!("Q4-{cat}"));
    }
    cols
});

static COLUMN_INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect()
});

/// Position of a column in the schema, if it is a schema column.
pub fn column_index(name: &str) -> Option<usize> {
    COLUMN_INDEX.get(name).copied()
}

// =============================================================================
// Question
// =============================================================================

/// The five selectable questions of the questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Question {
    /// Which department the respondent belongs to.
    Department,
    /// Departments the respondent would like to work with.
    Q1,
    /// People outside the department the respondent would like to work with.
    Q2,
    /// Departments the respondent would not like to work with.
    Q3,
    /// Departments the respondent thinks would not be interested in them.
    Q4,
}

impl Question {
    /// All questions, in selection order.
    pub const ALL: [Question; 5] = [
        Question::Department,
        Question::Q1,
        Question::Q2,
        Question::Q3,
        Question::Q4,
    ];

    /// Parse a question key, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "DEPARTMENT" => Some(Self::Department),
            "Q1" => Some(Self::Q1),
            "Q2" => Some(Self::Q2),
            "Q3" => Some(Self::Q3),
            "Q4" => Some(Self::Q4),
            _ => None,
        }
    }

    /// Canonical key for this question.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Department => "Department",
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
        }
    }

    /// Column prefix selecting this question's wide columns, including the
    /// dash (`"Q1-"`). `None` for Department, which is a single column.
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            Self::Department => None,
            Self::Q1 => Some("Q1-"),
            Self::Q2 => Some("Q2-"),
            Self::Q3 => Some("Q3-"),
            Self::Q4 => Some("Q4-"),
        }
    }

    /// Human-readable prompt, as printed on the original form (French).
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Department => "DÉPARTEMENTS QUI ONT LE PLUS RÉPONDU",
            Self::Q1 => "AVEC QUEL DÉPARTEMENT AIMERAIS-TU TRAVAILLER?",
            Self::Q2 => "AVEC QUI AIMERAIS-TU TRAVAILLER EN DEHORS DE TON DÉPARTEMENT?",
            Self::Q3 => "AVEC QUEL DÉPARTEMENT AIMERAIS-TU PAS TRAVAILLER?",
            Self::Q4 => {
                "À TON AVIS, QUEL DÉPARTEMENT NE TROUVERAIT PAS D'INTÉRÊT PROFESSIONNEL À TRAVAILLER AVEC TOI?"
            }
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Record
// =============================================================================

/// One respondent row, with a value slot for every schema column.
///
/// Absent fields hold the empty string, never a "missing" marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    values: Vec<String>,
}

impl Record {
    /// A record with every column set to the empty string.
    pub fn empty() -> Self {
        Self {
            values: vec![String::new(); COLUMNS.len()],
        }
    }

    /// Value of a schema column. `None` for unknown column names.
    pub fn get(&self, column: &str) -> Option<&str> {
        column_index(column).map(|i| self.values[i].as_str())
    }

    /// Overwrite a schema column. Returns `false` (and does nothing) for
    /// unknown column names - the deliberate "ignore unknown fields" rule.
    pub fn set(&mut self, column: &str, value: impl Into<String>) -> bool {
        match column_index(column) {
            Some(i) => {
                self.values[i] = value.into();
                true
            }
            None => false,
        }
    }

    /// All values, in schema column order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Respondent identity (`A-Name`), not guaranteed unique.
    pub fn name(&self) -> &str {
        &self.values[0]
    }

    /// Department answer.
    pub fn department(&self) -> &str {
        &self.values[1]
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// Wide Table
// =============================================================================

/// Ordered sequence of respondent records sharing the questionnaire schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WideTable {
    rows: Vec<Record>,
}

impl WideTable {
    /// An empty table (header only, once serialized).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, keeping source order.
    pub fn push(&mut self, record: Record) {
        self.rows.push(record);
    }

    /// The records, in order.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Number of respondents.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct `A-Name` values - the Respondent Identity Set.
    ///
    /// Recomputed from the rows on each call so it can never drift out of
    /// sync with the table contents.
    pub fn respondent_names(&self) -> HashSet<String> {
        self.rows.iter().map(|r| r.name().to_string()).collect()
    }
}

impl FromIterator<Record> for WideTable {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
