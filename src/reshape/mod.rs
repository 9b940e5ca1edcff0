//! View reshaping: wide table in, one view dataset out.
//!
//! ```text
//! ┌───────────┐  question   ┌────────────┐  view kind   ┌──────────────┐
//! │ WideTable │────────────▶│  long rows │─────────────▶│ ViewDataset  │
//! │ (32 cols) │ melt+filter │ (filtered) │  aggregate   │ (one of 4)   │
//! └───────────┘             └────────────┘              └──────────────┘
//! ```
//!
//! [`reshape`] is a pure function of its three arguments: no ambient state,
//! no caching, identical inputs give identical datasets. Every user action
//! (question change, view change, reload) simply calls it again.

pub mod top_n;
pub mod views;

use tracing::debug;

use crate::error::{ReshapeError, ReshapeResult};
use crate::models::{Question, WideTable, COLUMNS, NO_ANSWER, YES};
use views::{contingency_table, count_rows, relation_graph, LongRow, ViewDataset, ViewKind};

/// Parse a question key into a [`Question`].
pub fn parse_question(code: &str) -> ReshapeResult<Question> {
    Question::from_code(code).ok_or_else(|| ReshapeError::UnknownQuestion(code.to_string()))
}

/// Parse a view-kind key into a [`ViewKind`].
pub fn parse_view_kind(code: &str) -> ReshapeResult<ViewKind> {
    ViewKind::from_code(code).ok_or_else(|| ReshapeError::UnknownView(code.to_string()))
}

/// Reshape `table` into the `view` dataset for `question`.
///
/// Fails with [`ReshapeError::UnsupportedView`] for a (question, view) pair
/// the engine does not offer and with [`ReshapeError::EmptySource`] when the
/// table is empty or the question filter keeps no row - the latter is the
/// recoverable "render a placeholder" signal, not a crash.
pub fn reshape(table: &WideTable, question: Question, view: ViewKind) -> ReshapeResult<ViewDataset> {
    if !view.available_for(question) {
        return Err(ReshapeError::UnsupportedView { question, view });
    }
    if table.is_empty() {
        return Err(ReshapeError::EmptySource { question });
    }

    let rows = long_rows(table, question);
    debug!(%question, %view, rows = rows.len(), "reshaping");
    if rows.is_empty() {
        return Err(ReshapeError::EmptySource { question });
    }

    let dataset = match view {
        ViewKind::Counts => {
            let counts = count_rows(&rows, question);
            ViewDataset::Counts(top_n::truncate(counts, top_n::MAX_CATEGORIES))
        }
        ViewKind::Contingency => ViewDataset::Contingency(contingency_table(&rows)),
        ViewKind::Network => {
            ViewDataset::Network(relation_graph(&rows, &table.respondent_names()))
        }
        ViewKind::Long => ViewDataset::Long(rows),
    };
    Ok(dataset)
}

/// Un-pivot the question's wide columns into filtered long rows.
///
/// - Department: one row per respondent with a non-empty department.
/// - Q1/Q3/Q4: one row per (respondent, category) whose answer is `"Oui"`.
/// - Q2: one row per filled name slot, dropping the `"----"` sentinel and
///   blank slots.
pub fn long_rows(table: &WideTable, question: Question) -> Vec<LongRow> {
    let mut rows: Vec<LongRow> = Vec::new();

    match question {
        Question::Department => {
            for record in table.rows() {
                let department = record.department();
                if !department.is_empty() {
                    rows.push(LongRow {
                        respondent: record.name().to_string(),
                        department: department.to_string(),
                        category: "Department".to_string(),
                        answer: department.to_string(),
                    });
                }
            }
        }
        Question::Q2 => {
            let columns = question_columns(question);
            for record in table.rows() {
                for column in &columns {
                    let answer = record.get(column).unwrap_or_default();
                    if !answer.is_empty() && answer != NO_ANSWER {
                        rows.push(LongRow {
                            respondent: record.name().to_string(),
                            department: record.department().to_string(),
                            category: column.to_string(),
                            answer: answer.to_string(),
                        });
                    }
                }
            }
        }
        Question::Q1 | Question::Q3 | Question::Q4 => {
            let columns = question_columns(question);
            // prefix() is always Some for Q1/Q3/Q4
            let prefix = question.prefix().unwrap_or_default();
            for record in table.rows() {
                for column in &columns {
                    let answer = record.get(column).unwrap_or_default();
                    if answer == YES {
                        let category = column.strip_prefix(prefix).unwrap_or(column);
                        rows.push(LongRow {
                            respondent: record.name().to_string(),
                            department: record.department().to_string(),
                            category: category.to_string(),
                            answer: answer.to_string(),
                        });
                    }
                }
            }
        }
    }

    rows
}

/// The schema columns belonging to a prefixed question, in schema order.
fn question_columns(question: Question) -> Vec<&'static str> {
    match question.prefix() {
        Some(prefix) => COLUMNS
            .iter()
            .filter(|c| c.starts_with(prefix))
            .map(|c| c.as_str())
            .collect(),
        None => Vec::new(),
    }
}
