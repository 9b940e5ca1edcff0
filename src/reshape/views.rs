//! View dataset shapes and their builders.
//!
//! The reshaper hands exactly one of these to the rendering collaborator:
//!
//! - [`ViewDataset::Counts`] - sorted (label, count) rows, feeds bar/pie/line
//! - [`ViewDataset::Contingency`] - respondent×answer matrix, feeds heatmaps
//! - [`ViewDataset::Network`] - tagged nodes + undirected edges, feeds graph
//!   layout
//! - [`ViewDataset::Long`] - the filtered long rows themselves
//!
//! The renderer never sees the wide table or the source files; everything it
//! needs (including the respondent/other coloring of graph nodes) travels
//! inside the dataset.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::models::Question;

// =============================================================================
// View Kind
// =============================================================================

/// The four output shapes a question can be reshaped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Category/answer occurrence counts, descending.
    Counts,
    /// Respondent×answer cross-tabulation (Q2 only).
    Contingency,
    /// Respondent-answer relation graph (Q2 only).
    Network,
    /// Filtered long-format rows, unaggregated.
    Long,
}

impl ViewKind {
    /// All view kinds, in presentation order.
    pub const ALL: [ViewKind; 4] = [
        ViewKind::Counts,
        ViewKind::Contingency,
        ViewKind::Network,
        ViewKind::Long,
    ];

    /// Parse a view-kind key, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "counts" => Some(Self::Counts),
            "contingency" => Some(Self::Contingency),
            "network" => Some(Self::Network),
            "long" => Some(Self::Long),
            _ => None,
        }
    }

    /// Canonical key for this view kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Counts => "counts",
            Self::Contingency => "contingency",
            Self::Network => "network",
            Self::Long => "long",
        }
    }

    /// Whether this view is offered for `question`.
    ///
    /// Cross-tabulation and the relation graph only make sense for Q2, where
    /// answers are people; UIs use this to grey out buttons, the engine uses
    /// it to reject the pair outright.
    pub fn available_for(&self, question: Question) -> bool {
        match self {
            Self::Counts | Self::Long => true,
            Self::Contingency | Self::Network => question == Question::Q2,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Dataset Shapes
// =============================================================================

/// One aggregated count row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRow {
    pub label: String,
    pub count: u64,
}

/// One un-pivoted answer row.
///
/// For Q1/Q3/Q4 `category` is the category label (`IT`, `Editorial`, ...)
/// and `answer` is the raw cell (`"Oui"` after filtering). For Q2 `category`
/// is the slot column (`Q2-Name3`) and `answer` the named person. For
/// Department both carry the department value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongRow {
    pub respondent: String,
    pub department: String,
    pub category: String,
    pub answer: String,
}

/// A non-zero cell of a contingency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyCell {
    pub respondent: String,
    pub answer: String,
    pub count: u64,
}

/// Sparse respondent×answer occurrence matrix.
///
/// Axis labels are sorted lexicographically; `cells` holds only non-zero
/// entries, row-major in axis order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyTable {
    pub respondents: Vec<String>,
    pub answers: Vec<String>,
    pub cells: Vec<ContingencyCell>,
}

/// Graph node classification, the only semantics the renderer needs for
/// node coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeTag {
    /// The name appears as an `A-Name` in the table.
    Respondent,
    /// The name was only ever named by others.
    Other,
}

/// A graph node with its membership tag attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub name: String,
    pub tag: NodeTag,
}

/// An undirected respondent→answer relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

/// Relation graph for the Q2 network view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// The reshaper's output, one variant per [`ViewKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", content = "data", rename_all = "lowercase")]
pub enum ViewDataset {
    Counts(Vec<CountRow>),
    Contingency(ContingencyTable),
    Network(RelationGraph),
    Long(Vec<LongRow>),
}

// =============================================================================
// Builders
// =============================================================================

/// Count label occurrences, descending by count.
///
/// Labels are accumulated in row order and sorted with a stable sort on the
/// count alone, so equal counts keep first-seen order - the documented
/// tie-break at the top-N boundary.
pub fn count_rows(rows: &[LongRow], question: Question) -> Vec<CountRow> {
    let mut order: Vec<CountRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let label = count_label(row, question);
        match index.get(label) {
            Some(&i) => order[i].count += 1,
            None => {
                index.insert(label, order.len());
                order.push(CountRow {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    order.sort_by(|a, b| b.count.cmp(&a.count));
    order
}

/// Which long-row field a count view aggregates on.
fn count_label(row: &LongRow, question: Question) -> &str {
    match question {
        // Q1/Q3/Q4 count "Oui" answers per category
        Question::Q1 | Question::Q3 | Question::Q4 => &row.category,
        // Department counts respondents per department, Q2 counts mentions
        Question::Department | Question::Q2 => &row.answer,
    }
}

/// Cross-tabulate respondents against answers.
pub fn contingency_table(rows: &[LongRow]) -> ContingencyTable {
    let mut cells: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    let mut answers: BTreeSet<&str> = BTreeSet::new();
    let mut respondents: BTreeSet<&str> = BTreeSet::new();

    for row in rows {
        respondents.insert(&row.respondent);
        answers.insert(&row.answer);
        *cells
            .entry((row.respondent.as_str(), row.answer.as_str()))
            .or_insert(0) += 1;
    }

    ContingencyTable {
        respondents: respondents.iter().map(|s| s.to_string()).collect(),
        answers: answers.iter().map(|s| s.to_string()).collect(),
        cells: cells
            .into_iter()
            .map(|((respondent, answer), count)| ContingencyCell {
                respondent: respondent.to_string(),
                answer: answer.to_string(),
                count,
            })
            .collect(),
    }
}

/// Build the relation graph: one node per distinct name, one undirected edge
/// per distinct (respondent, answer) pair, both in first-seen order.
///
/// `identity` is the Respondent Identity Set; membership decides the node
/// tag and nothing else.
pub fn relation_graph(rows: &[LongRow], identity: &HashSet<String>) -> RelationGraph {
    let mut nodes: Vec<GraphNode> = Vec::new();
    let mut seen_nodes: HashSet<&str> = HashSet::new();
    let mut edges: Vec<GraphEdge> = Vec::new();
    let mut seen_edges: HashSet<(&str, &str)> = HashSet::new();

    for row in rows {
        for name in [row.respondent.as_str(), row.answer.as_str()] {
            if seen_nodes.insert(name) {
                let tag = if identity.contains(name) {
                    NodeTag::Respondent
                } else {
                    NodeTag::Other
                };
                nodes.push(GraphNode {
                    name: name.to_string(),
                    tag,
                });
            }
        }

        // Undirected: (a, b) and (b, a) are the same edge
        let key = if row.respondent.as_str() <= row.answer.as_str() {
            (row.respondent.as_str(), row.answer.as_str())
        } else {
            (row.answer.as_str(), row.respondent.as_str())
        };
        if seen_edges.insert(key) {
            edges.push(GraphEdge {
                source: row.respondent.clone(),
                target: row.answer.clone(),
            });
        }
    }

    RelationGraph { nodes, edges }
}
