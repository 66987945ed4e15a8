//! Filter criteria and navigation vocabulary shared by every listing,
//! counting, and navigation operation.

use serde::{Deserialize, Serialize};

/// Optional criteria narrowing the set of sujets an operation sees.
///
/// Tag and people entries match by substring with OR semantics inside each
/// list; the two lists are combined with AND. Blank entries are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SujetFilter {
  pub tags:   Vec<String>,
  pub people: Vec<String>,
}

impl SujetFilter {
  pub fn new(tags: Vec<String>, people: Vec<String>) -> Self {
    Self { tags, people }
  }
}

/// Primary sort selector. `Id` walks the `(date_created, id)` key; `Random`
/// returns rows in a non-reproducible order and cannot be paginated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
  Id,
  Random,
}

/// Traversal direction of the `(date_created, id)` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  #[default]
  Asc,
  Desc,
}

impl SortOrder {
  /// The opposite traversal; `last` under one order is `first` under the
  /// other.
  pub fn flipped(self) -> Self {
    match self {
      SortOrder::Asc => SortOrder::Desc,
      SortOrder::Desc => SortOrder::Asc,
    }
  }
}

/// One step of sequential browsing relative to the current record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Next,
  Prev,
}
