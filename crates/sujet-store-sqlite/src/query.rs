//! Filter/query builder — composes an executable plan (SQL + parameters)
//! from optional criteria, without executing anything.
//!
//! Every listing, counting, and navigation operation in the store routes
//! through this module so filter semantics stay identical everywhere:
//! substring match with OR inside the tag and people lists, AND across the
//! two lists, blank entries ignored.

use rusqlite::types::Value;
use sujet_core::filter::{Direction, SortBy, SortOrder, SujetFilter};

/// Column list shared by every row-returning plan; [`RawSujet::from_row`]
/// reads positionally in this order.
///
/// [`RawSujet::from_row`]: crate::encode::RawSujet::from_row
pub const SUJET_COLUMNS: &str = "id, original_text, ai_suggestion, \
   user_notes, user_tags, person, status, view_count, date_created";

/// Primary sort key. Dates are `YYYY-MM-DD` text, so lexicographic order is
/// chronological, and the empty string places undated rows before every
/// dated one. Together with `id` as tiebreaker this totally orders the
/// table.
const SORT_KEY: &str = "COALESCE(date_created, '')";

/// A ready-to-execute query: SQL text plus positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
  pub sql:    String,
  pub params: Vec<Value>,
}

fn sql_order(order: SortOrder) -> &'static str {
  match order {
    SortOrder::Asc => "ASC",
    SortOrder::Desc => "DESC",
  }
}

/// `(col LIKE ? OR col LIKE ? ...)` over the non-blank values, or `None`
/// when nothing remains after dropping blanks.
fn like_group(
  column: &str,
  values: &[String],
  params: &mut Vec<Value>,
) -> Option<String> {
  let patterns: Vec<String> = values
    .iter()
    .map(|v| v.trim())
    .filter(|v| !v.is_empty())
    .map(|v| format!("%{v}%"))
    .collect();

  if patterns.is_empty() {
    return None;
  }

  let clause = vec![format!("{column} LIKE ?"); patterns.len()].join(" OR ");
  params.extend(patterns.into_iter().map(Value::Text));
  Some(format!("({clause})"))
}

/// `" WHERE ..."` (leading space included) or an empty string.
fn where_clause(filter: &SujetFilter) -> (String, Vec<Value>) {
  let mut params = Vec::new();
  let mut clauses = Vec::new();

  if let Some(c) = like_group("user_tags", &filter.tags, &mut params) {
    clauses.push(c);
  }
  if let Some(c) = like_group("person", &filter.people, &mut params) {
    clauses.push(c);
  }

  if clauses.is_empty() {
    (String::new(), params)
  } else {
    (format!(" WHERE {}", clauses.join(" AND ")), params)
  }
}

/// Row-returning plan under the requested ordering. Callers append their own
/// `LIMIT`/`OFFSET`.
pub fn select(filter: &SujetFilter, sort: SortBy, order: SortOrder) -> QueryPlan {
  let (wh, params) = where_clause(filter);
  let order_sql = match sort {
    SortBy::Random => " ORDER BY RANDOM()".to_owned(),
    SortBy::Id => {
      let d = sql_order(order);
      format!(" ORDER BY {SORT_KEY} {d}, id {d}")
    }
  };
  QueryPlan {
    sql: format!("SELECT {SUJET_COLUMNS} FROM sujets{wh}{order_sql}"),
    params,
  }
}

/// Count plan: same predicate, no ordering.
pub fn count(filter: &SujetFilter) -> QueryPlan {
  let (wh, params) = where_clause(filter);
  QueryPlan { sql: format!("SELECT COUNT(*) FROM sujets{wh}"), params }
}

/// Plan locating the single row adjacent to the `(cursor_date, cursor_id)`
/// key under the active filter.
///
/// "next" continues one step in the direction the sort order already
/// traverses; "prev" backs up one step. The walk direction of the `ORDER BY`
/// always faces away from the cursor so `LIMIT 1` yields the nearest row,
/// not the farthest.
pub fn adjacent(
  filter: &SujetFilter,
  order: SortOrder,
  direction: Direction,
  cursor_date: &str,
  cursor_id: i64,
) -> QueryPlan {
  let (comp, walk) = match (order, direction) {
    (SortOrder::Asc, Direction::Next) => (">", SortOrder::Asc),
    (SortOrder::Asc, Direction::Prev) => ("<", SortOrder::Desc),
    (SortOrder::Desc, Direction::Next) => ("<", SortOrder::Desc),
    (SortOrder::Desc, Direction::Prev) => (">", SortOrder::Asc),
  };

  let (wh, mut params) = where_clause(filter);
  let joiner = if wh.is_empty() { " WHERE" } else { " AND" };
  params.push(Value::Text(cursor_date.to_owned()));
  params.push(Value::Integer(cursor_id));

  let d = sql_order(walk);
  QueryPlan {
    sql: format!(
      "SELECT {SUJET_COLUMNS} FROM sujets{wh}{joiner} ({SORT_KEY}, id) {comp} (?, ?) \
       ORDER BY {SORT_KEY} {d}, id {d} LIMIT 1"
    ),
    params,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn filter(tags: &[&str], people: &[&str]) -> SujetFilter {
    SujetFilter::new(
      tags.iter().map(|s| s.to_string()).collect(),
      people.iter().map(|s| s.to_string()).collect(),
    )
  }

  fn text_params(plan: &QueryPlan) -> Vec<String> {
    plan
      .params
      .iter()
      .map(|v| match v {
        Value::Text(s) => s.clone(),
        other => format!("{other:?}"),
      })
      .collect()
  }

  #[test]
  fn select_without_criteria_has_no_where() {
    let plan = select(&SujetFilter::default(), SortBy::Id, SortOrder::Asc);
    assert_eq!(
      plan.sql,
      format!(
        "SELECT {SUJET_COLUMNS} FROM sujets \
         ORDER BY COALESCE(date_created, '') ASC, id ASC"
      )
    );
    assert!(plan.params.is_empty());
  }

  #[test]
  fn blank_entries_are_ignored() {
    let plan = select(&filter(&["", "  "], &[" "]), SortBy::Id, SortOrder::Asc);
    assert!(!plan.sql.contains("WHERE"));
    assert!(plan.params.is_empty());
  }

  #[test]
  fn tags_join_with_or() {
    let plan = select(&filter(&["AI", "Travel"], &[]), SortBy::Id, SortOrder::Asc);
    assert!(
      plan.sql.contains("WHERE (user_tags LIKE ? OR user_tags LIKE ?)"),
      "{}",
      plan.sql
    );
    assert_eq!(text_params(&plan), vec!["%AI%", "%Travel%"]);
  }

  #[test]
  fn tag_and_people_clauses_join_with_and() {
    let plan = select(&filter(&["AI"], &["S"]), SortBy::Id, SortOrder::Desc);
    assert!(
      plan
        .sql
        .contains("WHERE (user_tags LIKE ?) AND (person LIKE ?)"),
      "{}",
      plan.sql
    );
    assert_eq!(text_params(&plan), vec!["%AI%", "%S%"]);
    assert!(plan.sql.ends_with("ORDER BY COALESCE(date_created, '') DESC, id DESC"));
  }

  #[test]
  fn random_ordering_has_no_key() {
    let plan = select(&SujetFilter::default(), SortBy::Random, SortOrder::Asc);
    assert!(plan.sql.ends_with("ORDER BY RANDOM()"));
  }

  #[test]
  fn count_uses_same_predicate_without_ordering() {
    let plan = count(&filter(&["AI"], &[]));
    assert_eq!(plan.sql, "SELECT COUNT(*) FROM sujets WHERE (user_tags LIKE ?)");
    assert_eq!(text_params(&plan), vec!["%AI%"]);
  }

  #[test]
  fn adjacent_operator_follows_order_and_direction() {
    let cases = [
      (SortOrder::Asc, Direction::Next, ">", "ASC"),
      (SortOrder::Asc, Direction::Prev, "<", "DESC"),
      (SortOrder::Desc, Direction::Next, "<", "DESC"),
      (SortOrder::Desc, Direction::Prev, ">", "ASC"),
    ];
    for (order, direction, comp, walk) in cases {
      let plan = adjacent(&SujetFilter::default(), order, direction, "2024-01-01", 5);
      let expected = format!("(COALESCE(date_created, ''), id) {comp} (?, ?)");
      assert!(plan.sql.contains(&expected), "{}", plan.sql);
      assert!(
        plan.sql.ends_with(&format!(
          "ORDER BY COALESCE(date_created, '') {walk}, id {walk} LIMIT 1"
        )),
        "{}",
        plan.sql
      );
      assert_eq!(
        plan.params,
        vec![Value::Text("2024-01-01".into()), Value::Integer(5)]
      );
    }
  }

  #[test]
  fn adjacent_appends_cursor_after_filter_predicate() {
    let plan = adjacent(
      &filter(&["AI"], &[]),
      SortOrder::Asc,
      Direction::Next,
      "",
      2,
    );
    assert!(
      plan
        .sql
        .contains("WHERE (user_tags LIKE ?) AND (COALESCE(date_created, ''), id) > (?, ?)"),
      "{}",
      plan.sql
    );
    assert_eq!(
      plan.params,
      vec![Value::Text("%AI%".into()), Value::Text("".into()), Value::Integer(2)]
    );
  }
}
