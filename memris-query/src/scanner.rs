// Copyright 2024 Memris Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Full-table predicate evaluation, the scan fallback `RepositoryCore` takes
//! when no index covers the leading predicate term.

use memris_common::{EngineResult, RowId, Value};
use memris_storage::{Selection, Table};

use crate::predicate::{Operator, Predicate};

pub struct Scanner;

impl Scanner {
    /// Evaluates `predicate` over every live row of `table` in ascending row
    /// order, producing a [`Selection`].
    #[tracing::instrument(level = "debug", skip(table, predicate))]
    pub fn scan(table: &Table, predicate: &Predicate) -> EngineResult<Selection> {
        let mut ids = Vec::new();
        for row in 0..table.row_count() {
            if !table.is_live(row) {
                continue;
            }
            if Self::eval(table, predicate, row)? {
                ids.push(RowId::from_row_index(row, table.page_size()));
            }
        }
        Ok(Selection::new(ids))
    }

    /// Evaluates `predicate` against a pre-computed candidate selection
    /// (e.g. the output of an index probe), filtering out rows that don't
    /// also satisfy a remaining conjunctive term.
    pub fn filter(table: &Table, predicate: &Predicate, candidates: Selection) -> EngineResult<Selection> {
        let mut ids = Vec::with_capacity(candidates.len());
        for id in candidates.into_ids() {
            let row = id.to_row_index(table.page_size());
            if table.is_live(row) && Self::eval(table, predicate, row)? {
                ids.push(id);
            }
        }
        Ok(Selection::new(ids))
    }

    fn eval(table: &Table, predicate: &Predicate, row: usize) -> EngineResult<bool> {
        Ok(match predicate {
            Predicate::Comparison { column, op, value } => {
                let actual = table.get_value(column, row)?;
                Self::eval_comparison(&actual, *op, value.as_ref())
            }
            Predicate::Between { column, lower, upper } => {
                let actual = table.get_value(column, row)?;
                !actual.is_null() && &actual >= lower && &actual <= upper
            }
            Predicate::In { column, values } => {
                let actual = table.get_value(column, row)?;
                values.iter().any(|v| v == &actual)
            }
            Predicate::Not(inner) => !Self::eval(table, inner, row)?,
            Predicate::And(terms) => {
                for term in terms {
                    if !Self::eval(table, term, row)? {
                        return Ok(false);
                    }
                }
                true
            }
            Predicate::Or(terms) => {
                for term in terms {
                    if Self::eval(table, term, row)? {
                        return Ok(true);
                    }
                }
                false
            }
        })
    }

    fn eval_comparison(actual: &Value, op: Operator, operand: Option<&Value>) -> bool {
        match op {
            Operator::IsNull => actual.is_null(),
            Operator::IsNotNull => !actual.is_null(),
            Operator::IsTrue => actual.as_bool() == Some(true),
            Operator::IsFalse => actual.as_bool() == Some(false),
            Operator::Eq => operand.is_some_and(|v| actual == v),
            Operator::Neq => operand.is_some_and(|v| actual != v),
            Operator::Gt => !actual.is_null() && operand.is_some_and(|v| actual > v),
            Operator::Gte => !actual.is_null() && operand.is_some_and(|v| actual >= v),
            Operator::Lt => !actual.is_null() && operand.is_some_and(|v| actual < v),
            Operator::Lte => !actual.is_null() && operand.is_some_and(|v| actual <= v),
            Operator::After => !actual.is_null() && operand.is_some_and(|v| actual > v),
            Operator::Before => !actual.is_null() && operand.is_some_and(|v| actual < v),
            Operator::Like => operand
                .and_then(Value::as_str)
                .is_some_and(|pat| actual.as_str().is_some_and(|s| like_match(s, pat, false))),
            Operator::NotLike => !Self::eval_comparison(actual, Operator::Like, operand),
            Operator::StartingWith => operand
                .and_then(Value::as_str)
                .is_some_and(|pat| actual.as_str().is_some_and(|s| s.starts_with(pat))),
            Operator::EndingWith => operand
                .and_then(Value::as_str)
                .is_some_and(|pat| actual.as_str().is_some_and(|s| s.ends_with(pat))),
            // An empty needle is a substring of every non-null string, so
            // `containing("")` (and its ignore-case form) matches all of them.
            Operator::Containing => operand
                .and_then(Value::as_str)
                .is_some_and(|needle| actual.as_str().is_some_and(|s| s.contains(needle))),
            Operator::NotContaining => !Self::eval_comparison(actual, Operator::Containing, operand),
            Operator::IgnoreCase => {
                let actual_lower = actual.as_str().map(str::to_lowercase);
                let operand_lower = operand.and_then(Value::as_str).map(str::to_lowercase);
                match (actual_lower, operand_lower) {
                    (Some(a), Some(b)) => a.contains(&b),
                    _ => false,
                }
            }
        }
    }
}

/// `%` matches any run of characters (including none), `_` matches exactly
/// one character. No regex dependency: the wildcard grammar is fixed and
/// small enough for a direct recursive matcher.
fn like_match(text: &str, pattern: &str, ignore_case: bool) -> bool {
    let t: Vec<char> = if ignore_case {
        text.to_lowercase().chars().collect()
    } else {
        text.chars().collect()
    };
    let p: Vec<char> = if ignore_case {
        pattern.to_lowercase().chars().collect()
    } else {
        pattern.chars().collect()
    };
    like_match_chars(&t, &p)
}

fn like_match_chars(text: &[char], pattern: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('%') => {
            like_match_chars(text, &pattern[1..])
                || (!text.is_empty() && like_match_chars(&text[1..], pattern))
        }
        Some('_') => !text.is_empty() && like_match_chars(&text[1..], &pattern[1..]),
        Some(c) => text.first() == Some(c) && like_match_chars(&text[1..], &pattern[1..]),
    }
}
