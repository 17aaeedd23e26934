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

//! A hash join between two in-memory slices, keyed by a caller-supplied
//! extraction function rather than a fixed column — this lets
//! `RepositoryCore::join` key on any `Value`, including one a caller
//! derives from more than one column for a composite key.

use ahash::AHashMap;
use memris_common::Value;

/// Builds a map from left-key to left rows, probes it with every right
/// row's key, and emits matching pairs in left-insertion-order within each
/// key, then right-insertion-order across keys.
pub fn hash_join<'a, L, R>(
    left: &'a [L],
    left_key: impl Fn(&L) -> Value,
    right: &'a [R],
    right_key: impl Fn(&R) -> Value,
) -> Vec<(&'a L, &'a R)> {
    let mut index: AHashMap<Value, Vec<&'a L>> = AHashMap::with_capacity(left.len());
    for l in left {
        index.entry(left_key(l)).or_default().push(l);
    }

    let mut pairs = Vec::new();
    for r in right {
        let key = right_key(r);
        if let Some(matches) = index.get(&key) {
            for l in matches {
                pairs.push((*l, r));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct Order {
        customer_id: i64,
        total: i64,
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Customer {
        id: i64,
        name: &'static str,
    }

    #[test]
    fn join_pairs_match_on_shared_key() {
        let customers = vec![Customer { id: 1, name: "Ada" }, Customer { id: 2, name: "Grace" }];
        let orders = vec![
            Order { customer_id: 1, total: 100 },
            Order { customer_id: 2, total: 200 },
            Order { customer_id: 1, total: 300 },
        ];
        let pairs = hash_join(
            &customers,
            |c| Value::I64(c.id),
            &orders,
            |o| Value::I64(o.customer_id),
        );
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].0.name, "Ada");
        assert_eq!(pairs[0].1.total, 100);
    }

    #[test]
    fn composite_key_join_via_derived_value() {
        let lefts = vec![("US", "CA", 1), ("US", "NY", 2)];
        let rights = vec![("US-CA", 100), ("US-NY", 200)];
        let pairs = hash_join(
            &lefts,
            |(country, state, _)| Value::Str(format!("{country}-{state}")),
            &rights,
            |(key, _)| Value::Str(key.to_string()),
        );
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn unmatched_rows_are_dropped() {
        let lefts = vec![1i64];
        let rights = vec![2i64];
        let pairs = hash_join(&lefts, |l| Value::I64(*l), &rights, |r| Value::I64(*r));
        assert!(pairs.is_empty());
    }
}
