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

mod support;

use memris::{CompiledQuery, Predicate, Value};
use support::{customer_repo, Customer};

#[test]
fn records_saved_in_one_arena_are_invisible_from_a_sibling_arena() {
    let factory = memris::Factory::default();
    let repo_a1 = customer_repo(&factory, "customer");
    let repo_a2 = customer_repo(&factory, "customer");

    repo_a1
        .save(Customer { id: 0, email: "only-in-a1@example.com".to_string(), name: "Grace".to_string() })
        .unwrap();

    let query = CompiledQuery::find()
        .with_predicate(Predicate::eq("email", Value::Str("only-in-a1@example.com".to_string())));

    assert_eq!(repo_a1.find_by(&query).unwrap().len(), 1);
    assert!(repo_a2.find_by(&query).unwrap().is_empty());
    assert_eq!(repo_a1.count(), 1);
    assert_eq!(repo_a2.count(), 0);
}
