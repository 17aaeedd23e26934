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
use support::{product_repo, Product};

#[test]
fn equality_lookup_on_an_indexed_string_column_returns_the_one_match() {
    let factory = memris::Factory::default();
    let repo = product_repo(&factory, "product");

    repo.save(Product { id: 0, sku: "SKU-1".to_string(), price: 1000, stock: 10 }).unwrap();
    repo.save(Product { id: 0, sku: "SKU-2".to_string(), price: 2000, stock: 20 }).unwrap();

    let query = CompiledQuery::find().with_predicate(Predicate::eq("sku", Value::Str("SKU-2".to_string())));
    let found = repo.find_by(&query).unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].stock, 20);
}
