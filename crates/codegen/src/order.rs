//! # Table Ordering
//!
//! Deterministic table orders for each kind of statement sequence.
//!
//! Foreign keys are never inlined in `CREATE TABLE`, so creation order does
//! not have to respect them and is simply alphabetical. Deleting rows is
//! different: without deferred constraints, children must be emptied before
//! their parents, so [`TableOrder::delete_order`] follows the real foreign
//! key graph.

use ddlgen_ir::Schema;
use std::collections::BTreeSet;

// ============================================================================
// TableOrder
// ============================================================================

/// Precomputed table orders for one schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOrder {
    /// Names ascending
    creation: Vec<String>,

    /// Parents before children, ties broken by name
    dependency: Vec<String>,
}

impl TableOrder {
    /// Compute all orders for a schema
    pub fn new(schema: &Schema) -> Self {
        let mut creation: Vec<String> = schema.tables.iter().map(|t| t.name.clone()).collect();
        creation.sort();

        let dependency = dependency_sorted(schema);

        Self {
            creation,
            dependency,
        }
    }

    /// Stable creation order: table names ascending
    pub fn creation_order(&self) -> &[String] {
        &self.creation
    }

    /// Exact reverse of [`creation_order`](Self::creation_order)
    pub fn drop_order(&self) -> Vec<String> {
        self.creation.iter().rev().cloned().collect()
    }

    /// Referenced tables before the tables that reference them
    pub fn dependency_order(&self) -> &[String] {
        &self.dependency
    }

    /// Children before parents: reverse of the dependency order
    pub fn delete_order(&self) -> Vec<String> {
        self.dependency.iter().rev().cloned().collect()
    }
}

// ============================================================================
// Internal: foreign-key topological sort
// ============================================================================

/// Kahn's algorithm over parent → child edges.
///
/// Tables are numbered in name order and the ready set is a `BTreeSet`, so
/// among tables whose parents are all placed the alphabetically first goes
/// next. Edges between tables of the same foreign key cycle are dropped
/// first; what remains is acyclic, and every table outside a cycle still
/// follows all of its parents.
fn dependency_sorted(schema: &Schema) -> Vec<String> {
    let graph = ForeignKeyGraph::new(schema);
    let component = graph.components();

    let mut in_degree = vec![0usize; graph.len()];
    for (parent, children) in graph.children.iter().enumerate() {
        for &child in children {
            if component[child] != component[parent] {
                in_degree[child] += 1;
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..graph.len())
        .filter(|&t| in_degree[t] == 0)
        .collect();
    let mut sorted: Vec<String> = Vec::with_capacity(graph.len());

    while let Some(next) = ready.pop_first() {
        sorted.push(graph.names[next].to_string());

        for &child in &graph.children[next] {
            if component[child] == component[next] {
                continue;
            }
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                ready.insert(child);
            }
        }
    }

    sorted
}

/// Foreign key graph with tables numbered by name
struct ForeignKeyGraph<'s> {
    names: Vec<&'s str>,
    /// Parent → children, self references left out
    children: Vec<BTreeSet<usize>>,
}

impl<'s> ForeignKeyGraph<'s> {
    fn new(schema: &'s Schema) -> Self {
        let mut names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();

        let mut children = vec![BTreeSet::new(); names.len()];
        for (child, parent) in schema.foreign_key_edges() {
            let child = names.binary_search(&child);
            let parent = names.binary_search(&parent);
            if let (Ok(child), Ok(parent)) = (child, parent) {
                if child != parent {
                    children[parent].insert(child);
                }
            }
        }

        Self { names, children }
    }

    fn len(&self) -> usize {
        self.names.len()
    }

    /// Strongly connected component of every table (Tarjan)
    fn components(&self) -> Vec<usize> {
        let mut tarjan = Tarjan {
            children: &self.children,
            index: vec![None; self.len()],
            low: vec![0; self.len()],
            stack: Vec::new(),
            on_stack: vec![false; self.len()],
            component: vec![0; self.len()],
            visited: 0,
            components: 0,
        };
        for table in 0..self.len() {
            if tarjan.index[table].is_none() {
                tarjan.visit(table);
            }
        }

        let mut sizes = vec![0usize; tarjan.components];
        for &c in &tarjan.component {
            sizes[c] += 1;
        }
        for (table, &c) in tarjan.component.iter().enumerate() {
            if sizes[c] > 1 {
                tracing::debug!(
                    table = self.names[table],
                    cycle = c,
                    "table is on a foreign key cycle"
                );
            }
        }

        tarjan.component
    }
}

struct Tarjan<'g> {
    children: &'g [BTreeSet<usize>],
    index: Vec<Option<usize>>,
    low: Vec<usize>,
    stack: Vec<usize>,
    on_stack: Vec<bool>,
    component: Vec<usize>,
    visited: usize,
    components: usize,
}

impl Tarjan<'_> {
    fn visit(&mut self, node: usize) {
        let index = self.visited;
        self.visited += 1;
        self.index[node] = Some(index);
        self.low[node] = index;
        self.stack.push(node);
        self.on_stack[node] = true;

        let children = self.children;
        for &child in &children[node] {
            match self.index[child] {
                None => {
                    self.visit(child);
                    self.low[node] = self.low[node].min(self.low[child]);
                }
                Some(child_index) if self.on_stack[child] => {
                    self.low[node] = self.low[node].min(child_index);
                }
                Some(_) => {}
            }
        }

        if self.low[node] == index {
            while let Some(member) = self.stack.pop() {
                self.on_stack[member] = false;
                self.component[member] = self.components;
                if member == node {
                    break;
                }
            }
            self.components += 1;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ddlgen_ir::{Column, ColumnType, Constraint, Table};

    fn table(name: &str) -> Table {
        Table::new(name).with_column(Column::new("id", ColumnType::Integer))
    }

    fn references(mut child: Table, parent: &str) -> Table {
        child.constraints.push(Constraint::foreign_key(
            None,
            vec!["id".into()],
            parent,
            vec!["id".into()],
        ));
        child
    }

    #[test]
    fn test_creation_order_is_alphabetical() {
        let schema = Schema {
            tables: vec![table("visit"), table("person"), table("care_site")],
        };
        let order = TableOrder::new(&schema);
        assert_eq!(order.creation_order(), ["care_site", "person", "visit"]);
        assert_eq!(order.drop_order(), vec!["visit", "person", "care_site"]);
    }

    #[test]
    fn test_delete_order_children_first() {
        let schema = Schema {
            tables: vec![table("a"), references(table("b"), "a")],
        };
        let order = TableOrder::new(&schema);
        assert_eq!(order.dependency_order(), ["a", "b"]);
        assert_eq!(order.delete_order(), vec!["b", "a"]);
    }

    #[test]
    fn test_dependency_beats_alphabet() {
        // "alpha" references "zulu", so zulu must come first.
        let schema = Schema {
            tables: vec![references(table("alpha"), "zulu"), table("zulu"), table("mike")],
        };
        let order = TableOrder::new(&schema);
        assert_eq!(order.creation_order(), ["alpha", "mike", "zulu"]);
        assert_eq!(order.dependency_order(), ["mike", "zulu", "alpha"]);
        assert_eq!(order.delete_order(), vec!["alpha", "zulu", "mike"]);
    }

    #[test]
    fn test_chain() {
        let schema = Schema {
            tables: vec![
                references(table("c"), "b"),
                references(table("b"), "a"),
                table("a"),
            ],
        };
        let order = TableOrder::new(&schema);
        assert_eq!(order.dependency_order(), ["a", "b", "c"]);
        assert_eq!(order.delete_order(), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_self_reference_ignored() {
        let schema = Schema {
            tables: vec![references(table("node"), "node")],
        };
        let order = TableOrder::new(&schema);
        assert_eq!(order.dependency_order(), ["node"]);
    }

    #[test]
    fn test_cycle_is_broken_by_name() {
        let schema = Schema {
            tables: vec![
                references(table("b"), "a"),
                references(table("a"), "b"),
                references(table("c"), "a"),
            ],
        };
        let order = TableOrder::new(&schema);
        assert_eq!(order.dependency_order(), ["a", "b", "c"]);
        assert_eq!(order.delete_order(), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_child_of_cycle_deleted_before_parent() {
        // x and y reference each other; a references x from outside the cycle.
        let schema = Schema {
            tables: vec![
                references(table("a"), "x"),
                references(table("x"), "y"),
                references(table("y"), "x"),
            ],
        };
        let order = TableOrder::new(&schema);
        let delete = order.delete_order();
        let position = |name: &str| delete.iter().position(|t| t == name).unwrap();
        assert!(position("a") < position("x"));
        assert_eq!(order.dependency_order(), ["x", "a", "y"]);
    }

    #[test]
    fn test_cycle_waits_for_outside_parent() {
        // Two cycles {b, c} and {m, n}; b also references m.
        let schema = Schema {
            tables: vec![
                references(references(table("b"), "c"), "m"),
                references(table("c"), "b"),
                references(table("m"), "n"),
                references(table("n"), "m"),
                references(table("z"), "c"),
            ],
        };
        let order = TableOrder::new(&schema);
        let dependency = order.dependency_order();
        let position = |name: &str| dependency.iter().position(|t| t == name).unwrap();
        assert!(position("m") < position("b"));
        assert!(position("c") < position("z"));
        assert_eq!(dependency, ["c", "m", "b", "n", "z"]);
    }

    #[test]
    fn test_orders_are_stable() {
        let schema = Schema {
            tables: vec![
                references(table("x"), "y"),
                table("y"),
                references(table("w"), "y"),
            ],
        };
        let first = TableOrder::new(&schema);
        for _ in 0..5 {
            assert_eq!(TableOrder::new(&schema), first);
        }
    }

    #[test]
    fn test_empty_schema() {
        let order = TableOrder::new(&Schema::new());
        assert!(order.creation_order().is_empty());
        assert!(order.delete_order().is_empty());
    }
}
