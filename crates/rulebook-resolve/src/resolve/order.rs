//! Cycle-tolerant topological ordering.
//!
//! Orders rule names so that, in the acyclic case, every rule comes after the
//! rules it depends on. Cycles are legal in the rules language (they are
//! handled at evaluation time by `resolve circular reference`), so a
//! back-edge is skipped, never reported.
//!
//! # Design
//!
//! Iterative depth-first search with an explicit stack of
//! `(rule index, next dependency)` frames and a three-state [`Mark`] per
//! rule. Names are emitted in post-order. Roots are taken in rule-map order,
//! so the result is deterministic.
//!
//! # Examples
//!
//! ```
//! # use rulebook_ast::foundation::DottedName;
//! # use rulebook_resolve::resolve::order::topological_order;
//! # use rulebook_resolve::resolve::references::DependencyGraph;
//! let name = |s: &str| DottedName::parse(s);
//! let mut graph = DependencyGraph::new();
//! graph.insert(name("a"), vec![name("b")]);
//! graph.insert(name("b"), vec![name("c")]);
//! graph.insert(name("c"), vec![]);
//! assert_eq!(topological_order(&graph), vec![name("c"), name("b"), name("a")]);
//! ```

use super::references::DependencyGraph;
use rulebook_ast::foundation::DottedName;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Order every key of `graph`, dependencies first.
///
/// Edges to names that are not keys of `graph` are ignored. Every key appears
/// exactly once in the result, whatever the cycles.
pub fn topological_order(graph: &DependencyGraph) -> Vec<DottedName> {
    let mut marks = vec![Mark::Unvisited; graph.len()];
    let mut order = Vec::with_capacity(graph.len());
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..graph.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::InProgress;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (index, next) = *frame;
            let dependencies = &graph[index];

            if let Some(dependency) = dependencies.get(next) {
                frame.1 += 1;
                let Some(target) = graph.get_index_of(dependency) else {
                    continue;
                };
                match marks[target] {
                    Mark::Unvisited => {
                        marks[target] = Mark::InProgress;
                        stack.push((target, 0));
                    }
                    Mark::InProgress => {
                        trace!(dependency = %dependency, "cycle edge skipped");
                    }
                    Mark::Done => {}
                }
            } else {
                marks[index] = Mark::Done;
                if let Some((name, _)) = graph.get_index(index) {
                    order.push(name.clone());
                }
                stack.pop();
            }
        }
    }

    order
}
