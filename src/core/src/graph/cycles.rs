//! Whole-graph cycle detection
//!
//! Three-colour depth-first search:
//! - White: unvisited
//! - Grey: on the current DFS stack
//! - Black: fully visited
//!
//! A cycle exists if the search reaches a grey role. The search keeps an
//! explicit stack so arbitrarily deep hierarchies cannot exhaust the call
//! stack.

use super::RoleGraph;
use crate::error::{GraphError, Result};
use crate::types::{Relation, RoleIdx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Colour {
    White,
    Grey,
    Black,
}

impl RoleGraph {
    /// Check the edges of the given relations for cycles
    ///
    /// Roles are searched in arena order, so the reported cycle is
    /// deterministic for a given graph.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CircularDependency`] describing the first
    /// cycle found, e.g. `"a -> b -> a"`.
    pub fn detect_cycles(&self, follow: &[Relation]) -> Result<()> {
        let mut colour = vec![Colour::White; self.len()];

        for root in self.iter().map(|n| n.idx()) {
            if colour[root.index()] != Colour::White {
                continue;
            }

            // (role, cursor into its outgoing edges)
            let mut stack: Vec<(RoleIdx, usize)> = vec![(root, 0)];
            colour[root.index()] = Colour::Grey;

            while let Some(&(idx, cursor)) = stack.last() {
                let next = self.node(idx).edges_for(follow).nth(cursor);

                let Some(next) = next else {
                    colour[idx.index()] = Colour::Black;
                    stack.pop();
                    continue;
                };

                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }

                match colour[next.index()] {
                    Colour::Grey => {
                        let start = stack.iter().position(|(r, _)| *r == next).unwrap_or(0);
                        let cycle = stack[start..]
                            .iter()
                            .map(|(r, _)| r)
                            .chain(std::iter::once(&next))
                            .map(|r| self.id(*r));
                        return Err(GraphError::cycle(cycle));
                    }
                    Colour::White => {
                        colour[next.index()] = Colour::Grey;
                        stack.push((next, 0));
                    }
                    Colour::Black => {}
                }
            }
        }

        Ok(())
    }

    /// Check every relation for cycles
    pub fn validate_acyclic(&self) -> Result<()> {
        self.detect_cycles(&Relation::ALL)
    }
}
