//! Guarded depth-first walks and memoised closures

use super::{ClosureKey, RoleGraph, RoleNode};
use crate::error::{GraphError, Result};
use crate::limits::{CyclePolicy, TraversalLimits};
use crate::types::{Relation, RoleIdx};
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::debug;

/// Closure kinds that are memoised per role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClosureKind {
    /// All inheritance ancestors
    Inheritance,
    /// Direct requirements of the role and of every ancestor
    InheritedRequirements,
    /// Requirements reachable through inheritance and requirement edges
    Requirements,
    /// Permits of the role and of every ancestor
    Permits,
}

/// Per-walk bookkeeping
#[derive(Debug, Default)]
struct WalkState {
    /// Roles on the current DFS path, in order
    path: Vec<RoleIdx>,
    on_path: HashSet<RoleIdx>,
    /// Roles whose subtree has been fully walked
    done: HashSet<RoleIdx>,
}

impl WalkState {
    fn enter(&mut self, idx: RoleIdx) {
        self.path.push(idx);
        self.on_path.insert(idx);
    }

    fn leave(&mut self, idx: RoleIdx) {
        self.path.pop();
        self.on_path.remove(&idx);
        self.done.insert(idx);
    }
}

impl RoleGraph {
    /// Depth-first pre-order walk from `start`
    ///
    /// Edges are followed relation by relation in the order given by
    /// `follow`, and within a relation in declaration order. The visitor
    /// receives every reached role exactly once together with its depth
    /// (the start role has depth 0); returning `ControlFlow::Break` stops
    /// the walk immediately.
    ///
    /// Returns `true` if the visitor stopped the walk.
    ///
    /// # Errors
    ///
    /// - [`GraphError::CircularDependency`] when an edge leads back onto the
    ///   current path and the cycle policy is [`CyclePolicy::Reject`]
    /// - [`GraphError::DepthExceeded`] when a role lies deeper than
    ///   `limits.max_depth`
    pub fn walk<F>(
        &self,
        start: RoleIdx,
        follow: &[Relation],
        limits: TraversalLimits,
        mut visitor: F,
    ) -> Result<bool>
    where
        F: FnMut(&RoleNode, usize) -> ControlFlow<()>,
    {
        let mut state = WalkState::default();
        let flow = self.walk_from(start, 0, follow, limits, &mut state, &mut visitor)?;
        Ok(flow.is_break())
    }

    fn walk_from<F>(
        &self,
        idx: RoleIdx,
        depth: usize,
        follow: &[Relation],
        limits: TraversalLimits,
        state: &mut WalkState,
        visitor: &mut F,
    ) -> Result<ControlFlow<()>>
    where
        F: FnMut(&RoleNode, usize) -> ControlFlow<()>,
    {
        let node = self.node(idx);
        if visitor(node, depth).is_break() {
            return Ok(ControlFlow::Break(()));
        }

        state.enter(idx);

        for next in node.edges_for(follow) {
            if state.on_path.contains(&next) {
                match limits.cycle_policy {
                    CyclePolicy::Reject => {
                        let start = state.path.iter().position(|r| *r == next).unwrap_or(0);
                        let cycle = state.path[start..]
                            .iter()
                            .chain(std::iter::once(&next))
                            .map(|r| self.id(*r));
                        return Err(GraphError::cycle(cycle));
                    }
                    CyclePolicy::Tolerate => {
                        debug!(
                            "Skipping back edge {} -> {}",
                            self.id(idx),
                            self.id(next)
                        );
                        continue;
                    }
                }
            }

            if state.done.contains(&next) {
                continue;
            }

            if depth + 1 > limits.max_depth {
                return Err(GraphError::DepthExceeded {
                    role: self.id(next).clone(),
                    max_depth: limits.max_depth,
                });
            }

            if self
                .walk_from(next, depth + 1, follow, limits, state, visitor)?
                .is_break()
            {
                return Ok(ControlFlow::Break(()));
            }
        }

        state.leave(idx);
        Ok(ControlFlow::Continue(()))
    }

    /// Every inheritance ancestor of `role`, nearest first along each branch
    pub fn flattened_inheritance(
        &self,
        role: RoleIdx,
        limits: TraversalLimits,
    ) -> Result<Arc<[RoleIdx]>> {
        self.memoized(role, ClosureKind::Inheritance, limits, |graph| {
            let mut ancestors = Vec::new();
            graph.walk(role, &[Relation::Inherits], limits, |node, depth| {
                if depth > 0 {
                    ancestors.push(node.idx());
                }
                ControlFlow::Continue(())
            })?;
            Ok(ancestors)
        })
    }

    /// Direct requirements of `role` united with those of every ancestor
    pub fn inherited_requirements(
        &self,
        role: RoleIdx,
        limits: TraversalLimits,
    ) -> Result<Arc<[RoleIdx]>> {
        self.memoized(role, ClosureKind::InheritedRequirements, limits, |graph| {
            graph.gather_edges(role, &[Relation::Inherits], Relation::Requires, limits)
        })
    }

    /// Requirements reachable through inheritance and requirement edges
    ///
    /// Unlike [`inherited_requirements`](Self::inherited_requirements), a
    /// required role's own requirements (and its ancestors' requirements)
    /// are included too.
    pub fn flattened_requirements(
        &self,
        role: RoleIdx,
        limits: TraversalLimits,
    ) -> Result<Arc<[RoleIdx]>> {
        self.memoized(role, ClosureKind::Requirements, limits, |graph| {
            graph.gather_edges(
                role,
                &[Relation::Inherits, Relation::Requires],
                Relation::Requires,
                limits,
            )
        })
    }

    /// Permits of `role` united with those of every ancestor
    pub fn flattened_permits(
        &self,
        role: RoleIdx,
        limits: TraversalLimits,
    ) -> Result<Arc<[RoleIdx]>> {
        self.memoized(role, ClosureKind::Permits, limits, |graph| {
            graph.gather_edges(role, &[Relation::Inherits], Relation::Permits, limits)
        })
    }

    /// Collect the `pick` edges of every role reached by following `follow`
    fn gather_edges(
        &self,
        role: RoleIdx,
        follow: &[Relation],
        pick: Relation,
        limits: TraversalLimits,
    ) -> Result<Vec<RoleIdx>> {
        let mut gathered = Vec::new();
        let mut seen = HashSet::new();
        self.walk(role, follow, limits, |node, _| {
            for target in node.edges(pick) {
                if seen.insert(*target) {
                    gathered.push(*target);
                }
            }
            ControlFlow::Continue(())
        })?;
        Ok(gathered)
    }

    fn memoized<F>(
        &self,
        role: RoleIdx,
        kind: ClosureKind,
        limits: TraversalLimits,
        compute: F,
    ) -> Result<Arc<[RoleIdx]>>
    where
        F: FnOnce(&RoleGraph) -> Result<Vec<RoleIdx>>,
    {
        let key = ClosureKey { role, kind, limits };

        if let Some(hit) = self.closures.get(&key) {
            return Ok(Arc::clone(hit.value()));
        }

        let closure: Arc<[RoleIdx]> = compute(self)?.into();
        self.closures.insert(key, Arc::clone(&closure));
        Ok(closure)
    }
}
