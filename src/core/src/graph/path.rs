//! Relationship paths between two roles

use super::RoleGraph;
use crate::error::{GraphError, Result};
use crate::limits::TraversalLimits;
use crate::types::{Relation, RoleIdx};
use std::collections::HashSet;

/// One step of a relationship path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    /// Role reached by this step
    pub role: RoleIdx,

    /// Relation used to reach the role; `None` for the starting role
    pub relation: Option<Relation>,
}

#[derive(Default)]
struct PathSearch {
    path: Vec<RoleIdx>,
    on_path: HashSet<RoleIdx>,
    /// Roles fully searched without reaching the target
    exhausted: HashSet<RoleIdx>,
}

impl RoleGraph {
    /// First relationship path from `src` to `target`
    ///
    /// At each role the search tries inheritance parents first, then
    /// required roles, then permitted roles, and takes the first branch
    /// that reaches the target. The returned path starts with `src` and
    /// ends with `target`; it is `None` when the target is unreachable.
    ///
    /// Edges back onto the current path are skipped under either cycle
    /// policy; a path never repeats a role. Only the depth limit can fail
    /// the search.
    pub fn role_path(
        &self,
        src: RoleIdx,
        target: RoleIdx,
        limits: TraversalLimits,
    ) -> Result<Option<Vec<PathStep>>> {
        let mut search = PathSearch::default();
        let mut steps = Vec::new();

        let found = self.search_path(src, target, None, 0, limits, &mut search, &mut steps)?;

        if found {
            steps.reverse();
            Ok(Some(steps))
        } else {
            Ok(None)
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn search_path(
        &self,
        idx: RoleIdx,
        target: RoleIdx,
        relation: Option<Relation>,
        depth: usize,
        limits: TraversalLimits,
        search: &mut PathSearch,
        steps: &mut Vec<PathStep>,
    ) -> Result<bool> {
        if idx == target {
            steps.push(PathStep { role: idx, relation });
            return Ok(true);
        }

        search.path.push(idx);
        search.on_path.insert(idx);

        let node = self.node(idx);
        for next_relation in Relation::ALL {
            for &next in node.edges(next_relation) {
                if search.on_path.contains(&next) || search.exhausted.contains(&next) {
                    continue;
                }

                if depth + 1 > limits.max_depth {
                    return Err(GraphError::DepthExceeded {
                        role: self.id(next).clone(),
                        max_depth: limits.max_depth,
                    });
                }

                if self.search_path(
                    next,
                    target,
                    Some(next_relation),
                    depth + 1,
                    limits,
                    search,
                    steps,
                )? {
                    steps.push(PathStep { role: idx, relation });
                    return Ok(true);
                }
            }
        }

        search.path.pop();
        search.on_path.remove(&idx);
        search.exhausted.insert(idx);
        Ok(false)
    }
}
