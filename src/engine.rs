//! The final-orientation engine.
//!
//! Given a PAG skeleton with unresolved circle marks, `FciOrient` applies
//! the orientation rules R0 through R10 to a fixpoint. R0 seeds unshielded
//! colliders from the examination strategy; R1-R3 propagate arrowheads;
//! R4 consults discriminating paths; R5-R7 handle selection-bias tails and
//! R8-R10 complete tail orientation. The restricted (Spirtes) schedule runs
//! R1-R4 only and is arrow-complete; the complete (Zhang) schedule adds
//! R5-R10 and is also tail-complete.
//!
//! Every arrowhead the engine places passes the background-knowledge gate
//! `is_arrowhead_allowed`; mutation is monotone, resolving circles toward
//! arrows or tails and never back.

use crate::discriminating::DiscriminatingPath;
use crate::error::OrientError;
use crate::graph::{Endpoint, NodeId, PagGraph};
use crate::knowledge::Knowledge;
use crate::paths::{discriminating_paths_from, uncovered_circle_paths, uncovered_pd_paths};
use crate::strategy::{DataExaminationStrategy, PathResolution};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Cooperative cancellation handle. Clones share one flag; long-running
/// searches poll it and the engine exits between rule firings, leaving the
/// graph in a valid (partially oriented) state.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// May an arrowhead be placed at `y` on the edge between `x` and `y`?
///
/// Allowed when the mark is already an arrow (no-op), never when a tail is
/// fixed, and never when knowledge requires `y -> x`. When knowledge forbids
/// `x -> y`, the arrowhead is allowed only if `x` already carries one, so
/// the result is bidirected rather than `x -> y`.
pub fn is_arrowhead_allowed(
    graph: &PagGraph,
    x: NodeId,
    y: NodeId,
    knowledge: &Knowledge,
) -> bool {
    if !graph.is_adjacent_to(x, y) {
        return false;
    }
    let at_y = graph.get_endpoint(x, y);
    let at_x = graph.get_endpoint(y, x);

    if at_y == Some(Endpoint::Arrow) {
        return true;
    }
    if at_y == Some(Endpoint::Tail) {
        return false;
    }
    if knowledge.is_required(graph.name(y), graph.name(x)) {
        return false;
    }
    if knowledge.is_forbidden(graph.name(x), graph.name(y)) && at_x != Some(Endpoint::Arrow) {
        return false;
    }
    at_y == Some(Endpoint::Circle)
}

/// Engine configuration. `verbose` affects logging only, never the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrientConfig {
    /// Zhang's complete rule set R1-R10 (true) or the restricted,
    /// arrow-complete R1-R4 (false).
    pub complete_rule_set_used: bool,
    /// Bound on discriminating-path length; -1 means unlimited.
    pub max_path_length: i32,
    pub do_discriminating_path_collider_rule: bool,
    pub do_discriminating_path_tail_rule: bool,
    pub verbose: bool,
}

impl Default for OrientConfig {
    fn default() -> Self {
        OrientConfig {
            complete_rule_set_used: false,
            max_path_length: -1,
            do_discriminating_path_collider_rule: true,
            do_discriminating_path_tail_rule: true,
            verbose: false,
        }
    }
}

/// Rule-based orientation of a PAG skeleton.
pub struct FciOrient<S> {
    strategy: S,
    knowledge: Knowledge,
    complete_rule_set_used: bool,
    max_path_length: i32,
    do_discriminating_path_collider_rule: bool,
    do_discriminating_path_tail_rule: bool,
    verbose: bool,
    change_flag: bool,
    cancel: CancelFlag,
}

impl<S: DataExaminationStrategy> FciOrient<S> {
    /// Engine with the default configuration: restricted rule set,
    /// unbounded path length, both discriminating-path sub-rules enabled.
    pub fn new(strategy: S) -> Self {
        FciOrient {
            strategy,
            knowledge: Knowledge::new(),
            complete_rule_set_used: false,
            max_path_length: -1,
            do_discriminating_path_collider_rule: true,
            do_discriminating_path_tail_rule: true,
            verbose: false,
            change_flag: false,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_config(strategy: S, config: OrientConfig) -> Result<Self, OrientError> {
        if config.max_path_length < -1 {
            return Err(OrientError::InvalidMaxPathLength(config.max_path_length));
        }
        Ok(FciOrient {
            strategy,
            knowledge: Knowledge::new(),
            complete_rule_set_used: config.complete_rule_set_used,
            max_path_length: config.max_path_length,
            do_discriminating_path_collider_rule: config.do_discriminating_path_collider_rule,
            do_discriminating_path_tail_rule: config.do_discriminating_path_tail_rule,
            verbose: config.verbose,
            change_flag: false,
            cancel: CancelFlag::new(),
        })
    }

    pub fn set_knowledge(&mut self, knowledge: Knowledge) {
        self.knowledge = knowledge;
    }

    /// Restricted (false) runs R1-R4 only; complete (true) adds R5-R10.
    pub fn set_complete_rule_set_used(&mut self, complete: bool) {
        self.complete_rule_set_used = complete;
    }

    /// Bound on discriminating-path length; -1 means unlimited.
    pub fn set_max_path_length(&mut self, max_path_length: i32) -> Result<(), OrientError> {
        if max_path_length < -1 {
            return Err(OrientError::InvalidMaxPathLength(max_path_length));
        }
        self.max_path_length = max_path_length;
        Ok(())
    }

    pub fn set_discriminating_path_collider_rule(&mut self, on: bool) {
        self.do_discriminating_path_collider_rule = on;
    }

    pub fn set_discriminating_path_tail_rule(&mut self, on: bool) {
        self.do_discriminating_path_tail_rule = on;
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Handle callers can use to stop a long orientation from outside.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Did any rule fire since the flag was last cleared? Useful for
    /// callers driving the per-rule entry points themselves.
    pub fn is_change_flag(&self) -> bool {
        self.change_flag
    }

    pub fn set_change_flag(&mut self, flag: bool) {
        self.change_flag = flag;
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    pub fn into_strategy(self) -> S {
        self.strategy
    }

    /// Full orientation: R0, then the configured final-orientation schedule.
    pub fn orient(&mut self, graph: &mut PagGraph) -> Result<(), OrientError> {
        if self.max_path_length < -1 {
            return Err(OrientError::InvalidMaxPathLength(self.max_path_length));
        }
        self.rule_r0(graph)?;
        self.final_orientation(graph);
        Ok(())
    }

    /// R0: reset every mark to a circle, apply knowledge-forced marks, then
    /// orient each unshielded triple the strategy judges a collider.
    pub fn rule_r0(&mut self, graph: &mut PagGraph) -> Result<(), OrientError> {
        graph.reorient_all_with(Endpoint::Circle);
        self.fci_orient_bk(graph)?;

        for b in graph.nodes() {
            if self.cancel.is_cancelled() {
                break;
            }
            let adj = graph.adjacent_nodes(b);
            if adj.len() < 2 {
                continue;
            }
            for i in 0..adj.len() {
                for j in i + 1..adj.len() {
                    let (a, c) = (adj[i], adj[j]);
                    if graph.is_adjacent_to(a, c) {
                        continue;
                    }
                    if graph.is_def_collider(a, b, c) {
                        continue;
                    }
                    if !self.strategy.is_unshielded_collider(graph, a, b, c) {
                        continue;
                    }
                    if !is_arrowhead_allowed(graph, a, b, &self.knowledge)
                        || !is_arrowhead_allowed(graph, c, b, &self.knowledge)
                    {
                        continue;
                    }
                    self.set(graph, a, b, Endpoint::Arrow);
                    self.set(graph, c, b, Endpoint::Arrow);
                    debug!(
                        a = graph.name(a),
                        b = graph.name(b),
                        c = graph.name(c),
                        "R0: unshielded collider"
                    );
                }
            }
        }
        Ok(())
    }

    /// Apply forced orientations from background knowledge. A forbidden
    /// edge `from -> to` places an arrowhead at `from` (so `to *-> from`);
    /// a required edge orients `from --> to` outright. A mark already fixed
    /// the other way means the inputs admit no PAG, which is an error.
    pub fn fci_orient_bk(&mut self, graph: &mut PagGraph) -> Result<(), OrientError> {
        if self.verbose {
            info!("starting background-knowledge orientation");
        }
        let pairs: Vec<(String, String)> = self
            .knowledge
            .forbidden_edges()
            .map(|(f, t)| (f.to_string(), t.to_string()))
            .collect();
        for (from, to) in pairs {
            let (Some(f), Some(t)) = (graph.node_id(&from), graph.node_id(&to)) else {
                continue;
            };
            if !graph.is_adjacent_to(f, t) {
                continue;
            }
            // from cannot be an ancestor of to: arrowhead at from.
            self.force(graph, t, f, Endpoint::Arrow, &from, &to)?;
            debug!(%from, %to, "knowledge: forbidden edge oriented");
        }

        let pairs: Vec<(String, String)> = self
            .knowledge
            .required_edges()
            .map(|(f, t)| (f.to_string(), t.to_string()))
            .collect();
        for (from, to) in pairs {
            let (Some(f), Some(t)) = (graph.node_id(&from), graph.node_id(&to)) else {
                continue;
            };
            if !graph.is_adjacent_to(f, t) {
                continue;
            }
            self.force(graph, f, t, Endpoint::Arrow, &from, &to)?;
            self.force(graph, t, f, Endpoint::Tail, &from, &to)?;
            debug!(%from, %to, "knowledge: required edge oriented");
        }

        if self.verbose {
            info!("finished background-knowledge orientation");
        }
        Ok(())
    }

    fn force(
        &mut self,
        graph: &mut PagGraph,
        x: NodeId,
        y: NodeId,
        mark: Endpoint,
        from: &str,
        to: &str,
    ) -> Result<(), OrientError> {
        match graph.get_endpoint(x, y) {
            Some(current) if current == mark => Ok(()),
            Some(Endpoint::Circle) => {
                self.set(graph, x, y, mark);
                Ok(())
            }
            _ => Err(OrientError::InconsistentKnowledge {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }

    /// The configured final-orientation schedule; assumes R0 has run.
    pub fn final_orientation(&mut self, graph: &mut PagGraph) {
        if self.complete_rule_set_used {
            self.zhang_final_orientation(graph);
        } else {
            self.spirtes_final_orientation(graph);
        }
    }

    fn spirtes_final_orientation(&mut self, graph: &mut PagGraph) {
        self.change_flag = true;
        let mut first_time = true;

        while self.change_flag && !self.cancel.is_cancelled() {
            self.change_flag = false;
            self.rules_r1_r2_cycle(graph);
            self.rule_r3(graph);

            // R4 needs arrowheads already in place to find its triangles.
            if self.change_flag || (first_time && !self.knowledge.is_empty()) {
                self.rule_r4(graph);
                first_time = false;
            }

            if self.verbose {
                info!("orientation epoch finished");
            }
        }
    }

    fn zhang_final_orientation(&mut self, graph: &mut PagGraph) {
        self.spirtes_final_orientation(graph);

        if self.cancel.is_cancelled() {
            return;
        }

        // R5 need only run once; R6/R7 and then R8-R10 each run to their
        // own fixpoint (Zhang 2008, remarks on pp. 100-102).
        self.rule_r5(graph);

        self.change_flag = true;
        while self.change_flag && !self.cancel.is_cancelled() {
            self.change_flag = false;
            self.rule_r6(graph);
            self.rule_r7(graph);
        }

        self.change_flag = true;
        while self.change_flag && !self.cancel.is_cancelled() {
            self.change_flag = false;
            self.rules_r8_r9_r10(graph);
        }
    }

    /// One sweep of R1 and R2 over every ordered unshielded pair around
    /// each node.
    pub fn rules_r1_r2_cycle(&mut self, graph: &mut PagGraph) {
        for b in graph.nodes() {
            if self.cancel.is_cancelled() {
                break;
            }
            let adj = graph.adjacent_nodes(b);
            if adj.len() < 2 {
                continue;
            }
            for i in 0..adj.len() {
                for j in i + 1..adj.len() {
                    let (a, c) = (adj[i], adj[j]);
                    // Unordered pairs; each rule needs both orders.
                    self.rule_r1(graph, a, b, c);
                    self.rule_r1(graph, c, b, a);
                    self.rule_r2(graph, a, b, c);
                    self.rule_r2(graph, c, b, a);
                }
            }
        }
    }

    /// R1: `a *-> b o-* c` with `a, c` non-adjacent orients `b --> c`.
    pub fn rule_r1(&mut self, graph: &mut PagGraph, a: NodeId, b: NodeId, c: NodeId) {
        if graph.is_adjacent_to(a, c) {
            return;
        }
        if graph.get_endpoint(a, b) == Some(Endpoint::Arrow)
            && graph.get_endpoint(c, b) == Some(Endpoint::Circle)
        {
            if !is_arrowhead_allowed(graph, b, c, &self.knowledge) {
                return;
            }
            self.set(graph, c, b, Endpoint::Tail);
            self.set(graph, b, c, Endpoint::Arrow);
            debug!(b = graph.name(b), c = graph.name(c), "R1: away from collider");
        }
    }

    /// R2: `a --> b *-> c` or `a *-> b --> c`, with `a o-* c`, orients the
    /// circle at `c` into an arrowhead.
    pub fn rule_r2(&mut self, graph: &mut PagGraph, a: NodeId, b: NodeId, c: NodeId) {
        if !graph.is_adjacent_to(a, c) || graph.get_endpoint(a, c) != Some(Endpoint::Circle) {
            return;
        }
        let ab_arrow = graph.get_endpoint(a, b) == Some(Endpoint::Arrow);
        let bc_arrow = graph.get_endpoint(b, c) == Some(Endpoint::Arrow);
        let tail_at_a = graph.get_endpoint(b, a) == Some(Endpoint::Tail);
        let tail_at_b = graph.get_endpoint(c, b) == Some(Endpoint::Tail);

        if ab_arrow && bc_arrow && (tail_at_a || tail_at_b) {
            if !is_arrowhead_allowed(graph, a, c, &self.knowledge) {
                return;
            }
            self.set(graph, a, c, Endpoint::Arrow);
            debug!(a = graph.name(a), c = graph.name(c), "R2: away from ancestor");
        }
    }

    /// R3: `a *-> b <-* c`, `a *-o d o-* c`, `a, c` non-adjacent, and
    /// `d *-o b` orients `d *-> b`.
    pub fn rule_r3(&mut self, graph: &mut PagGraph) {
        for b in graph.nodes() {
            if self.cancel.is_cancelled() {
                break;
            }
            let adj = graph.adjacent_nodes(b);
            'next_d: for &d in &adj {
                if graph.get_endpoint(d, b) != Some(Endpoint::Circle) {
                    continue;
                }
                for &a in &adj {
                    if a == d {
                        continue;
                    }
                    for &c in &adj {
                        if c == a || c == d {
                            continue;
                        }
                        if !graph.is_def_collider(a, b, c) {
                            continue;
                        }
                        if graph.is_adjacent_to(a, c) {
                            continue;
                        }
                        if !graph.is_adjacent_to(a, d) || !graph.is_adjacent_to(c, d) {
                            continue;
                        }
                        if graph.get_endpoint(a, d) != Some(Endpoint::Circle)
                            || graph.get_endpoint(c, d) != Some(Endpoint::Circle)
                        {
                            continue;
                        }
                        if !is_arrowhead_allowed(graph, d, b, &self.knowledge) {
                            continue;
                        }
                        self.set(graph, d, b, Endpoint::Arrow);
                        debug!(d = graph.name(d), b = graph.name(b), "R3: double triangle");
                        continue 'next_d;
                    }
                }
            }
        }
    }

    /// R4: for each triangle `a <-* b o-> c` with `a --> c`, search for a
    /// discriminating path and orient the pivot per the strategy's verdict:
    /// a collider gets arrowheads at `b` on both triangle edges, a
    /// non-collider gets `b --> c`.
    pub fn rule_r4(&mut self, graph: &mut PagGraph) {
        if !self.do_discriminating_path_collider_rule && !self.do_discriminating_path_tail_rule {
            return;
        }
        if self.verbose {
            info!("R4: discriminating-path orientation started");
        }

        for b in graph.nodes() {
            if self.cancel.is_cancelled() {
                break;
            }
            // Triangle candidates: a with b *-> a, c with b o-> c.
            for a in graph.nodes_out_to(b, Endpoint::Arrow) {
                for c in graph.nodes_in_to(b, Endpoint::Circle) {
                    if !graph.is_parent_of(a, c) {
                        continue;
                    }
                    if graph.get_endpoint(b, c) != Some(Endpoint::Arrow) {
                        continue;
                    }
                    let paths = discriminating_paths_from(
                        graph,
                        a,
                        b,
                        c,
                        self.max_path_length,
                        &self.cancel,
                    );
                    for path in paths {
                        if self.apply_discriminating_path(graph, &path) {
                            break;
                        }
                    }
                }
            }
        }

        if self.verbose {
            info!("R4: discriminating-path orientation finished");
        }
    }

    /// Revalidate one discriminating path and, if the strategy can decide
    /// the pivot, apply the orientation. Returns true when a mark changed.
    fn apply_discriminating_path(
        &mut self,
        graph: &mut PagGraph,
        path: &DiscriminatingPath,
    ) -> bool {
        // Earlier firings may have consumed the triple.
        if !path.exists_in(graph) {
            return false;
        }
        let (a, b, c) = (path.a(), path.b(), path.c());

        let Some(resolution) = self.strategy.resolve_discriminating_path(graph, path) else {
            return false;
        };

        match resolution {
            PathResolution::Tail if self.do_discriminating_path_tail_rule => {
                self.set(graph, c, b, Endpoint::Tail);
                debug!(b = graph.name(b), c = graph.name(c), "R4: pivot is a non-collider");
                true
            }
            PathResolution::Collider if self.do_discriminating_path_collider_rule => {
                if !is_arrowhead_allowed(graph, a, b, &self.knowledge)
                    || !is_arrowhead_allowed(graph, c, b, &self.knowledge)
                {
                    return false;
                }
                self.set(graph, a, b, Endpoint::Arrow);
                self.set(graph, c, b, Endpoint::Arrow);
                debug!(
                    a = graph.name(a),
                    b = graph.name(b),
                    c = graph.name(c),
                    "R4: pivot is a collider"
                );
                true
            }
            _ => false,
        }
    }

    /// R5: for each `a o-o b` lying on an uncovered circle path whose ends
    /// are not shortcut-adjacent, orient the closing edge and the whole
    /// path as undirected. Records selection bias.
    pub fn rule_r5(&mut self, graph: &mut PagGraph) {
        for edge in graph.edges() {
            if self.cancel.is_cancelled() {
                break;
            }
            if edge.mark_x != Endpoint::Circle || edge.mark_y != Endpoint::Circle {
                continue;
            }
            let (x, y) = (edge.x, edge.y);
            // The edge may have been oriented by an earlier path this sweep.
            if graph.get_endpoint(x, y) != Some(Endpoint::Circle)
                || graph.get_endpoint(y, x) != Some(Endpoint::Circle)
            {
                continue;
            }
            for path in uncovered_circle_paths(graph, x, y) {
                if path.len() < 3 {
                    continue;
                }
                let first = path[1];
                let last = path[path.len() - 2];
                if graph.is_adjacent_to(x, last) || graph.is_adjacent_to(y, first) {
                    continue;
                }
                self.set(graph, x, y, Endpoint::Tail);
                self.set(graph, y, x, Endpoint::Tail);
                for w in path.windows(2) {
                    self.set(graph, w[0], w[1], Endpoint::Tail);
                    self.set(graph, w[1], w[0], Endpoint::Tail);
                }
                debug!(x = graph.name(x), y = graph.name(y), "R5: circle path undirected");
                break;
            }
        }
    }

    /// R6: `a --- b o-* c` orients the circle at `b` into a tail.
    pub fn rule_r6(&mut self, graph: &mut PagGraph) {
        for edge in graph.edges() {
            if edge.mark_x != Endpoint::Tail || edge.mark_y != Endpoint::Tail {
                continue;
            }
            for (a, b) in [(edge.x, edge.y), (edge.y, edge.x)] {
                for c in graph.adjacent_nodes(b) {
                    if c != a && graph.get_endpoint(c, b) == Some(Endpoint::Circle) {
                        self.set(graph, c, b, Endpoint::Tail);
                        debug!(b = graph.name(b), c = graph.name(c), "R6: single tail");
                    }
                }
            }
        }
    }

    /// R7: `a -o b o-* c` with `a, c` non-adjacent orients the circle at
    /// `b` into a tail.
    pub fn rule_r7(&mut self, graph: &mut PagGraph) {
        for edge in graph.edges() {
            for (a, b) in [(edge.x, edge.y), (edge.y, edge.x)] {
                if graph.get_endpoint(a, b) != Some(Endpoint::Circle)
                    || graph.get_endpoint(b, a) != Some(Endpoint::Tail)
                {
                    continue;
                }
                for c in graph.adjacent_nodes(b) {
                    if c != a
                        && !graph.is_adjacent_to(a, c)
                        && graph.get_endpoint(c, b) == Some(Endpoint::Circle)
                    {
                        self.set(graph, c, b, Endpoint::Tail);
                        debug!(b = graph.name(b), c = graph.name(c), "R7: single tail");
                    }
                }
            }
        }
    }

    /// One sweep of R8, R9, R10 over every `a o-> c` edge, trying each
    /// rule in order and stopping at the first that fires.
    pub fn rules_r8_r9_r10(&mut self, graph: &mut PagGraph) {
        for c in graph.nodes() {
            if self.cancel.is_cancelled() {
                break;
            }
            for a in graph.nodes_in_to(c, Endpoint::Arrow) {
                if graph.get_endpoint(c, a) != Some(Endpoint::Circle) {
                    continue;
                }
                // a o-> c.
                if !self.rule_r8(graph, a, c) && !self.rule_r9(graph, a, c) {
                    self.rule_r10(graph, a, c);
                }
            }
        }
    }

    fn is_partially_oriented(graph: &PagGraph, a: NodeId, c: NodeId) -> bool {
        graph.get_endpoint(a, c) == Some(Endpoint::Arrow)
            && graph.get_endpoint(c, a) == Some(Endpoint::Circle)
    }

    /// R8: `a --> b --> c` or `a -o b --> c`, with `a o-> c`, orients the
    /// circle at `a` into a tail, giving `a --> c`.
    pub fn rule_r8(&mut self, graph: &mut PagGraph, a: NodeId, c: NodeId) -> bool {
        if !Self::is_partially_oriented(graph, a, c) {
            return false;
        }
        let adj_c = graph.adjacent_nodes(c);
        for b in graph.adjacent_nodes(a) {
            if !adj_c.contains(&b) {
                continue;
            }
            let tail_at_a = graph.get_endpoint(b, a) == Some(Endpoint::Tail);
            let mark_at_b = graph.get_endpoint(a, b);
            let b_to_c = graph.get_endpoint(c, b) == Some(Endpoint::Tail)
                && graph.get_endpoint(b, c) == Some(Endpoint::Arrow);

            let first_leg = tail_at_a
                && (mark_at_b == Some(Endpoint::Arrow) || mark_at_b == Some(Endpoint::Circle));

            if first_leg && b_to_c {
                self.set(graph, c, a, Endpoint::Tail);
                debug!(a = graph.name(a), c = graph.name(c), "R8: directed through chain");
                return true;
            }
        }
        false
    }

    /// R9: `a o-> c` with an uncovered potentially-directed path from `a`
    /// to `c` whose second node is not adjacent to `c` orients `a --> c`.
    pub fn rule_r9(&mut self, graph: &mut PagGraph, a: NodeId, c: NodeId) -> bool {
        if !Self::is_partially_oriented(graph, a, c) {
            return false;
        }
        for path in uncovered_pd_paths(graph, a, c) {
            if path.len() < 3 {
                continue;
            }
            let second = path[1];
            if second == c || graph.is_adjacent_to(second, c) {
                continue;
            }
            self.set(graph, c, a, Endpoint::Tail);
            debug!(a = graph.name(a), c = graph.name(c), "R9: uncovered pd path");
            return true;
        }
        false
    }

    /// R10: `a o-> c` with `b --> c <-- d` and two uncovered potentially-
    /// directed paths from `a` to `b` and to `d` whose first steps are
    /// distinct and non-adjacent orients `a --> c`.
    pub fn rule_r10(&mut self, graph: &mut PagGraph, a: NodeId, c: NodeId) -> bool {
        if !Self::is_partially_oriented(graph, a, c) {
            return false;
        }
        let into_c: Vec<NodeId> = graph
            .nodes_in_to(c, Endpoint::Arrow)
            .into_iter()
            .filter(|&n| n != a)
            .collect();

        for i in 0..into_c.len() {
            for j in i + 1..into_c.len() {
                let (b, d) = (into_c[i], into_c[j]);
                if graph.get_endpoint(c, b) != Some(Endpoint::Tail)
                    || graph.get_endpoint(c, d) != Some(Endpoint::Tail)
                {
                    continue;
                }
                // b --> c <-- d.
                for p1 in uncovered_pd_paths(graph, a, b) {
                    let mu = p1[1];
                    if mu == c {
                        continue;
                    }
                    for p2 in uncovered_pd_paths(graph, a, d) {
                        let omega = p2[1];
                        if omega == c || mu == omega {
                            continue;
                        }
                        if graph.is_adjacent_to(mu, omega) {
                            continue;
                        }
                        self.set(graph, c, a, Endpoint::Tail);
                        debug!(a = graph.name(a), c = graph.name(c), "R10: two pd paths");
                        return true;
                    }
                }
            }
        }
        false
    }

    fn set(&mut self, graph: &mut PagGraph, x: NodeId, y: NodeId, mark: Endpoint) {
        // Edges are never added or removed during orientation, so the edge
        // is known to exist here.
        let _ = graph.set_endpoint(x, y, mark);
        self.change_flag = true;
    }
}
