//! Graph traversals and Dijkstra's shortest path.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use super::{Outcome, Recorder, StepProgram};
use crate::catalog::Algorithm;
use crate::error::{Error, Result};
use crate::model::{GraphModel, VisualModel};
use crate::step::{EdgeState, ElementId, Highlight, Mutation, NodeId, Step, StepKind};

fn id(i: usize) -> NodeId {
    NodeId(i as u64)
}

fn node(i: usize) -> ElementId {
    ElementId::Node(id(i))
}

fn edge(a: usize, b: usize) -> ElementId {
    ElementId::Edge(id(a), id(b))
}

fn check_node(graph: &GraphModel, i: usize, what: &str) -> Result<()> {
    if i < graph.len() {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "{} node {} does not exist in a graph of {}",
            what,
            i,
            graph.len()
        )))
    }
}

/// A copy of `graph` with its search marks cleared.
fn clean(graph: &GraphModel) -> GraphModel {
    let mut g = graph.clone();
    g.reset();
    g
}

fn mark_edge(rec: &mut Recorder<GraphModel>, a: usize, b: usize, state: EdgeState, lines: &[u32]) -> Result<()> {
    let (la, lb) = (rec.model().label(a).to_string(), rec.model().label(b).to_string());
    rec.emit(
        lines,
        Step::new(StepKind::Mutate, Highlight::Current)
            .on(edge(a, b))
            .mutate(Mutation::MarkEdge {
                from: id(a),
                to: id(b),
                state,
            })
            .says(format!("Take edge {}-{}", la, lb)),
    )
}

fn mark_visited(rec: &mut Recorder<GraphModel>, i: usize, highlight: Highlight, lines: &[u32], says: String) -> Result<()> {
    rec.emit(
        lines,
        Step::new(StepKind::Visit, highlight)
            .on(node(i))
            .mutate(Mutation::MarkVisited { node: id(i) })
            .operations(1)
            .says(says),
    )
}

/// Breadth-first search from `start`.
pub fn bfs(graph: &GraphModel, start: usize) -> Result<StepProgram> {
    check_node(graph, start, "start")?;
    let mut rec = Recorder::new(Algorithm::Bfs, clean(graph));
    let label = rec.model().label(start).to_string();
    mark_visited(&mut rec, start, Highlight::Start, &[2], format!("Start at {}", label))?;

    let mut order = Vec::new();
    let mut queue = VecDeque::from([start]);
    while let Some(u) = queue.pop_front() {
        let lu = rec.model().label(u).to_string();
        rec.emit(
            &[4, 5],
            Step::new(StepKind::Visit, Highlight::Visiting)
                .on(node(u))
                .says(format!("Visit {}", lu)),
        )?;
        order.push(u);

        let neighbors = rec.model().neighbors(u).to_vec();
        for (v, _) in neighbors {
            let lv = rec.model().label(v).to_string();
            rec.emit(
                &[6, 7],
                Step::new(StepKind::Examine, Highlight::Examining)
                    .on_all([edge(u, v), node(v)])
                    .compares(1)
                    .says(format!("Check neighbor {}", lv)),
            )?;
            if !rec.model().is_visited(v) {
                mark_edge(&mut rec, u, v, EdgeState::Visited, &[8])?;
                mark_visited(&mut rec, v, Highlight::Visited, &[8, 9], format!("Discover {}", lv))?;
                queue.push_back(v);
            }
        }
    }
    Ok(rec.finish(Outcome::Order { nodes: order }))
}

/// Depth-first search from `start` with an explicit stack.
///
/// Neighbours are pushed in reverse so they are popped in adjacency order.
pub fn dfs(graph: &GraphModel, start: usize) -> Result<StepProgram> {
    check_node(graph, start, "start")?;
    let mut rec = Recorder::new(Algorithm::Dfs, clean(graph));
    let label = rec.model().label(start).to_string();
    rec.emit(
        &[2],
        Step::new(StepKind::Examine, Highlight::Start)
            .on(node(start))
            .says(format!("Push {}", label)),
    )?;

    let mut order = Vec::new();
    let mut stack: Vec<(usize, Option<usize>)> = vec![(start, None)];
    while let Some((u, via)) = stack.pop() {
        let lu = rec.model().label(u).to_string();
        rec.emit(
            &[4],
            Step::new(StepKind::Examine, Highlight::Examining)
                .on(node(u))
                .says(format!("Pop {}", lu)),
        )?;
        if rec.model().is_visited(u) {
            rec.emit(
                &[5],
                Step::new(StepKind::Conclude, Highlight::None)
                    .on(node(u))
                    .says(format!("{} was already visited", lu)),
            )?;
            continue;
        }
        if let Some(p) = via {
            mark_edge(&mut rec, p, u, EdgeState::Visited, &[6])?;
        }
        mark_visited(&mut rec, u, Highlight::Visiting, &[6], format!("Visit {}", lu))?;
        order.push(u);

        let neighbors = rec.model().neighbors(u).to_vec();
        for &(v, _) in neighbors.iter().rev() {
            if !rec.model().is_visited(v) {
                let lv = rec.model().label(v).to_string();
                stack.push((v, Some(u)));
                rec.emit(
                    &[7, 8],
                    Step::new(StepKind::Examine, Highlight::Examining)
                        .on_all([edge(u, v), node(v)])
                        .says(format!("Push {}", lv)),
                )?;
            }
        }
    }
    Ok(rec.finish(Outcome::Order { nodes: order }))
}

/// Shortest path from `source` to `target`, stopping once the target is settled.
///
/// Ties on distance go to the lower node index.
pub fn dijkstra(graph: &GraphModel, source: usize, target: usize) -> Result<StepProgram> {
    check_node(graph, source, "source")?;
    check_node(graph, target, "target")?;
    let mut rec = Recorder::new(Algorithm::Dijkstra, clean(graph));
    let ls = rec.model().label(source).to_string();
    rec.emit(
        &[2, 3],
        Step::new(StepKind::Relax, Highlight::Start)
            .on(node(source))
            .mutate(Mutation::SetDistance {
                node: id(source),
                distance: 0,
                previous: None,
            })
            .says(format!("Distance to {} is 0", ls)),
    )?;

    let mut queue = BinaryHeap::from([Reverse((0u64, source))]);
    let mut reached = None;
    while let Some(Reverse((d, u))) = queue.pop() {
        let lu = rec.model().label(u).to_string();
        rec.emit(
            &[5],
            Step::new(StepKind::Examine, Highlight::Current)
                .on(node(u))
                .says(format!("Closest unsettled node is {} at {}", lu, d)),
        )?;
        if rec.model().is_visited(u) {
            rec.emit(
                &[6],
                Step::new(StepKind::Conclude, Highlight::None)
                    .on(node(u))
                    .says(format!("{} is already settled", lu)),
            )?;
            continue;
        }
        mark_visited(&mut rec, u, Highlight::Visited, &[7], format!("Settle {} at {}", lu, d))?;
        if u == target {
            rec.emit(
                &[8],
                Step::new(StepKind::Found, Highlight::End)
                    .on(node(u))
                    .says(format!("Reached {}", lu)),
            )?;
            reached = Some(d);
            break;
        }

        let neighbors = rec.model().neighbors(u).to_vec();
        for (v, w) in neighbors {
            if rec.model().is_visited(v) {
                continue;
            }
            let candidate = d
                .checked_add(w)
                .ok_or_else(|| Error::invalid(format!("distance to {} overflows", rec.model().label(v))))?;
            let current = rec.model().distance(v);
            let lv = rec.model().label(v).to_string();
            rec.emit(
                &[9, 10],
                Step::new(StepKind::Examine, Highlight::Examining)
                    .on_all([edge(u, v), node(v)])
                    .compares(1)
                    .says(match current {
                        Some(c) => format!("{} + {} = {} against {} for {}", d, w, candidate, c, lv),
                        None => format!("{} + {} = {} against ∞ for {}", d, w, candidate, lv),
                    }),
            )?;
            if current.map_or(true, |c| candidate < c) {
                rec.emit(
                    &[11, 12],
                    Step::new(StepKind::Relax, Highlight::Highlighted)
                        .on(node(v))
                        .mutate(Mutation::SetDistance {
                            node: id(v),
                            distance: candidate,
                            previous: Some(id(u)),
                        })
                        .operations(1)
                        .says(format!("Distance to {} is now {} via {}", lv, candidate, lu)),
                )?;
                queue.push(Reverse((candidate, v)));
            }
        }
    }

    let Some(distance) = reached else {
        let lt = rec.model().label(target).to_string();
        rec.emit(
            &[13],
            Step::new(StepKind::Conclude, Highlight::None)
                .on(node(target))
                .says(format!("{} cannot be reached", lt)),
        )?;
        return Ok(rec.finish(Outcome::Path {
            distance: None,
            nodes: Vec::new(),
        }));
    };

    let path = rec.model().path_to(target);
    for pair in path.windows(2) {
        rec.emit(
            &[13],
            Step::new(StepKind::Path, Highlight::Optimal)
                .on_all([edge(pair[0], pair[1]), node(pair[1])])
                .mutate(Mutation::MarkEdge {
                    from: id(pair[0]),
                    to: id(pair[1]),
                    state: EdgeState::Path,
                })
                .says(format!(
                    "{} comes after {} on the shortest path",
                    rec.model().label(pair[1]),
                    rec.model().label(pair[0])
                )),
        )?;
    }
    let route: Vec<&str> = path.iter().map(|&i| rec.model().label(i)).collect();
    let summary = format!("Shortest path {} has length {}", route.join(" → "), distance);
    rec.emit(
        &[13],
        Step::new(StepKind::Conclude, Highlight::Optimal)
            .on_all(path.iter().map(|&i| node(i)))
            .says(summary),
    )?;
    Ok(rec.finish(Outcome::Path {
        distance: Some(distance),
        nodes: path,
    }))
}
