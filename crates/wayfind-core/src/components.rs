//! Component analysis over the neighbor interface.

use crate::traits::{Edge, NodeId, PathGraph};

/// Connected components of an undirected graph, via iterative flood fill.
///
/// Impassable vertices are skipped entirely, so grid obstacles never show up
/// as spurious singleton components. Directed graphs should use
/// [`strongly_connected_components`] instead.
pub(crate) fn connected_components<G: PathGraph + ?Sized>(graph: &G) -> Vec<Vec<NodeId>> {
    let size = graph.size();
    let mut seen = vec![false; size];
    let mut components = Vec::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut nbuf: Vec<Edge> = Vec::new();

    for start in 0..size {
        if seen[start] || !graph.passable(start) {
            continue;
        }
        let mut component = vec![start];
        seen[start] = true;
        stack.clear();
        stack.push(start);

        while let Some(node) = stack.pop() {
            nbuf.clear();
            graph.neighbors_into(node, false, &mut nbuf);
            for edge in &nbuf {
                if !seen[edge.to] {
                    seen[edge.to] = true;
                    component.push(edge.to);
                    stack.push(edge.to);
                }
            }
        }
        components.push(component);
    }
    components
}

/// Strongly connected components via Kosaraju's two-pass algorithm, both
/// passes iterative.
pub(crate) fn strongly_connected_components<G: PathGraph + ?Sized>(graph: &G) -> Vec<Vec<NodeId>> {
    let size = graph.size();
    let mut nbuf: Vec<Edge> = Vec::new();

    // Pass 1: forward DFS, recording vertices in order of completion.
    enum Frame {
        Visit(NodeId),
        Finish(NodeId),
    }
    let mut seen = vec![false; size];
    let mut finished: Vec<NodeId> = Vec::with_capacity(size);
    let mut stack: Vec<Frame> = Vec::new();

    for start in 0..size {
        if seen[start] || !graph.passable(start) {
            continue;
        }
        stack.push(Frame::Visit(start));
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit(node) => {
                    if seen[node] {
                        continue;
                    }
                    seen[node] = true;
                    stack.push(Frame::Finish(node));
                    nbuf.clear();
                    graph.neighbors_into(node, false, &mut nbuf);
                    for edge in &nbuf {
                        if !seen[edge.to] {
                            stack.push(Frame::Visit(edge.to));
                        }
                    }
                }
                Frame::Finish(node) => finished.push(node),
            }
        }
    }

    // Pass 2: flood along reversed edges in reverse completion order.
    let mut assigned = vec![false; size];
    let mut components = Vec::new();
    let mut flood: Vec<NodeId> = Vec::new();

    for &root in finished.iter().rev() {
        if assigned[root] {
            continue;
        }
        let mut component = vec![root];
        assigned[root] = true;
        flood.clear();
        flood.push(root);

        while let Some(node) = flood.pop() {
            nbuf.clear();
            graph.neighbors_into(node, true, &mut nbuf);
            for edge in &nbuf {
                if !assigned[edge.to] && graph.passable(edge.to) {
                    assigned[edge.to] = true;
                    component.push(edge.to);
                    flood.push(edge.to);
                }
            }
        }
        components.push(component);
    }
    components
}
