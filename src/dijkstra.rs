use hashbrown::HashMap;
use ordered_float::OrderedFloat;

use crate::apq::{AdaptablePriorityQueue, Locator};
use crate::error::{Error, Result};
use crate::graph::{Graph, Vertex};

/// Final shortest distance of a vertex and the vertex it was reached from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Settled {
    pub distance: f64,
    pub predecessor: Option<Vertex>,
}

/// Every vertex reached by one Dijkstra run, in the order the vertices were settled.
#[derive(Clone, Debug, Default)]
pub struct SettledTable {
    entries: HashMap<Vertex, Settled>,
    order: Vec<Vertex>,
}

impl SettledTable {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
        }
    }

    fn settle(&mut self, v: Vertex, settled: Settled) {
        self.entries.insert(v, settled);
        self.order.push(v);
    }

    pub fn get(&self, v: Vertex) -> Option<&Settled> {
        self.entries.get(&v)
    }

    pub fn contains(&self, v: Vertex) -> bool {
        self.entries.contains_key(&v)
    }

    pub fn distance(&self, v: Vertex) -> Option<f64> {
        self.get(v).map(|settled| settled.distance)
    }

    pub fn predecessor(&self, v: Vertex) -> Option<Vertex> {
        self.get(v).and_then(|settled| settled.predecessor)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in settle order, so distances never decrease.
    pub fn iter(&self) -> impl Iterator<Item = (Vertex, &Settled)> + '_ {
        self.order.iter().map(move |v| (*v, &self.entries[v]))
    }
}

/// Single-source shortest paths from `source` over non-negative edge weights.
///
/// Vertices move from unseen to open (in the queue, tentative distance) to closed
/// (in the returned table, final distance). Vertices never reached are absent from the table.
pub fn dijkstra<E>(graph: &Graph<E>, source: Vertex) -> Result<SettledTable> {
    if !graph.contains_vertex(source) {
        return Err(Error::MissingVertex(source));
    }

    let mut open = AdaptablePriorityQueue::new();
    let mut locs: HashMap<Vertex, Locator> = HashMap::new();
    let mut preds: HashMap<Vertex, Option<Vertex>> = HashMap::new();
    let mut closed = SettledTable::with_capacity(graph.num_vertices());

    preds.insert(source, None);
    locs.insert(source, open.add(OrderedFloat(0.0), source));

    while !open.is_empty() {
        let (OrderedFloat(distance), v) = open.remove_min()?;
        locs.remove(&v);
        let predecessor = preds.remove(&v).flatten();
        closed.settle(v, Settled { distance, predecessor });

        for edge in graph.get_edges(v)? {
            let Some(w) = edge.opposite(v) else { continue };
            if closed.contains(w) {
                continue;
            }
            let newcost = distance + edge.weight();
            match locs.get(&w) {
                None => {
                    preds.insert(w, Some(v));
                    locs.insert(w, open.add(OrderedFloat(newcost), w));
                }
                Some(&loc) => {
                    if OrderedFloat(newcost) < *open.get_key(loc)? {
                        preds.insert(w, Some(v));
                        open.update_key(loc, OrderedFloat(newcost))?;
                    }
                }
            }
        }
    }

    Ok(closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use priority_queue::PriorityQueue;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::cmp::Reverse;

    fn sample_graph() -> (Graph<char>, [Vertex; 4]) {
        let mut graph = Graph::new();
        let a = graph.add_vertex('A');
        let b = graph.add_vertex('B');
        let c = graph.add_vertex('C');
        let d = graph.add_vertex('D');
        graph.add_edge(a, b, 1.0).unwrap();
        graph.add_edge(b, c, 2.0).unwrap();
        graph.add_edge(a, c, 4.0).unwrap();
        graph.add_edge(c, d, 1.0).unwrap();
        (graph, [a, b, c, d])
    }

    #[test]
    fn sample_graph_distances_and_predecessors() {
        let (graph, [a, b, c, d]) = sample_graph();
        let table = dijkstra(&graph, a).unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.get(a), Some(&Settled { distance: 0.0, predecessor: None }));
        assert_eq!(table.get(b), Some(&Settled { distance: 1.0, predecessor: Some(a) }));
        assert_eq!(table.get(c), Some(&Settled { distance: 3.0, predecessor: Some(b) }));
        assert_eq!(table.get(d), Some(&Settled { distance: 4.0, predecessor: Some(c) }));
    }

    #[test]
    fn isolated_vertex_is_absent() {
        let (mut graph, [a, ..]) = sample_graph();
        let e = graph.add_vertex('E');
        let table = dijkstra(&graph, a).unwrap();

        assert!(!table.contains(e));
        assert_eq!(table.distance(e), None);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn settle_order_is_non_decreasing() {
        let (graph, [a, ..]) = sample_graph();
        let table = dijkstra(&graph, a).unwrap();
        let distances: Vec<f64> = table.iter().map(|(_, settled)| settled.distance).collect();
        assert_eq!(distances, vec![0.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn single_vertex_and_zero_weights() {
        let mut graph = Graph::new();
        let only = graph.add_vertex(0);
        let table = dijkstra(&graph, only).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.distance(only), Some(0.0));

        let next = graph.add_vertex(1);
        graph.add_edge(only, next, 0.0).unwrap();
        let table = dijkstra(&graph, next).unwrap();
        assert_eq!(table.distance(only), Some(0.0));
        assert_eq!(table.predecessor(only), Some(next));
    }

    #[test]
    fn missing_source_is_an_error() {
        let (graph, _) = sample_graph();
        let mut other = Graph::new();
        let stranger = other.add_vertex('Z');
        assert!(matches!(dijkstra(&graph, stranger), Err(Error::MissingVertex(v)) if v == stranger));
    }

    /// Lazy-deletion Dijkstra over the same graph, distances only.
    fn reference_distances<E>(graph: &Graph<E>, source: Vertex) -> HashMap<Vertex, f64> {
        let mut dist: HashMap<Vertex, f64> = HashMap::new();
        let mut pq = PriorityQueue::new();
        pq.push(source, Reverse(OrderedFloat(0.0)));
        while let Some((v, Reverse(OrderedFloat(cost)))) = pq.pop() {
            dist.insert(v, cost);
            for edge in graph.get_edges(v).unwrap() {
                let w = edge.opposite(v).unwrap();
                if !dist.contains_key(&w) {
                    pq.push_increase(w, Reverse(OrderedFloat(cost + edge.weight())));
                }
            }
        }
        dist
    }

    #[test]
    fn matches_reference_on_random_graphs() {
        for seed in 0..20_u64 {
            let mut rng = StdRng::seed_from_u64(0xD1E5_0000 + seed);
            let mut graph = Graph::new();
            let vs: Vec<_> = (0..60).map(|i| graph.add_vertex(i)).collect();
            for _ in 0..200 {
                let v = vs[rng.gen_range(0..vs.len())];
                let w = vs[rng.gen_range(0..vs.len())];
                if v != w {
                    graph.add_edge(v, w, rng.gen_range(0..1000) as f64).unwrap();
                }
            }

            let source = vs[seed as usize % vs.len()];
            let table = dijkstra(&graph, source).unwrap();
            let expected = reference_distances(&graph, source);

            assert_eq!(table.len(), expected.len(), "seed={seed}");
            for (v, settled) in table.iter() {
                assert_eq!(Some(&settled.distance), expected.get(&v), "seed={seed}");
                if let Some(p) = settled.predecessor {
                    let edge = graph.get_edge(p, v).unwrap();
                    assert_eq!(table.distance(p).unwrap() + edge.weight(), settled.distance);
                }
            }
        }
    }
}
