//! Road-network view over a [`Graph`]: vertices looked up by label in O(1), optional
//! coordinates per vertex, and shortest routes between two labelled places.

use std::fmt;
use std::hash::Hash;

use fnv::FnvHashMap;
use hashbrown::HashMap;

use crate::dijkstra::{dijkstra, SettledTable};
use crate::error::{Error, Result};
use crate::geo::Coord;
use crate::graph::{Edge, Graph, Vertex};

/// Graphs at least this large are summarised instead of listed by `Display`.
const PRINT_LIMIT: usize = 100;

/// One stop on a route and the total cost from the source to it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub vertex: Vertex,
    pub cost: f64,
}

/// Waypoints from the source (cost 0) to the destination.
pub type Route = Vec<Waypoint>;

/// Walks predecessor links back from `destination` and returns the route in source order.
pub fn reconstruct_path(table: &SettledTable, destination: Vertex) -> Result<Route> {
    let mut route = Vec::new();
    let mut current = Some(destination);
    while let Some(v) = current {
        let settled = table
            .get(v)
            .ok_or(Error::UnreachableDestination(destination))?;
        route.push(Waypoint {
            vertex: v,
            cost: settled.distance,
        });
        current = settled.predecessor;
    }
    route.reverse();
    Ok(route)
}

#[derive(Debug, Clone)]
pub struct RouteMap<L> {
    graph: Graph<L>,
    index: HashMap<L, Vertex>,
    coords: FnvHashMap<Vertex, Coord>,
}

impl<L: Hash + Eq + Clone> RouteMap<L> {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            index: HashMap::new(),
            coords: FnvHashMap::default(),
        }
    }

    pub fn graph(&self) -> &Graph<L> {
        &self.graph
    }

    /// Adds a vertex for `label`. A repeated label gets a new vertex and the index moves to it.
    pub fn add_vertex(&mut self, label: L) -> Vertex {
        let v = self.graph.add_vertex(label.clone());
        self.index.insert(label, v);
        v
    }

    pub fn vertex(&self, label: &L) -> Option<Vertex> {
        self.index.get(label).copied()
    }

    pub fn add_edge(&mut self, v: Vertex, w: Vertex, weight: f64) -> Result<&Edge> {
        self.graph.add_edge(v, w, weight)
    }

    pub fn add_coords(&mut self, label: &L, lat: f64, lon: f64) -> Result<Vertex>
    where
        L: fmt::Display,
    {
        let v = self
            .vertex(label)
            .ok_or_else(|| Error::UnknownLabel(label.to_string()))?;
        self.coords.insert(v, Coord { lat, lon });
        Ok(v)
    }

    pub fn coords(&self, v: Vertex) -> Option<Coord> {
        self.coords.get(&v).copied()
    }

    pub fn label(&self, v: Vertex) -> Result<&L> {
        self.graph.element(v)
    }

    pub fn dijkstra(&self, source: Vertex) -> Result<SettledTable> {
        dijkstra(&self.graph, source)
    }

    pub fn shortest_path(&self, source: Vertex, destination: Vertex) -> Result<Route> {
        if !self.graph.contains_vertex(destination) {
            return Err(Error::MissingVertex(destination));
        }
        let table = self.dijkstra(source)?;
        reconstruct_path(&table, destination)
    }
}

impl<L: Hash + Eq + Clone> Default for RouteMap<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: fmt::Display> fmt::Display for RouteMap<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.graph.num_vertices() < PRINT_LIMIT && self.graph.num_edges() < PRINT_LIMIT {
            write!(f, "{}", self.graph)
        } else {
            write!(f, "The graph is too large to print.")
        }
    }
}
