//! Undirected, weighted graph in adjacency-map form.
//!
//! Every vertex maps to a map from neighbour to the edge joining them, and both endpoints
//! share a single stored [`Edge`]. Vertices are identified by handle, never by element, so
//! two vertices may carry equal elements.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use fnv::FnvHashMap;

use crate::error::{Error, Result};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

/// Handle to a vertex of one particular [`Graph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vertex {
    graph: u64,
    index: usize,
}

impl Vertex {
    /// Position of the vertex in insertion order.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.index)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    vertices: (Vertex, Vertex),
    weight: f64,
}

impl Edge {
    pub fn vertices(&self) -> (Vertex, Vertex) {
        self.vertices
    }

    pub fn start(&self) -> Vertex {
        self.vertices.0
    }

    pub fn end(&self) -> Vertex {
        self.vertices.1
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The endpoint that is not `v`, or `None` if `v` is not on this edge.
    pub fn opposite(&self, v: Vertex) -> Option<Vertex> {
        if self.vertices.0 == v {
            Some(self.vertices.1)
        } else if self.vertices.1 == v {
            Some(self.vertices.0)
        } else {
            None
        }
    }
}

type EdgeId = usize;

#[derive(Debug, Clone)]
pub struct Graph<E> {
    id: u64,
    elements: Vec<E>,
    structure: FnvHashMap<Vertex, FnvHashMap<Vertex, EdgeId>>,
    edges: Vec<Edge>,
    edge_count: usize,
}

impl<E> Graph<E> {
    pub fn new() -> Self {
        Self {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            elements: Vec::new(),
            structure: FnvHashMap::default(),
            edges: Vec::new(),
            edge_count: 0,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.structure.len()
    }

    /// Number of undirected edges; each is counted once.
    pub fn num_edges(&self) -> usize {
        self.edge_count
    }

    pub fn contains_vertex(&self, v: Vertex) -> bool {
        self.structure.contains_key(&v)
    }

    /// All vertices in insertion order.
    pub fn vertices(&self) -> impl DoubleEndedIterator<Item = Vertex> {
        let graph = self.id;
        (0..self.elements.len()).map(move |index| Vertex { graph, index })
    }

    pub fn element(&self, v: Vertex) -> Result<&E> {
        self.check(v)?;
        Ok(&self.elements[v.index])
    }

    /// Every edge once, reported from its start vertex.
    pub fn edges(&self) -> Vec<&Edge> {
        let mut edges = Vec::with_capacity(self.edges.len());
        for v in self.vertices() {
            for &id in self.structure[&v].values() {
                let edge = &self.edges[id];
                if edge.start() == v {
                    edges.push(edge);
                }
            }
        }
        edges
    }

    /// Edges incident to `v`, in adjacency-map order.
    pub fn get_edges(&self, v: Vertex) -> Result<impl Iterator<Item = &Edge> + '_> {
        let adjacent = self.structure.get(&v).ok_or(Error::MissingVertex(v))?;
        Ok(adjacent.values().map(move |&id| &self.edges[id]))
    }

    pub fn get_edge(&self, v: Vertex, w: Vertex) -> Option<&Edge> {
        self.structure
            .get(&v)
            .and_then(|adjacent| adjacent.get(&w))
            .map(|&id| &self.edges[id])
    }

    pub fn degree(&self, v: Vertex) -> Result<usize> {
        self.structure
            .get(&v)
            .map(|adjacent| adjacent.len())
            .ok_or(Error::MissingVertex(v))
    }

    /// Adds a new vertex, even when another vertex already carries an equal element.
    pub fn add_vertex(&mut self, element: E) -> Vertex {
        let v = Vertex {
            graph: self.id,
            index: self.elements.len(),
        };
        self.elements.push(element);
        self.structure.insert(v, FnvHashMap::default());
        v
    }

    /// Adds the edge `v`--`w`, replacing any edge already joining them.
    pub fn add_edge(&mut self, v: Vertex, w: Vertex, weight: f64) -> Result<&Edge> {
        self.check_edge(v, w, weight)?;

        let edge = Edge {
            vertices: (v, w),
            weight,
        };
        let id = match self.structure[&v].get(&w) {
            Some(&id) => {
                self.edges[id] = edge;
                id
            }
            None => {
                self.edges.push(edge);
                self.edge_count += 1;
                self.edges.len() - 1
            }
        };
        if let Some(adjacent) = self.structure.get_mut(&v) {
            adjacent.insert(w, id);
        }
        if let Some(adjacent) = self.structure.get_mut(&w) {
            adjacent.insert(v, id);
        }
        Ok(&self.edges[id])
    }

    /// Joins every pair in `pairs` with an edge of the same weight. Nothing is added unless
    /// every pair is valid.
    pub fn add_edge_pairs(&mut self, pairs: &[(Vertex, Vertex)], weight: f64) -> Result<()> {
        for &(v, w) in pairs {
            self.check_edge(v, w, weight)?;
        }
        for &(v, w) in pairs {
            self.add_edge(v, w, weight)?;
        }
        Ok(())
    }

    pub fn highest_degree_vertex(&self) -> Option<Vertex> {
        // Ties go to the earliest vertex.
        self.vertices()
            .rev()
            .max_by_key(|v| self.structure[v].len())
    }

    /// Vertices reachable from `start`, each mapped to the edge it was first reached by.
    pub fn depth_first_search(&self, start: Vertex) -> Result<FnvHashMap<Vertex, Option<&Edge>>> {
        let mut marked = FnvHashMap::default();
        marked.insert(start, None);
        let mut stack = vec![(start, self.get_edges(start)?)];

        while let Some((v, incident)) = stack.last_mut() {
            let v = *v;
            match incident.next() {
                Some(edge) => {
                    let Some(w) = edge.opposite(v) else { continue };
                    if !marked.contains_key(&w) {
                        marked.insert(w, Some(edge));
                        stack.push((w, self.get_edges(w)?));
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
        Ok(marked)
    }

    /// Like [`Graph::depth_first_search`], visiting vertices in order of hop count.
    pub fn breadth_first_search(&self, start: Vertex) -> Result<FnvHashMap<Vertex, Option<&Edge>>> {
        let mut marked = FnvHashMap::default();
        marked.insert(start, None);
        let mut queue = VecDeque::from([start]);

        while let Some(head) = queue.pop_front() {
            for edge in self.get_edges(head)? {
                let Some(w) = edge.opposite(head) else { continue };
                if !marked.contains_key(&w) {
                    marked.insert(w, Some(edge));
                    queue.push_back(w);
                }
            }
        }
        Ok(marked)
    }

    fn check_edge(&self, v: Vertex, w: Vertex, weight: f64) -> Result<()> {
        self.check(v)?;
        self.check(w)?;
        if v == w {
            return Err(Error::SelfLoop(v));
        }
        if !(weight.is_finite() && weight >= 0.0) {
            return Err(Error::InvalidWeight(weight));
        }
        Ok(())
    }

    fn check(&self, v: Vertex) -> Result<()> {
        if self.contains_vertex(v) {
            Ok(())
        } else {
            Err(Error::MissingVertex(v))
        }
    }
}

impl<E: PartialEq> Graph<E> {
    /// First vertex whose element equals `element`. Linear in the number of vertices.
    pub fn get_vertex_by_label(&self, element: &E) -> Option<Vertex> {
        self.vertices().find(|v| &self.elements[v.index] == element)
    }

    pub fn add_vertex_if_new(&mut self, element: E) -> Vertex {
        match self.get_vertex_by_label(&element) {
            Some(v) => v,
            None => self.add_vertex(element),
        }
    }
}

impl<E> Default for Graph<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: fmt::Display> fmt::Display for Graph<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|V| = {}; |E| = {}", self.num_vertices(), self.num_edges())?;
        write!(f, "\nVertices: ")?;
        for v in self.vertices() {
            write!(f, "{}-", self.elements[v.index])?;
        }
        write!(f, "\nEdges: ")?;
        for edge in self.edges() {
            let (v, w) = edge.vertices();
            write!(
                f,
                "({}--{} : {}) ",
                self.elements[v.index], self.elements[w.index], edge.weight
            )?;
        }
        Ok(())
    }
}
