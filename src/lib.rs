//! Shortest routes over road networks.
//!
//! The crate is built from two pieces: an [`AdaptablePriorityQueue`], a binary min-heap whose
//! elements can be re-keyed or removed through [`Locator`] handles, and [`dijkstra`], which
//! drives that queue over an undirected [`Graph`] to produce a [`SettledTable`] of shortest
//! distances and predecessors. [`RouteMap`] indexes a graph by label and turns settled tables
//! into routes, and [`reader`] loads route maps from text or CSV files.
//!
//! # Example
//!
//! ```rust
//! use routemap::{dijkstra, Graph};
//!
//! let mut graph = Graph::new();
//! let a = graph.add_vertex("A");
//! let b = graph.add_vertex("B");
//! let c = graph.add_vertex("C");
//! graph.add_edge(a, b, 1.0).unwrap();
//! graph.add_edge(b, c, 2.0).unwrap();
//! graph.add_edge(a, c, 4.0).unwrap();
//!
//! let table = dijkstra(&graph, a).unwrap();
//! assert_eq!(table.distance(c), Some(3.0));
//! assert_eq!(table.predecessor(c), Some(b));
//! ```

pub mod apq;
pub mod dijkstra;
pub mod error;
pub mod geo;
pub mod graph;
pub mod reader;
pub mod route_map;

pub use apq::{AdaptablePriorityQueue, Locator};
pub use dijkstra::{dijkstra, Settled, SettledTable};
pub use error::{Error, Result};
pub use geo::Coord;
pub use graph::{Edge, Graph, Vertex};
pub use route_map::{reconstruct_path, Route, RouteMap, Waypoint};
