use crate::graph::Vertex;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("priority queue is empty")]
    EmptyQueue,

    #[error("locator is not live in this priority queue")]
    InvalidLocator,

    #[error("vertex {0} is not in the graph")]
    MissingVertex(Vertex),

    #[error("edge weight must be finite and non-negative, got {0}")]
    InvalidWeight(f64),

    #[error("self-loop on vertex {0} is not allowed")]
    SelfLoop(Vertex),

    #[error("no vertex with label {0}")]
    UnknownLabel(String),

    #[error("destination {0} is not reachable from the source")]
    UnreachableDestination(Vertex),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
