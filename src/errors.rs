use std::fmt;

pub type Result<T> = std::result::Result<T, GraphError>;

/// Details payload so callers can report what went wrong without us needing
/// to thread the offending structures around.
#[derive(Debug, PartialEq)]
pub struct ErrorDetails {
    /// Stringified description of the lower level problem.
    pub message: String,
}

/// Errors surfaced by the transformation.  The engine is pure, so there is
/// nothing transient here: every variant describes a structural problem with
/// the input graph that will persist until the graph is rebuilt.
///
/// Malformed *metadata* (a value present under an expected key but with the
/// wrong dynamic shape) is intentionally not an error; the metadata accessors
/// degrade to "absent" and the corresponding output field is omitted.
#[derive(Debug, PartialEq)]
pub enum GraphError {
    /// The input graph violates its own structural contract, for example an
    /// edge referencing a destination id that is not present as a node.
    MalformedGraph(ErrorDetails),
}

impl GraphError {
    pub fn malformed(message: String) -> GraphError {
        GraphError::MalformedGraph(ErrorDetails { message })
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GraphError::MalformedGraph(details) => {
                write!(f, "malformed traffic graph: {}", details.message)
            }
        }
    }
}

impl std::error::Error for GraphError {}
