use thiserror::Error;

/// Failure talking to the platform API or a static resource host.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded with status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),
}

/// Failure while loading one paged or direct query result.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("response has no value at path '{path}'")]
    MissingPath { path: String },
    #[error("could not decode value at path '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("page size must be greater than zero")]
    InvalidPageSize,
    #[error("view was disposed before the load completed")]
    Disposed,
    #[error(transparent)]
    Ontology(#[from] OntologyError),
}

/// Failure while loading the static ontology resources.
#[derive(Debug, Error)]
pub enum OntologyError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("malformed ontology node on line {line}: {source}")]
    MalformedLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
