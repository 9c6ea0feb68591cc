#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Host API unavailable: {0}")]
    Unavailable(String),
    #[error("Settings storage failed: {0}")]
    Storage(String),
    #[error("Clipboard write failed: {0}")]
    Clipboard(String),
    #[error("Graph query failed: {0}")]
    Query(String),
}
