//! Error types for the clustering index and the layer built on top of it.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LayerError>;

/// Errors raised by a [`crate::cluster::ClusterIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    #[error("no cluster with id {cluster_id}")]
    UnknownCluster { cluster_id: usize },
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LayerError {
    /// The position accessor returned nothing for the data point at `index`.
    #[error("data point {index} has no position")]
    MissingPosition { index: usize },

    #[error(transparent)]
    Cluster(#[from] ClusterError),
}
