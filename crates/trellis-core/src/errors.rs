//! Error taxonomy for the reconciler
//!
//! Errors are classified at the collaborator boundary into tagged variants.
//! Callers branch on the variant (`is_unavailable`, `is_not_found`), never on
//! message text.
//!
//! - **Unavailable**: the cluster's control plane cannot be contacted right now.
//!   Tolerated during cascading removal.
//! - **NotFound**: the object is already absent. Treated as success.
//! - **Aggregate**: every other per-cluster failure of one removal, reported
//!   together.
//! - **Fatal**: a precondition of the whole operation failed (listing clusters,
//!   querying the index).

use std::fmt;

/// Error surfaced by a remote collaborator (registry, context provider, store).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The cluster cannot currently be reached
    #[error("Cluster unavailable: {cluster}: {reason}")]
    Unavailable {
        /// Cluster that could not be reached
        cluster: String,
        /// Reason reported by the transport
        reason: String,
    },

    /// The requested object does not exist
    #[error("Not found: {name}")]
    NotFound {
        /// Name of the missing object
        name: String,
    },

    /// The collaborator gave up waiting
    #[error("Operation '{operation}' timed out after {timeout_ms}ms")]
    Timeout {
        /// Operation that timed out
        operation: String,
        /// Timeout applied by the collaborator
        timeout_ms: u64,
    },

    /// Any other failure
    #[error("{message}")]
    Other {
        /// Failure description
        message: String,
    },
}

impl RemoteError {
    /// Create an unavailable-cluster error
    pub fn unavailable(cluster: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            cluster: cluster.into(),
            reason: reason.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether the cluster could not be contacted
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Whether the object was absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failure to query the binding index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Index '{index}' lookup failed: {message}")]
pub struct IndexError {
    /// Index that was queried
    pub index: String,
    /// Failure description
    pub message: String,
}

impl IndexError {
    /// Create an index error
    pub fn new(index: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            message: message.into(),
        }
    }
}

/// Failure to hand a binding to the reconciliation scheduler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Scheduler rejected enqueue: {message}")]
pub struct SchedulerError {
    /// Failure description
    pub message: String,
}

impl SchedulerError {
    /// Create a scheduler error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Step of the per-cluster cleanup at which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanupStage {
    /// Obtaining the cluster's execution context
    AcquireContext,
    /// Looking up the mirrored object
    Lookup,
    /// Deleting the mirrored object
    Delete,
}

impl fmt::Display for CleanupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::AcquireContext => "acquire context",
            Self::Lookup => "lookup",
            Self::Delete => "delete",
        };
        f.write_str(stage)
    }
}

/// One cluster's unexpected failure during cascading removal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cluster {cluster} ({stage}): {source}")]
pub struct ClusterFailure {
    /// Cluster the failure happened on
    pub cluster: String,
    /// Cleanup step that failed
    pub stage: CleanupStage,
    /// Underlying cause
    pub source: RemoteError,
}

/// Every unexpected per-cluster failure of a single removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateError {
    /// Template whose mirrors were being removed
    pub template: String,
    /// Failures, one per affected cluster
    pub failures: Vec<ClusterFailure>,
}

impl AggregateError {
    /// Names of the clusters that failed
    pub fn clusters(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.cluster.as_str()).collect()
    }

    /// Number of recorded failures
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Whether no failure was recorded
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "errors deleting downstream permission object '{}' ({} cluster(s)): [",
            self.template,
            self.failures.len()
        )?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        f.write_str("]")
    }
}

impl std::error::Error for AggregateError {}

/// Error returned by a template lifecycle entry point.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CascadeError {
    /// The cluster registry could not be listed; no cluster was visited
    #[error("Failed to list clusters: {0}")]
    ListClusters(#[source] RemoteError),

    /// The binding index could not be queried; nothing was enqueued
    #[error(transparent)]
    IndexLookup(#[from] IndexError),

    /// A dependent binding could not be enqueued
    #[error("Failed to enqueue binding {namespace}/{name}: {source}")]
    Enqueue {
        /// Binding namespace
        namespace: String,
        /// Binding name
        name: String,
        /// Scheduler failure
        #[source]
        source: SchedulerError,
    },

    /// One or more clusters failed during cascading removal
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

impl CascadeError {
    /// Whether the failure happened before any per-item work was attempted
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ListClusters(_) | Self::IndexLookup(_))
    }
}

/// Result type for lifecycle entry points
pub type CascadeResult<T> = std::result::Result<T, CascadeError>;

/// Failure to load or validate configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid TOML for this schema
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid config value for '{field}': {message}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        message: String,
    },
}
