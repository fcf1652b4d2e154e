//! Caller configuration for one transformation.

use clap::{Args, ValueEnum};

/// Which node kinds the traffic graph was built with.  Version grouping only
/// makes sense when per-version app nodes exist (`VersionedApp`), and app
/// grouping is meaningless on a pure service graph.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum GraphType {
    App,
    VersionedApp,
    Service,
    Workload,
}

impl GraphType {
    /// Wire label, part of the compatibility surface with the consuming
    /// visualization layer.
    pub fn name(&self) -> &'static str {
        match self {
            GraphType::App => "app",
            GraphType::VersionedApp => "versionedApp",
            GraphType::Service => "service",
            GraphType::Workload => "workload",
        }
    }
}

/// Compound-node grouping mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum GroupBy {
    None,
    App,
    Version,
}

impl GroupBy {
    pub fn name(&self) -> &'static str {
        match self {
            GroupBy::None => "none",
            GroupBy::App => "app",
            GroupBy::Version => "version",
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct GraphOptions {
    /// Compound-node grouping mode.
    #[clap(long, value_enum, default_value = "none")]
    pub group_by: GroupBy,

    /// Node kinds present in the traffic graph.
    #[clap(long, value_enum, default_value = "versioned-app")]
    pub graph_type: GraphType,

    /// Wall-clock time of the query, epoch seconds.
    #[clap(long, default_value_t = 0)]
    pub query_time: i64,

    /// Length of the query window, seconds.
    #[clap(long, default_value_t = 0)]
    pub duration_secs: i64,
}

impl GraphOptions {
    pub fn new(group_by: GroupBy, graph_type: GraphType) -> GraphOptions {
        GraphOptions {
            group_by,
            graph_type,
            query_time: 0,
            duration_secs: 0,
        }
    }
}
