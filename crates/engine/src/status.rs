//! Lifecycle states shared by containers and caches

use std::fmt;

/// Lifecycle status of a container or cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentStatus {
    /// Built but never started
    Instantiated,
    Initializing,
    Running,
    Stopping,
    /// Stopped; may be started again
    Terminated,
    /// A start attempt failed
    Failed,
}

impl ComponentStatus {
    pub fn is_running(self) -> bool {
        self == ComponentStatus::Running
    }

    /// Whether a start request should do any work
    pub fn needs_start(self) -> bool {
        !matches!(self, ComponentStatus::Running | ComponentStatus::Initializing)
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentStatus::Instantiated => "INSTANTIATED",
            ComponentStatus::Initializing => "INITIALIZING",
            ComponentStatus::Running => "RUNNING",
            ComponentStatus::Stopping => "STOPPING",
            ComponentStatus::Terminated => "TERMINATED",
            ComponentStatus::Failed => "FAILED",
        };
        f.write_str(name)
    }
}
