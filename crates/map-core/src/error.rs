use std::fmt;

use thiserror::Error;

/// Construction-time collaborator a follow call found unset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dependency {
    CenteredSurface,
    PeripheralSurface,
    MarkerPrototype,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dependency::CenteredSurface => "centered display surface",
            Dependency::PeripheralSurface => "peripheral display surface",
            Dependency::MarkerPrototype => "marker prototype",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the registry. Fatal to the call, never to the host's
/// frame loop: data-quality problems (missing extents, non-unit scale,
/// dangling entities) are logged and degraded instead of raised.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("missing dependency: {0} is not configured")]
    MissingDependency(Dependency),
}
