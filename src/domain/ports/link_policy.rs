use crate::domain::entities::event::Event;

/// Pairwise decision used by the cluster builder.
///
/// Implementations must be symmetric: `should_link(a, b) == should_link(b, a)`.
pub trait LinkPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn should_link(&self, a: &Event, b: &Event) -> bool;
}
