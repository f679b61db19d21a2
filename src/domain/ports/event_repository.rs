use crate::domain::entities::event::Event;
use crate::domain::error::DomainError;
use crate::domain::values::category::Category;
use crate::domain::values::cluster_id::ClusterId;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub since: Option<DateTime<Utc>>,
    pub unclustered_only: bool,
    pub category: Option<Category>,
    pub cluster_id: Option<ClusterId>,
    pub limit: Option<usize>,
}

impl EventFilter {
    /// Events from the last `hours_back` hours before `now`. A window
    /// reaching past the representable calendar has no lower bound.
    pub fn recent(now: DateTime<Utc>, hours_back: u32) -> Self {
        Self {
            since: Duration::try_hours(i64::from(hours_back))
                .and_then(|window| now.checked_sub_signed(window)),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct EventStats {
    pub total_events: usize,
    pub clustered_events: usize,
    pub distinct_clusters: usize,
    pub by_category: Vec<(String, usize)>,
}

/// Storage owned by the caller. The engine never writes through this
/// port itself; use cases do.
pub trait EventRepository: Send + Sync {
    /// Store events all-or-nothing. An event whose id is already stored is
    /// updated in place; a stored cluster id survives when the incoming
    /// event carries none.
    fn add_batch(&self, events: &[Event]) -> Result<usize, DomainError>;

    fn add(&self, event: &Event) -> Result<(), DomainError> {
        self.add_batch(std::slice::from_ref(event)).map(|_| ())
    }

    /// Events are returned in timestamp order (oldest first), then by id.
    fn query(&self, filter: &EventFilter) -> Result<Vec<Event>, DomainError>;
    /// Unknown ids are silently skipped.
    fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Event>, DomainError>;
    fn assign_clusters(&self, assignments: &[(String, ClusterId)]) -> Result<usize, DomainError>;
    fn stats(&self) -> Result<EventStats, DomainError>;
}
