use crate::domain::entities::event::Event;
use crate::domain::error::DomainError;
use crate::domain::ports::event_repository::*;
use crate::domain::values::category::Category;
use crate::domain::values::cluster_id::ClusterId;
use crate::domain::values::score::Score;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;
use tracing::warn;

const SELECT_COLS: &str = "id, timestamp, summary, full_text, lat, lon, location_name, category, sentiment, confidence_score, relevance_score, source_list, entity_list, cluster_id";

/// Fixed-width UTC timestamps so string order equals time order.
fn ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub struct SqliteEventRepo {
    conn: Mutex<Connection>,
}

impl SqliteEventRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_event(row: &rusqlite::Row) -> Result<Event, rusqlite::Error> {
        let id: String = row.get(0)?;
        let timestamp_str: String = row.get(1)?;
        let category_str: String = row.get(7)?;
        let sentiment_str: Option<String> = row.get(8)?;
        let confidence: Option<f64> = row.get(9)?;
        let relevance: Option<f64> = row.get(10)?;
        let sources_str: String = row.get(11)?;
        let entities_str: String = row.get(12)?;
        let cluster_str: Option<String> = row.get(13)?;

        // A stored event without a readable timestamp cannot be matched on
        // time, so it is dropped rather than defaulted.
        let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(Event {
            id,
            timestamp,
            summary: row.get(2)?,
            full_text: row.get(3)?,
            lat: row.get(4)?,
            lon: row.get(5)?,
            location_name: row.get(6)?,
            category: Category::classify(&category_str),
            sentiment: sentiment_str.and_then(|s| s.parse().ok()),
            confidence_score: confidence.map(Score::new),
            relevance_score: relevance.map(Score::new),
            source_list: serde_json::from_str(&sources_str).unwrap_or_default(),
            entity_list: serde_json::from_str(&entities_str).unwrap_or_default(),
            cluster_id: cluster_str.map(ClusterId::new),
        })
    }

    fn collect_rows(
        rows: impl Iterator<Item = Result<Event, rusqlite::Error>>,
    ) -> Vec<Event> {
        rows.filter_map(|r| match r {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, "skipping unreadable event row");
                None
            }
        })
        .collect()
    }
}

impl EventRepository for SqliteEventRepo {
    fn add_batch(&self, events: &[Event]) -> Result<usize, DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        {
            // Re-imports refresh content but never drop an existing grouping.
            let mut stmt = tx
                .prepare(
                    "INSERT INTO events (id, timestamp, summary, full_text, lat, lon, location_name, category, sentiment, confidence_score, relevance_score, source_list, entity_list, cluster_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                     ON CONFLICT(id) DO UPDATE SET
                        timestamp = excluded.timestamp,
                        summary = excluded.summary,
                        full_text = excluded.full_text,
                        lat = excluded.lat,
                        lon = excluded.lon,
                        location_name = excluded.location_name,
                        category = excluded.category,
                        sentiment = excluded.sentiment,
                        confidence_score = excluded.confidence_score,
                        relevance_score = excluded.relevance_score,
                        source_list = excluded.source_list,
                        entity_list = excluded.entity_list,
                        cluster_id = COALESCE(excluded.cluster_id, events.cluster_id)",
                )
                .map_err(|e| DomainError::Database(e.to_string()))?;
            for event in events {
                stmt.execute(params![
                    event.id,
                    ts(&event.timestamp),
                    event.summary,
                    event.full_text,
                    event.lat,
                    event.lon,
                    event.location_name,
                    event.category.to_string(),
                    event.sentiment.map(|s| s.to_string()),
                    event.confidence_score.map(|s| s.value()),
                    event.relevance_score.map(|s| s.value()),
                    serde_json::to_string(&event.source_list)?,
                    serde_json::to_string(&event.entity_list)?,
                    event.cluster_id.as_ref().map(|c| c.to_string()),
                ])
                .map_err(|e| DomainError::Database(format!("Failed to add event {}: {e}", event.id)))?;
            }
        }
        tx.commit()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(events.len())
    }

    fn query(&self, filter: &EventFilter) -> Result<Vec<Event>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut sql = format!("SELECT {} FROM events WHERE 1=1", SELECT_COLS);
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(since) = &filter.since {
            sql.push_str(&format!(" AND timestamp >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(ts(since)));
        }
        if filter.unclustered_only {
            sql.push_str(" AND cluster_id IS NULL");
        }
        if let Some(cat) = &filter.category {
            sql.push_str(&format!(" AND category = ?{}", param_values.len() + 1));
            param_values.push(Box::new(cat.to_string()));
        }
        if let Some(cluster) = &filter.cluster_id {
            sql.push_str(&format!(" AND cluster_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(cluster.to_string()));
        }

        sql.push_str(" ORDER BY timestamp ASC, id ASC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT ?{}", param_values.len() + 1));
            param_values.push(Box::new(limit as i64));
        }

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params_refs.as_slice(), Self::row_to_event)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(Self::collect_rows(rows))
    }

    fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Event>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!("SELECT {} FROM events WHERE id = ?1", SELECT_COLS);
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let mut events = Vec::with_capacity(ids.len());
        for id in ids {
            let row = stmt
                .query_row(params![id], Self::row_to_event)
                .optional();
            match row {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(e) => warn!(id = %id, error = %e, "skipping unreadable event row"),
            }
        }
        Ok(events)
    }

    fn assign_clusters(&self, assignments: &[(String, ClusterId)]) -> Result<usize, DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut updated = 0;
        {
            let mut stmt = tx
                .prepare("UPDATE events SET cluster_id = ?1 WHERE id = ?2")
                .map_err(|e| DomainError::Database(e.to_string()))?;
            for (event_id, cluster_id) in assignments {
                updated += stmt
                    .execute(params![cluster_id.to_string(), event_id])
                    .map_err(|e| DomainError::Database(format!("Failed to assign cluster: {e}")))?;
            }
        }
        tx.commit()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(updated)
    }

    fn stats(&self) -> Result<EventStats, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let total: usize = conn
            .query_row("SELECT COUNT(*) FROM events", [], |r| r.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let clustered: usize = conn
            .query_row(
                "SELECT COUNT(*) FROM events WHERE cluster_id IS NOT NULL",
                [],
                |r| r.get(0),
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let distinct_clusters: usize = conn
            .query_row(
                "SELECT COUNT(DISTINCT cluster_id) FROM events WHERE cluster_id IS NOT NULL",
                [],
                |r| r.get(0),
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare("SELECT category, COUNT(*) FROM events GROUP BY category ORDER BY category")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let by_category: Vec<(String, usize)> = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(EventStats {
            total_events: total,
            clustered_events: clustered,
            distinct_clusters,
            by_category,
        })
    }
}
