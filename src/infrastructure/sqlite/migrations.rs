use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            timestamp TEXT NOT NULL,
            summary TEXT NOT NULL,
            full_text TEXT,
            lat REAL,
            lon REAL,
            location_name TEXT,
            category TEXT NOT NULL,
            sentiment TEXT,
            confidence_score REAL,
            relevance_score REAL,
            source_list TEXT NOT NULL DEFAULT '[]',
            entity_list TEXT NOT NULL DEFAULT '{}',
            cluster_id TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp);
        CREATE INDEX IF NOT EXISTS idx_events_category ON events(category);
        CREATE INDEX IF NOT EXISTS idx_events_cluster ON events(cluster_id);
        "
    ).map_err(|e| format!("Migration failed: {e}"))
}
