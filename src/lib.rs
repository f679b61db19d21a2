pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::cluster::{ClusterRun, ClusterUseCase, WorkingSet};
use crate::application::fuse::FuseUseCase;
use crate::application::ingest::{IngestReport, IngestUseCase};
use crate::application::pipeline::{DedupRunUseCase, RunReport};
use crate::application::rank::{rank_event, RankUseCase, RankedItem};
use crate::domain::entities::event::{Event, RawEvent};
use crate::domain::entities::fused_record::FusedRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::event_repository::{EventRepository, EventStats};
use crate::domain::services::clustering::ClusterBuilder;
use crate::domain::services::fusion::FusionEngine;
use crate::domain::services::scoring::ScoringEngine;
use crate::domain::services::similarity::SimilarityMatcher;
use crate::domain::values::cluster_id::ClusterId;
use crate::infrastructure::config::Settings;
use crate::infrastructure::import::load_raw_events;
use crate::infrastructure::sqlite::event_repo::SqliteEventRepo;
use crate::infrastructure::sqlite::migrations::run_migrations;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

pub struct IntelFuse {
    repo: Arc<dyn EventRepository>,
    engine: Arc<FusionEngine>,
    scoring: ScoringEngine,
    ingest_uc: IngestUseCase,
    cluster_uc: Arc<ClusterUseCase>,
    fuse_uc: FuseUseCase,
    run_uc: DedupRunUseCase,
    rank_uc: RankUseCase,
}

impl IntelFuse {
    /// Open (or create) the SQLite store named in `settings`.
    pub fn new(settings: &Settings) -> Result<Self, DomainError> {
        let conn = Connection::open(&settings.db_path)
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        run_migrations(&conn)?;

        let repo: Arc<dyn EventRepository> = Arc::new(SqliteEventRepo::new(conn));
        Ok(Self::with_repository(repo, settings))
    }

    pub fn with_repository(repo: Arc<dyn EventRepository>, settings: &Settings) -> Self {
        let scoring = ScoringEngine::new();
        let matcher = Arc::new(SimilarityMatcher::new(settings.matching));
        let engine = Arc::new(FusionEngine::new(settings.fusion.clone(), scoring));
        let cluster_uc = Arc::new(ClusterUseCase::new(
            repo.clone(),
            ClusterBuilder::new(matcher, settings.cluster_mode),
        ));

        Self {
            ingest_uc: IngestUseCase::new(repo.clone(), scoring),
            fuse_uc: FuseUseCase::new(repo.clone(), engine.clone()),
            run_uc: DedupRunUseCase::new(cluster_uc.clone(), engine.clone(), scoring),
            rank_uc: RankUseCase::new(repo.clone(), scoring),
            cluster_uc,
            engine,
            scoring,
            repo,
        }
    }

    // Delegating methods
    pub fn ingest(&self, records: Vec<RawEvent>) -> Result<IngestReport, DomainError> {
        self.ingest_uc.execute(records)
    }

    /// Ingest a JSON / NDJSON file. Records that fail to deserialize are
    /// counted as rejected alongside records that fail validation.
    pub fn import_file(&self, path: &Path) -> Result<IngestReport, DomainError> {
        let batch = load_raw_events(path)?;
        let mut report = self.ingest_uc.execute(batch.records)?;
        report.rejected += batch.errors.len();
        report.errors.extend(batch.errors);
        Ok(report)
    }

    pub fn cluster(&self, working_set: &WorkingSet) -> Result<ClusterRun, DomainError> {
        self.cluster_at(working_set, Utc::now())
    }

    pub fn cluster_at(
        &self,
        working_set: &WorkingSet,
        now: DateTime<Utc>,
    ) -> Result<ClusterRun, DomainError> {
        self.cluster_uc.execute(working_set, now)
    }

    pub fn fuse(&self, cluster_id: &ClusterId) -> Result<FusedRecord, DomainError> {
        self.fuse_uc.execute(cluster_id)
    }

    /// Fuse caller-supplied events without touching storage.
    pub fn fuse_events(&self, events: &[Event]) -> Result<FusedRecord, DomainError> {
        self.engine.fuse(events)
    }

    pub async fn run(&self, working_set: WorkingSet) -> Result<RunReport, DomainError> {
        self.run_at(working_set, Utc::now()).await
    }

    pub async fn run_at(
        &self,
        working_set: WorkingSet,
        now: DateTime<Utc>,
    ) -> Result<RunReport, DomainError> {
        self.run_uc.execute(working_set, now).await
    }

    pub fn rank(&self, hours_back: u32, limit: Option<usize>) -> Result<Vec<RankedItem>, DomainError> {
        self.rank_at(hours_back, limit, Utc::now())
    }

    pub fn rank_at(
        &self,
        hours_back: u32,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedItem>, DomainError> {
        self.rank_uc.execute(hours_back, limit, now)
    }

    /// Score one raw event as a standalone item, without storing it.
    pub fn score(&self, raw: RawEvent) -> Result<RankedItem, DomainError> {
        let event = self.ingest_uc.prepare(raw)?;
        Ok(rank_event(&self.scoring, &event, 1, Utc::now()))
    }

    pub fn stats(&self) -> Result<EventStats, DomainError> {
        self.repo.stats()
    }
}
