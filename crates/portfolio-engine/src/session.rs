//! Per-session context: the injected data source and model plus the last
//! connectivity snapshot. Owned by the caller; there is no global instance.

use std::time::Duration;

use candidate_engine::{DataSource, PredictionModel, SubjectFeed};
use common::{Error, Result, SourceStatus};
use tracing::{debug, warn};

pub struct SessionContext {
    source: Box<dyn DataSource>,
    model: Box<dyn PredictionModel>,
    last_sources: Vec<SourceStatus>,
    open: bool,
    cycles: u64,
}

impl SessionContext {
    pub fn new(source: Box<dyn DataSource>, model: Box<dyn PredictionModel>) -> Self {
        debug!(
            "Session opened (source={}, model={})",
            source.name(),
            model.name()
        );
        Self {
            source,
            model,
            last_sources: Vec::new(),
            open: true,
            cycles: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn last_sources(&self) -> &[SourceStatus] {
        &self.last_sources
    }

    pub fn model_mut(&mut self) -> &mut dyn PredictionModel {
        self.model.as_mut()
    }

    /// Fetch one feed, bounded by `timeout`. Connectivity is recorded either way.
    pub async fn fetch(&mut self, timeout: Duration) -> Result<SubjectFeed> {
        if !self.open {
            return Err(Error::Other("session is closed".into()));
        }
        self.cycles += 1;

        let result = match tokio::time::timeout(timeout, self.source.fetch()).await {
            Ok(inner) => inner,
            Err(_) => Err(Error::Timeout(timeout.as_millis() as u64)),
        };

        match &result {
            Ok(feed) => {
                self.last_sources = if feed.sources.is_empty() {
                    vec![SourceStatus {
                        name: self.source.name().to_string(),
                        connected: true,
                        latency_ms: None,
                    }]
                } else {
                    feed.sources.clone()
                };
            }
            Err(e) => {
                warn!("{} fetch failed: {}", self.source.name(), e);
                self.last_sources = vec![SourceStatus {
                    name: self.source.name().to_string(),
                    connected: false,
                    latency_ms: None,
                }];
            }
        }
        result
    }

    /// Tear down. Further fetches fail.
    pub fn close(&mut self) {
        if self.open {
            debug!(
                "Session closed after {} cycle(s) (source={})",
                self.cycles,
                self.source.name()
            );
        }
        self.open = false;
        self.last_sources.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use candidate_engine::{SeededModel, StaticSource};

    struct FailingSource;

    #[async_trait]
    impl DataSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self) -> Result<SubjectFeed> {
            Err(Error::DataSource("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_fetch_records_connectivity() {
        let mut ctx = SessionContext::new(
            Box::new(StaticSource::new("replay", SubjectFeed::default())),
            Box::new(SeededModel::new(1)),
        );
        ctx.fetch(Duration::from_millis(100)).await.unwrap();
        assert_eq!(ctx.cycles(), 1);
        assert_eq!(ctx.last_sources().len(), 1);
        assert!(ctx.last_sources()[0].connected);
    }

    #[tokio::test]
    async fn test_failed_fetch_marks_disconnected() {
        let mut ctx = SessionContext::new(Box::new(FailingSource), Box::new(SeededModel::new(1)));
        assert!(ctx.fetch(Duration::from_millis(100)).await.is_err());
        assert!(!ctx.last_sources()[0].connected);
    }

    #[tokio::test]
    async fn test_closed_session_rejects_fetch() {
        let mut ctx = SessionContext::new(
            Box::new(StaticSource::new("replay", SubjectFeed::default())),
            Box::new(SeededModel::new(1)),
        );
        ctx.close();
        assert!(!ctx.is_open());
        assert!(ctx.fetch(Duration::from_millis(100)).await.is_err());
    }
}
