//! Data source seam: where subjects come from.

use async_trait::async_trait;
use common::{Result, SourceStatus, Subject};
use serde::{Deserialize, Serialize};

/// One fetch worth of subjects plus upstream health.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectFeed {
    pub subjects: Vec<Subject>,
    /// Feed-level data quality in [0,1], if the provider reports one.
    #[serde(default)]
    pub data_quality: Option<f64>,
    #[serde(default)]
    pub sources: Vec<SourceStatus>,
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<SubjectFeed>;
}

/// Serves a fixed feed. Used for replays and tests.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    feed: SubjectFeed,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, feed: SubjectFeed) -> Self {
        Self {
            name: name.into(),
            feed,
        }
    }
}

#[async_trait]
impl DataSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<SubjectFeed> {
        Ok(self.feed.clone())
    }
}
