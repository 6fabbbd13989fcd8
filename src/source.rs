//! Concrete subject feeds: a JSON file on disk and a seeded synthetic slate.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use candidate_engine::{DataSource, SubjectFeed};
use common::config::{DataConfig, DataSourceKind};
use common::{Error, Result, RiskFactors, SourceStatus, Subject};

const SPORTS: [&str; 5] = ["NBA", "NFL", "MLB", "NHL", "SOCCER"];
const GAMES_PER_SPORT: u32 = 4;

/// Build the source named by config.
pub fn from_config(config: &DataConfig, seed: Option<u64>) -> Result<Box<dyn DataSource>> {
    match config.source {
        DataSourceKind::File => {
            let path = config
                .path
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| Error::Config("data.path is required for the file source".into()))?;
            Ok(Box::new(FileSource::new(path)))
        }
        DataSourceKind::Synthetic => {
            Ok(Box::new(SyntheticSource::new(config.synthetic_subjects, seed)))
        }
    }
}

/// Reads a `SubjectFeed` JSON document on every fetch.
pub struct FileSource {
    name: String,
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: format!("file:{}", path.display()),
            path,
        }
    }
}

#[async_trait]
impl DataSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<SubjectFeed> {
        let started = Instant::now();
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::DataSource(format!("{}: {}", self.path.display(), e)))?;
        let mut feed: SubjectFeed = serde_json::from_str(&raw)
            .map_err(|e| Error::DataSource(format!("{}: {}", self.path.display(), e)))?;
        if feed.sources.is_empty() {
            feed.sources.push(SourceStatus {
                name: self.name.clone(),
                connected: true,
                latency_ms: Some(started.elapsed().as_millis() as u64),
            });
        }
        debug!("{} loaded {} subjects", self.name, feed.subjects.len());
        Ok(feed)
    }
}

/// Random but plausible slate. With a seed, fetch N is reproducible.
pub struct SyntheticSource {
    subjects: usize,
    seed: Option<u64>,
    fetches: AtomicU64,
}

impl SyntheticSource {
    pub fn new(subjects: usize, seed: Option<u64>) -> Self {
        Self {
            subjects,
            seed,
            fetches: AtomicU64::new(0),
        }
    }

    fn rng_for(&self, fetch: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(fetch)),
            None => StdRng::from_entropy(),
        }
    }

    fn subject(rng: &mut StdRng, index: usize) -> Subject {
        let sport = SPORTS[rng.gen_range(0..SPORTS.len())];
        let game = rng.gen_range(0..GAMES_PER_SPORT);
        let home = rng.gen_bool(0.5);
        let (team, opponent) = if home {
            (game * 2, game * 2 + 1)
        } else {
            (game * 2 + 1, game * 2)
        };
        Subject {
            id: format!("{}-p{index}", sport.to_ascii_lowercase()),
            name: format!("{sport} Player {index}"),
            sport: sport.to_string(),
            team: format!("{sport}-T{team}"),
            opponent: Some(format!("{sport}-T{opponent}")),
            game_id: format!("{sport}-G{game}"),
            platform: "PrizePicks".into(),
            recent_form: rng.gen_range(-1.0..=1.0),
            risk: Some(RiskFactors {
                model_variance: None,
                data_quality_deficit: None,
                market_volatility: Some(rng.gen_range(0.0..0.5)),
                injury_impact: Some(rng.gen_range(0.0..0.3)),
                weather_impact: Some(if matches!(sport, "NFL" | "MLB" | "SOCCER") {
                    rng.gen_range(0.0..0.4)
                } else {
                    0.0
                }),
                sentiment_volatility: Some(rng.gen_range(0.0..0.4)),
            }),
            max_drawdown: Some(rng.gen_range(0.0..0.35)),
        }
    }
}

#[async_trait]
impl DataSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn fetch(&self) -> Result<SubjectFeed> {
        let fetch = self.fetches.fetch_add(1, Ordering::Relaxed);
        let mut rng = self.rng_for(fetch);
        let subjects = (0..self.subjects)
            .map(|i| Self::subject(&mut rng, i))
            .collect();
        Ok(SubjectFeed {
            subjects,
            data_quality: Some(rng.gen_range(0.7..1.0)),
            sources: vec![SourceStatus {
                name: "synthetic".into(),
                connected: true,
                latency_ms: Some(0),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(tag: &str) -> PathBuf {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        std::env::temp_dir().join(format!("lineup-feed-{tag}-{}-{nanos}.json", std::process::id()))
    }

    #[tokio::test]
    async fn test_file_source_reads_feed() {
        let path = scratch_file("ok");
        let raw = r#"{
            "subjects": [
                {"id": "lbj", "name": "LeBron James", "sport": "NBA", "team": "LAL", "game_id": "LAL@BOS"}
            ],
            "data_quality": 0.8
        }"#;
        std::fs::write(&path, raw).unwrap();

        let src = FileSource::new(&path);
        let feed = src.fetch().await.unwrap();
        assert_eq!(feed.subjects.len(), 1);
        assert_eq!(feed.subjects[0].platform, "PrizePicks");
        assert_eq!(feed.data_quality, Some(0.8));
        assert!(feed.sources[0].connected);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_missing_file_is_data_source_error() {
        let src = FileSource::new(scratch_file("missing"));
        assert!(matches!(src.fetch().await, Err(Error::DataSource(_))));
    }

    #[tokio::test]
    async fn test_seeded_synthetic_is_reproducible() {
        let a = SyntheticSource::new(8, Some(7)).fetch().await.unwrap();
        let b = SyntheticSource::new(8, Some(7)).fetch().await.unwrap();
        assert_eq!(a.subjects.len(), 8);
        let ids = |f: &SubjectFeed| -> Vec<(String, String, f64)> {
            f.subjects
                .iter()
                .map(|s| (s.id.clone(), s.game_id.clone(), s.recent_form))
                .collect()
        };
        assert_eq!(ids(&a), ids(&b));
        assert!(a.subjects.iter().all(|s| !s.game_id.is_empty()));
    }

    #[test]
    fn test_file_source_requires_path() {
        let config = DataConfig {
            source: DataSourceKind::File,
            path: None,
            synthetic_subjects: 0,
        };
        assert!(matches!(from_config(&config, None), Err(Error::Config(_))));
    }
}
