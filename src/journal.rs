//! Append-only JSONL event journal, one file per UTC day.

use std::fs::{create_dir_all, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::warn;

use common::{PayoutQuote, Portfolio};
use portfolio_engine::RecommendationOutcome;

const JOURNAL_SUBDIR: &str = "prop-lineup-bot";

pub type SharedJournal = Arc<Mutex<LineupJournal>>;

pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn resolve_repo_root() -> Option<PathBuf> {
    let mut cursor = std::env::current_dir().ok()?;
    loop {
        if cursor.join(".git").is_dir() {
            return Some(cursor);
        }
        if !cursor.pop() {
            return None;
        }
    }
}

/// `$LINEUP_JOURNAL_DIR`, else `<repo>/JOURNAL`, else `./JOURNAL`.
pub fn resolve_journal_dir() -> PathBuf {
    if let Ok(raw) = std::env::var("LINEUP_JOURNAL_DIR") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed).join(JOURNAL_SUBDIR);
        }
    }

    if let Some(root) = resolve_repo_root() {
        return root.join("JOURNAL").join(JOURNAL_SUBDIR);
    }

    PathBuf::from("JOURNAL").join(JOURNAL_SUBDIR)
}

pub struct LineupJournal {
    dir: PathBuf,
    day_key: String,
    file: File,
    /// Lineups recorded in the current day file.
    lineups_today: u64,
}

impl LineupJournal {
    pub fn open(dir: PathBuf) -> std::io::Result<Self> {
        create_dir_all(&dir)?;
        let day_key = Utc::now().format("%Y-%m-%d").to_string();
        let file = Self::open_day_file(&dir, &day_key)?;
        Ok(Self {
            dir,
            day_key,
            file,
            lineups_today: 0,
        })
    }

    fn open_day_file(dir: &Path, day_key: &str) -> std::io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("lineups-{}.jsonl", day_key)))
    }

    fn rotate_if_needed(&mut self) -> std::io::Result<()> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        if today != self.day_key {
            self.file = Self::open_day_file(&self.dir, &today)?;
            self.day_key = today;
            self.lineups_today = 0;
        }
        Ok(())
    }

    /// Write failures are logged, never propagated.
    pub fn write_event(&mut self, event: Value) {
        let write_result = (|| -> std::io::Result<()> {
            self.rotate_if_needed()?;
            let line = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
            writeln!(self.file, "{}", line)?;
            self.file.flush()?;
            Ok(())
        })();

        if let Err(e) = write_result {
            warn!("Lineup journal write failed: {}", e);
        }
    }

    /// Record a lineup with its sequence number for the day and the
    /// payout quote it was priced at, if any.
    pub fn record_lineup(&mut self, portfolio: &Portfolio, quote: Option<&PayoutQuote>) {
        if let Err(e) = self.rotate_if_needed() {
            warn!("Lineup journal rotation failed: {}", e);
        }
        self.lineups_today += 1;
        let mut event = lineup_event(portfolio);
        event["seq"] = json!(self.lineups_today);
        event["payout"] = match quote {
            Some(q) => json!({
                "stake": q.stake,
                "legs": q.legs,
                "multiplier": q.multiplier,
                "payout": q.payout
            }),
            None => Value::Null,
        };
        self.write_event(event);
    }

    pub fn lineups_today(&self) -> u64 {
        self.lineups_today
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn current_file(&self) -> PathBuf {
        self.dir.join(format!("lineups-{}.jsonl", self.day_key))
    }
}

pub async fn write_event(journal: &SharedJournal, event: Value) {
    let mut guard = journal.lock().await;
    guard.write_event(event);
}

fn lineup_event(portfolio: &Portfolio) -> Value {
    json!({
        "ts": now_iso(),
        "kind": "lineup",
        "lineup_id": &portfolio.id,
        "strategy": portfolio.strategy.as_str(),
        "legs": portfolio.legs.iter().map(|l| json!({
            "id": &l.id,
            "subject": &l.subject_name,
            "market": &l.market,
            "direction": l.direction.to_string(),
            "line": l.line,
            "confidence": l.confidence,
            "expected_value": l.expected_value,
            "rating": l.value_rating.as_str()
        })).collect::<Vec<_>>(),
        "metrics": &portfolio.metrics
    })
}

/// Journal one refresh cycle: a summary, then a lineup or degraded event.
pub async fn record_cycle(
    journal: &SharedJournal,
    cycle: u64,
    outcome: &RecommendationOutcome,
    quote: Option<&PayoutQuote>,
) {
    write_event(
        journal,
        json!({
            "ts": now_iso(),
            "kind": "refresh_cycle",
            "cycle": cycle,
            "candidates": outcome.ranked.len(),
            "degraded": outcome.degraded,
            "sources": &outcome.sources,
            "error": &outcome.error
        }),
    )
    .await;

    if outcome.degraded {
        write_event(
            journal,
            json!({
                "ts": now_iso(),
                "kind": "degraded",
                "cycle": cycle,
                "sources": &outcome.sources
            }),
        )
        .await;
    } else if let Some(portfolio) = &outcome.portfolio {
        journal.lock().await.record_lineup(portfolio, quote);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        std::env::temp_dir().join(format!("lineup-journal-{tag}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn test_events_append_as_lines() {
        let dir = scratch_dir("append");
        let mut journal = LineupJournal::open(dir.clone()).unwrap();
        journal.write_event(json!({"kind": "bot_start"}));
        journal.write_event(json!({"kind": "refresh_cycle", "cycle": 1}));

        let contents = std::fs::read_to_string(journal.current_file()).unwrap();
        let lines: Vec<Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["cycle"], 1);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_degraded_cycle_records_two_events() {
        let dir = scratch_dir("degraded");
        let journal: SharedJournal = Arc::new(Mutex::new(LineupJournal::open(dir.clone()).unwrap()));
        let outcome = RecommendationOutcome {
            portfolio: None,
            ranked: vec![],
            degraded: true,
            sources: vec![],
            error: Some("no data available, try again".into()),
        };
        record_cycle(&journal, 3, &outcome, None).await;

        let path = journal.lock().await.current_file();
        let contents = std::fs::read_to_string(path).unwrap();
        let kinds: Vec<String> = contents
            .lines()
            .map(|l| serde_json::from_str::<Value>(l).unwrap()["kind"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(kinds, vec!["refresh_cycle", "degraded"]);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_lineup_event_carries_quote_and_sequence() {
        let dir = scratch_dir("lineup");
        let mut journal = LineupJournal::open(dir.clone()).unwrap();
        let portfolio = Portfolio {
            id: "lineup-1".into(),
            created_at: Utc::now(),
            strategy: common::StrategyMode::Balanced,
            legs: vec![],
            metrics: common::PortfolioMetrics::default(),
        };
        let quote = PayoutQuote {
            stake: 25.0,
            legs: 4,
            multiplier: 10.0,
            payout: 250.0,
        };
        journal.record_lineup(&portfolio, Some(&quote));
        journal.record_lineup(&portfolio, None);
        assert_eq!(journal.lineups_today(), 2);

        let contents = std::fs::read_to_string(journal.current_file()).unwrap();
        let events: Vec<Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(events[0]["kind"], "lineup");
        assert_eq!(events[0]["seq"], 1);
        assert_eq!(events[0]["payout"]["payout"], 250.0);
        assert_eq!(events[1]["seq"], 2);
        assert!(events[1]["payout"].is_null());
        let _ = std::fs::remove_dir_all(dir);
    }
}
