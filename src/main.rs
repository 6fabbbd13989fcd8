//! Prop lineup bot: builds correlation-constrained pick'em lineups.
//!
//! Single-binary Tokio application that, on every refresh:
//! 1. Fetches a subject slate from the configured data source
//! 2. Generates and scores player-prop opportunities
//! 3. Ranks them and selects a lineup under the active strategy
//! 4. Prices the lineup against the payout table and journals the cycle

mod config;
mod export;
mod journal;
mod source;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use candidate_engine::SeededModel;
use common::{EngineConfig, LineupDocument, PortfolioSnapshot};
use portfolio_engine::{LineupEngine, PayoutTable, RecommendationOutcome, SessionContext};

use journal::{now_iso, record_cycle, resolve_journal_dir, write_event, LineupJournal, SharedJournal};

/// Saved lineups kept for `--export`, newest last.
const MAX_SAVED_LINEUPS: usize = 20;

/// Pick'em lineup recommender
#[derive(Parser)]
#[command(name = "prop-lineup-bot", about = "Correlation-aware pick'em lineup builder")]
struct Cli {
    /// Run a single refresh cycle and exit.
    #[arg(long)]
    once: bool,

    /// Entry amount used for payout quotes (defaults to risk.default_stake).
    #[arg(long)]
    stake: Option<f64>,

    /// Write settings and this run's lineups to a JSON backup on exit.
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Validate and print a JSON backup, then exit.
    #[arg(long, value_name = "PATH")]
    import: Option<PathBuf>,

    /// Config file (defaults to ./lineup.toml when present).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn print_import(doc: &LineupDocument) {
    info!(
        "Backup from {}: mode={}, target={} legs, {} saved lineup(s)",
        doc.exported_at.to_rfc3339(),
        doc.settings.strategy.mode.as_str(),
        doc.settings.strategy.target_legs,
        doc.lineups.len()
    );
    for lineup in &doc.lineups {
        let payout = lineup
            .payout
            .as_ref()
            .map(|q| format!("${:.2} → ${:.2} ({}x)", q.stake, q.payout, q.multiplier))
            .unwrap_or_else(|| "no quote".into());
        info!(
            "  {} [{}] {} legs, EV {:.2}, win {:.1}%, {}",
            lineup.id,
            lineup.strategy.as_str(),
            lineup.legs.len(),
            lineup.metrics.expected_return,
            lineup.metrics.win_probability * 100.0,
            payout
        );
    }
}

/// Log the cycle result and return a snapshot worth saving, if any.
fn report(
    outcome: &RecommendationOutcome,
    payout: &PayoutTable,
    stake: f64,
    max_exposure: f64,
) -> Option<PortfolioSnapshot> {
    if outcome.degraded {
        warn!(
            "Data unavailable ({}); {}",
            outcome
                .sources
                .iter()
                .map(|s| format!("{}={}", s.name, if s.connected { "up" } else { "down" }))
                .collect::<Vec<_>>()
                .join(", "),
            outcome.error.as_deref().unwrap_or_default()
        );
        return None;
    }

    let Some(portfolio) = &outcome.portfolio else {
        info!(
            "No lineup from {} candidates: {}",
            outcome.ranked.len(),
            outcome.error.as_deref().unwrap_or_default()
        );
        return None;
    };

    for leg in &portfolio.legs {
        info!("  → {}", leg.label());
    }
    let m = &portfolio.metrics;
    info!(
        "Metrics: EV {:.2}, win {:.1}%, risk {:.2}, max DD {:.0}%, diversification {:.2}, kelly {:.3}",
        m.expected_return,
        m.win_probability * 100.0,
        m.risk_score,
        m.max_drawdown * 100.0,
        m.diversification_score,
        m.kelly_fraction
    );

    let quote = match payout.quote_with_limit(stake, portfolio.leg_count(), max_exposure) {
        Ok(q) => {
            info!(
                "💰 ${:.2} on {} picks pays ${:.2} ({}x)",
                q.stake, q.legs, q.payout, q.multiplier
            );
            Some(q)
        }
        Err(e) => {
            warn!("No payout quote: {}", e.user_message());
            None
        }
    };
    Some(PortfolioSnapshot::from_portfolio(portfolio, quote))
}

fn log_settings(cfg: &EngineConfig, stake: f64) {
    info!(
        "Strategy: mode={}, legs={}, corr<{:.2}, conf≥{:.0}%, team cap={}",
        cfg.strategy.mode.as_str(),
        cfg.strategy.target_legs,
        cfg.strategy.correlation_limit,
        cfg.strategy.min_confidence,
        cfg.strategy.max_same_team,
    );
    info!(
        "Risk: max_drawdown={:.0}%, max_exposure=${:.2}, stake=${:.2}",
        cfg.risk.max_drawdown * 100.0,
        cfg.risk.max_exposure,
        stake,
    );
    info!(
        "Data: {:?}{}, refresh={}s, fetch timeout={}ms, seed={:?}",
        cfg.data.source,
        cfg.data
            .path
            .as_deref()
            .map(|p| format!(" ({p})"))
            .unwrap_or_default(),
        cfg.timing.refresh_interval_secs,
        cfg.timing.fetch_timeout_ms,
        cfg.generator.seed,
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "prop_lineup_bot=info,candidate_engine=info,portfolio_engine=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    // ── Import mode ──────────────────────────────────────────────────
    if let Some(path) = &cli.import {
        let doc = export::read_document(path)
            .with_context(|| format!("failed to import {}", path.display()))?;
        print_import(&doc);
        return Ok(());
    }

    info!("🏀 Prop Lineup Bot starting up...");

    let cfg = config::load_config(cli.config.as_deref()).context("configuration error")?;

    let stake = cli.stake.unwrap_or(cfg.risk.default_stake);
    if !stake.is_finite() || stake <= 0.0 {
        bail!("--stake must be greater than 0 (got {stake})");
    }
    if stake > cfg.risk.max_exposure {
        bail!(
            "--stake {:.2} exceeds risk.max_exposure {:.2}",
            stake,
            cfg.risk.max_exposure
        );
    }
    log_settings(&cfg, stake);

    let engine = LineupEngine::from_config(&cfg).context("failed to build lineup engine")?;

    let journal = LineupJournal::open(resolve_journal_dir())
        .context("failed to initialize lineup journal")?;
    info!("Lineup journal path: {}", journal.dir().display());
    let journal: SharedJournal = Arc::new(Mutex::new(journal));
    write_event(
        &journal,
        json!({
            "ts": now_iso(),
            "kind": "bot_start",
            "bot": "prop-lineup-bot",
            "mode": if cli.once { "once" } else { "loop" },
            "strategy": {
                "mode": cfg.strategy.mode.as_str(),
                "target_legs": cfg.strategy.target_legs,
                "correlation_limit": cfg.strategy.correlation_limit,
                "min_confidence": cfg.strategy.min_confidence,
                "max_same_team": cfg.strategy.max_same_team
            },
            "risk": &cfg.risk,
            "timing": &cfg.timing,
            "stake": stake
        }),
    )
    .await;

    let data_source = source::from_config(&cfg.data, cfg.generator.seed)
        .context("failed to build data source")?;
    let model = SeededModel::from_seed(cfg.generator.seed);
    let mut ctx = SessionContext::new(data_source, Box::new(model));

    // ── Refresh loop ─────────────────────────────────────────────────
    let mut interval = tokio::time::interval(Duration::from_secs(cfg.timing.refresh_interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut saved: Vec<PortfolioSnapshot> = Vec::new();

    if !cli.once {
        info!("🚀 Refreshing every {}s. Press Ctrl+C to stop.", cfg.timing.refresh_interval_secs);
    }

    let shutdown_reason = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break "ctrl_c";
            }
            _ = interval.tick() => {}
        }

        let cycle = ctx.cycles() + 1;
        info!("Refresh cycle {} ({})", cycle, ctx.source_name());
        let outcome = engine.generate(&mut ctx).await;
        let snapshot = report(&outcome, engine.payout(), stake, cfg.risk.max_exposure);
        let quote = snapshot.as_ref().and_then(|s| s.payout);
        record_cycle(&journal, cycle, &outcome, quote.as_ref()).await;
        if let Some(snapshot) = snapshot {
            saved.push(snapshot);
            if saved.len() > MAX_SAVED_LINEUPS {
                saved.remove(0);
            }
        }

        if cli.once {
            break "once";
        }
    };

    ctx.close();

    if let Some(path) = &cli.export {
        let doc = LineupDocument::new(cfg.clone(), saved);
        match export::write_document(path, &doc) {
            Ok(()) => info!("Exported {} lineup(s) to {}", doc.lineups.len(), path.display()),
            Err(e) => error!("Export to {} failed: {}", path.display(), e),
        }
    }

    write_event(
        &journal,
        json!({
            "ts": now_iso(),
            "kind": "bot_shutdown",
            "reason": shutdown_reason
        }),
    )
    .await;

    info!("Prop Lineup Bot shut down.");
    Ok(())
}
