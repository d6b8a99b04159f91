//! CLI commands
//!
//! Each command prints its human-readable report (or the serde DTO with
//! `--json`) and returns the DTO so tests can assert on it directly.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tonggwan_core::RiskLevel;
use tonggwan_notices::{NoticeQuery, NoticeRisk, RefreshReport, RegulationNotice};
use tracing::{debug, info};

use crate::context::AppContext;
use crate::dto::{EvaluateRequest, EvaluateResponse, RuleLibraryResponse};

/// Evaluate a declaration against the current snapshot
pub fn evaluate(
    ctx: &AppContext,
    request: EvaluateRequest,
    json: bool,
) -> Result<EvaluateResponse, anyhow::Error> {
    let declaration = request.into_declaration()?;
    let evaluation = ctx.store.evaluate(&declaration)?;
    let response = EvaluateResponse::from(evaluation);
    debug!(
        risk = %response.risk_level,
        dutiable = response.dutiable,
        "declaration evaluated"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(response);
    }

    println!(
        "{} {} (risk: {})",
        risk_icon(response.risk_level),
        response.risk_label,
        response.risk_level
    );
    println!(
        "   Declared:   {} {}",
        response.declared_value, response.currency
    );
    println!(
        "   Converted:  {} KRW / {} USD",
        response.converted_value_krw, response.converted_value_usd
    );
    println!(
        "   Limit:      {} USD ({})",
        response.duty_free_limit_usd,
        if response.dutiable {
            "dutiable"
        } else {
            "duty-free"
        }
    );
    if response.dutiable {
        let tax = &response.expected_tax_breakdown;
        println!("   Duty:       {} KRW", tax.duty);
        println!("   VAT:        {} KRW", tax.vat);
        if tax.special_tax > 0 {
            println!("   Special:    {} KRW", tax.special_tax);
        }
        println!("   Total tax:  {} KRW", tax.estimated_total_tax);
    }
    if !response.applied_rules.is_empty() {
        println!("   Rules:");
        for rule in &response.applied_rules {
            println!("     - [{}] {}: {}", rule.risk_level, rule.id, rule.summary);
        }
    }
    println!("   Advisory:   {}", response.advisory);
    for link in &response.basis_links {
        println!("   Ref:        {}", link);
    }

    Ok(response)
}

/// Show the rule library, category profiles and exchange rates
pub fn rule_library(ctx: &AppContext, json: bool) -> Result<RuleLibraryResponse, anyhow::Error> {
    let snapshot = ctx.store.current();
    let response = RuleLibraryResponse::from_snapshot(&snapshot);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(response);
    }

    println!("📚 Rule library (revision {})", snapshot.revision);

    println!("\n--- Rules ---");
    println!("{:<28} {:<8} {}", "ID", "RISK", "TITLE");
    for rule in &response.rule_entries {
        println!("{:<28} {:<8} {}", rule.id, rule.risk_level, rule.title);
    }

    println!("\n--- Categories ---");
    println!("{:<18} {:>7} {:>9}  {}", "ID", "DUTY%", "SPECIAL%", "TITLE");
    for category in &response.category_profiles {
        println!(
            "{:<18} {:>7} {:>9}  {}",
            category.id,
            category.duty_rate_percent,
            category.special_tax_rate_percent,
            category.title
        );
    }

    println!("\n--- Rates (KRW per unit) ---");
    for (code, rate) in &response.currency_rates {
        println!("{:<8} {}", code, rate);
    }

    Ok(response)
}

/// List aggregated notices, newest first
pub fn list_notices(
    ctx: &AppContext,
    query: &NoticeQuery,
    json: bool,
) -> Result<Vec<RegulationNotice>, anyhow::Error> {
    let notices = ctx.notices.list(query);

    if json {
        println!("{}", serde_json::to_string_pretty(&notices)?);
        return Ok(notices);
    }

    if ctx.notices.serving_fallback() {
        println!("⚠️ Showing fallback notices (no feed has answered yet)");
    }
    if notices.is_empty() {
        println!("No notices match the filter.");
        return Ok(notices);
    }

    println!("{:<12} {:<7} {:<18} {}", "DATE", "RISK", "SOURCE", "TITLE");
    for notice in &notices {
        println!(
            "{:<12} {:<7} {:<18} {}",
            format_date(notice.published_at),
            notice.risk.as_str(),
            notice.source,
            notice.title
        );
    }

    Ok(notices)
}

/// Show the highest-risk recent notices
pub fn notice_highlights(
    ctx: &AppContext,
    limit: Option<usize>,
    json: bool,
) -> Result<Vec<RegulationNotice>, anyhow::Error> {
    let highlights = ctx.notices.highlights(limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&highlights)?);
        return Ok(highlights);
    }

    for notice in &highlights {
        println!(
            "{} [{}] {} ({})",
            notice_icon(notice.risk),
            notice.category,
            notice.title,
            format_date(notice.published_at)
        );
        if !notice.summary.is_empty() {
            println!("   {}", notice.summary);
        }
        println!("   {}", notice.url);
    }

    Ok(highlights)
}

/// Fetch every configured feed now
pub async fn refresh_notices(
    ctx: &AppContext,
    json: bool,
) -> Result<RefreshReport, anyhow::Error> {
    let report = ctx.notices.refresh().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report);
    }

    print_refresh_report(&report);
    Ok(report)
}

/// Refresh on an interval until interrupted
pub async fn watch_notices(
    ctx: &AppContext,
    interval_secs: Option<u64>,
) -> Result<(), anyhow::Error> {
    let interval = Duration::from_secs(
        interval_secs.unwrap_or(ctx.notices.config().refresh_interval_secs),
    );
    info!(interval_secs = interval.as_secs(), "starting notice watch");
    println!(
        "👀 Watching {} feeds every {}s (Ctrl-C to stop)",
        ctx.notices.config().sources.len(),
        interval.as_secs()
    );
    ctx.notices.run_periodic(interval).await;
    Ok(())
}

/// Reload the rule snapshot from disk
pub fn reload_snapshot(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let snapshot = ctx.store.reload()?;
    println!(
        "✅ Snapshot reloaded (revision {}, {} rules, {} categories)",
        snapshot.revision,
        snapshot.rules.len(),
        snapshot.categories.len()
    );
    Ok(())
}

fn print_refresh_report(report: &RefreshReport) {
    let total = report.updated_sources.len() + report.failures.len();
    if report.failures.is_empty() {
        println!(
            "✅ Refreshed {} sources, {} new notices",
            report.updated_sources.len(),
            report.fetched
        );
    } else if report.updated_sources.is_empty() {
        println!("❌ All {} sources failed; keeping cached notices", total);
    } else {
        println!(
            "⚠️ Refreshed {} of {} sources, {} new notices",
            report.updated_sources.len(),
            total,
            report.fetched
        );
    }
    for failure in &report.failures {
        println!("   {}: {}", failure.source_id, failure.message);
    }
}

fn risk_icon(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "✅",
        RiskLevel::Medium => "⚠️",
        RiskLevel::High => "🚨",
    }
}

fn notice_icon(risk: NoticeRisk) -> &'static str {
    match risk {
        NoticeRisk::Info => "ℹ️",
        NoticeRisk::Watch => "⚠️",
        NoticeRisk::Alert => "🚨",
    }
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}
