use super::ui;
use crate::core::calendar;
use crate::core::config::AppConfig;
use crate::core::error::PlanError;
use crate::core::market::{RateProvider, RateSeries};
use crate::core::plan::{self, InvestmentPlan};
use crate::core::volatility;
use crate::notify::Notifier;
use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, FixedOffset, NaiveDate, Utc};
use comfy_table::Cell;
use tracing::{debug, warn};

/// Everything the `plan` command needs to render and deliver one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub plan: InvestmentPlan,
    pub thresholds: Vec<f64>,
    /// Date of the close used as the comparison rate.
    pub rate_date: NaiveDate,
    pub next_trigger: NaiveDate,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Today's date in the configured market-local offset.
pub fn local_today(config: &AppConfig) -> Result<NaiveDate> {
    let offset = FixedOffset::east_opt(config.utc_offset_hours * 3600)
        .ok_or_else(|| anyhow!("Invalid utc_offset_hours: {}", config.utc_offset_hours))?;
    Ok(Utc::now().with_timezone(&offset).date_naive())
}

/// Evaluates the purchase plan for `today` against a fetched series.
///
/// Convention: the most recent close is the comparison rate; the volatility
/// bands are anchored on the close before it. Anchoring on the comparison
/// close itself would place every band strictly below the rate whenever
/// sigma > 0, so no tier could ever match.
pub fn evaluate(config: &AppConfig, series: &RateSeries, today: NaiveDate) -> Result<Evaluation> {
    let points = series.points();
    if points.len() < 2 {
        return Err(PlanError::InsufficientData(format!(
            "need at least 2 closes to anchor thresholds, got {}",
            points.len()
        ))
        .into());
    }
    let latest = series.latest();
    let current_rate = round2(latest.close);
    let anchor = round2(points[points.len() - 2].close);
    debug!(%today, current_rate, anchor, rate_date = %latest.date, "Evaluating plan");

    let thresholds = volatility::compute_thresholds(series, anchor, &config.multipliers)?;
    let plan = plan::build_plan(
        today,
        current_rate,
        &thresholds,
        config.regular_amount,
        config.extra_unit,
    );
    let next_trigger = calendar::next_trigger_date(today)?;

    Ok(Evaluation {
        plan,
        thresholds,
        rate_date: latest.date,
        next_trigger,
    })
}

/// Quote currency of a Yahoo pair symbol, e.g. "USDKRW=X" -> "KRW".
fn quote_currency(symbol: &str) -> &str {
    symbol
        .strip_suffix("=X")
        .filter(|pair| pair.len() == 6)
        .map(|pair| &pair[3..])
        .unwrap_or("")
}

impl Evaluation {
    pub fn display_as_table(&self, config: &AppConfig) -> String {
        let currency = quote_currency(&config.symbol);
        let plan = &self.plan;

        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Item"), ui::header_cell("Value")]);
        table.add_row(vec![Cell::new("Date"), Cell::new(plan.date.to_string())]);
        table.add_row(vec![
            Cell::new(format!("Latest close ({})", self.rate_date)),
            Cell::new(format!("{:.2}", plan.current_rate)),
        ]);
        table.add_row(vec![Cell::new("Signal"), Cell::new(&plan.note)]);
        table.add_row(vec![
            Cell::new("Regular purchase"),
            ui::amount_cell(plan.regular_amount, currency),
        ]);
        table.add_row(vec![
            Cell::new("Extra purchase"),
            ui::amount_cell(plan.extra_amount, currency),
        ]);
        table.add_row(vec![
            Cell::new("Total purchase"),
            ui::total_cell(plan.total_amount, currency),
        ]);
        table.add_row(vec![
            Cell::new("Next regular day"),
            Cell::new(self.next_trigger.to_string()),
        ]);

        let mut output = format!(
            "Pair: {}\n\n{}",
            ui::style_text(&config.symbol, ui::StyleType::Title),
            table
        );

        if plan.matched_notes.is_empty() {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text("No extra purchase today", ui::StyleType::Subtle)
            ));
        } else {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text("Thresholds met:", ui::StyleType::TotalLabel)
            ));
            for note in &plan.matched_notes {
                output.push_str(&format!("\n- {note}"));
            }
        }
        output
    }

    /// Plain-text summary for the notification channel.
    pub fn notification_message(&self, config: &AppConfig, timestamp: &str) -> String {
        let currency = quote_currency(&config.symbol);
        let plan = &self.plan;

        let mut message = format!(
            "📢 fxdca · {}\n📅 {}\n💵 Latest close: {:.2} ({})\n",
            config.symbol, timestamp, plan.current_rate, self.rate_date
        );
        if plan.total_amount > 0 {
            message.push_str(&format!(
                "💰 Total purchase: {} {}\n📝 {}",
                plan.total_amount, currency, plan.note
            ));
            for note in &plan.matched_notes {
                message.push_str(&format!("\n⚡ {note}"));
            }
        } else {
            message.push_str("⚠️ No purchase signal today");
        }
        message.push_str(&format!("\n📅 Next regular day: {}", self.next_trigger));
        message
    }
}

pub async fn run(
    config: &AppConfig,
    provider: &(dyn RateProvider + Send + Sync),
    notifier: &(dyn Notifier),
) -> Result<()> {
    let offset = FixedOffset::east_opt(config.utc_offset_hours * 3600)
        .ok_or_else(|| anyhow!("Invalid utc_offset_hours: {}", config.utc_offset_hours))?;
    let now = Utc::now().with_timezone(&offset);
    let today = now.date_naive();
    let timestamp = now.format("%Y-%m-%d %H:%M").to_string();

    let evaluation = match fetch_and_evaluate(config, provider, today).await {
        Ok(evaluation) => evaluation,
        Err(e) => {
            // Never deliver a silent zero plan; announce the failed cycle.
            let failure = format!(
                "⚠️ fxdca · {}\n📅 {timestamp}\nEvaluation failed: {e}",
                config.symbol
            );
            if let Err(send_err) = notifier.send(&failure).await {
                warn!(error = %send_err, "Failed to deliver evaluation-failure notification");
            }
            return Err(e);
        }
    };

    println!("{}", evaluation.display_as_table(config));

    let message = evaluation.notification_message(config, &timestamp);
    if let Err(e) = notifier.send(&message).await {
        // The plan is already computed; delivery is best effort.
        warn!(error = %e, "Failed to deliver plan notification");
    }

    if today.day() == 1 {
        let ping = format!("✅ Monthly ping: fxdca is alive ({timestamp})");
        if let Err(e) = notifier.send(&ping).await {
            warn!(error = %e, "Failed to deliver monthly ping");
        }
    }

    Ok(())
}

async fn fetch_and_evaluate(
    config: &AppConfig,
    provider: &(dyn RateProvider + Send + Sync),
    today: NaiveDate,
) -> Result<Evaluation> {
    let series = provider
        .fetch_history(&config.symbol, &config.lookback)
        .await
        .with_context(|| format!("Failed to fetch rate history for {}", config.symbol))?;
    evaluate(config, &series, today)
        .with_context(|| format!("Failed to evaluate plan for {}", config.symbol))
}
