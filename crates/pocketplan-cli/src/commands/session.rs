//! Interactive budgeting session
//!
//! Prompts run to completion first. Tips are then requested on a background
//! task while the chart is shown on the calling thread, and the task is
//! always joined before the session returns.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use pocketplan_core::{
    build_tips_request, generate_tips, AIBackend, AIClient, CompletionRequest, PromptLibrary,
    Prompter, TipsOutcome,
};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::chart::{self, ChartMode};

pub const BANNER: &str = "==== Personal Finance Dashboard ====";
pub const OVER_BUDGET_WARNING: &str = "Warning: Your expenses exceed your income!";

/// Run one full session and return what the tips request produced
///
/// Errors only come from the console itself (closed input, failed writes,
/// terminal setup). Tip failures are printed and returned as
/// `TipsOutcome::Failed`.
pub async fn run_session<R: BufRead, W: Write>(
    reader: R,
    out: &mut W,
    client: AIClient,
    prompts: &mut PromptLibrary,
    mode: ChartMode,
) -> Result<TipsOutcome> {
    writeln!(out, "{}", BANNER)?;

    let budget = Prompter::new(reader, &mut *out)
        .read_budget()
        .context("Failed to collect budget")?;
    debug!(
        income = budget.income,
        savings_goal = budget.savings_goal,
        expenses = budget.expenses.len(),
        "Budget collected"
    );

    if budget.exceeds_income() {
        writeln!(out, "{}", OVER_BUDGET_WARNING)?;
    }

    let request = build_tips_request(prompts, &budget);
    let (tips_tx, tips_rx) = oneshot::channel();
    let tips_task = spawn_tips(client, request, tips_tx);

    let allocation = budget.allocation();
    let chart_result = match mode {
        ChartMode::Terminal => chart::show_terminal(&allocation, tips_rx),
        ChartMode::Text => chart::render_text(&allocation, out).context("Failed to print chart"),
    };

    let outcome = match tips_task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = %e, "Tips task did not finish");
            TipsOutcome::Failed(format!("tips task failed: {}", e))
        }
    };
    writeln!(out, "{}", outcome)?;
    out.flush()?;

    chart_result?;
    Ok(outcome)
}

/// Start the tips request in the background
///
/// The outcome is sent once on `tips_tx` (for the chart's tips panel) and
/// also returned from the task.
fn spawn_tips(
    client: AIClient,
    request: pocketplan_core::Result<CompletionRequest>,
    tips_tx: oneshot::Sender<TipsOutcome>,
) -> JoinHandle<TipsOutcome> {
    debug!(model = client.model(), "Spawning tips task");
    tokio::spawn(async move {
        let outcome = match request {
            Ok(request) => generate_tips(&client, &request).await,
            Err(e) => {
                warn!(error = %e, "Could not build tips prompt");
                TipsOutcome::failed(&e)
            }
        };
        // The chart may already be closed; the join below still reports it
        let _ = tips_tx.send(outcome.clone());
        outcome
    })
}
