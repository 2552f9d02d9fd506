//! Budgeting tip generation
//!
//! Turns a `Budget` into a prompt, sends it to an AI backend, and folds
//! whatever comes back (tips or any kind of failure) into a `TipsOutcome`.
//! Tip generation never fails the session: errors become printable text.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::ai::{AIBackend, CompletionRequest};
use crate::budget::{Budget, Expenses};
use crate::error::{Error, Result};
use crate::prompts::{PromptId, PromptLibrary};

pub const TIPS_HEADER: &str = "📌 Budgeting Tips:";
pub const TIPS_ERROR_PREFIX: &str = "Error calling OpenAI API:";

/// Format a dollar amount with two decimals, e.g. `$1000.00`
pub fn format_money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// `"Rent: $1000.00, Food: $500.00"`
pub fn format_expenses(expenses: &Expenses) -> String {
    expenses
        .iter()
        .map(|e| format!("{}: {}", e.name, format_money(e.amount)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the tips prompt for `budget`
pub fn build_tips_request(prompts: &mut PromptLibrary, budget: &Budget) -> Result<CompletionRequest> {
    let income = format!("{:.2}", budget.income);
    let savings_goal = format!("{:.2}", budget.savings_goal);
    let expenses = format_expenses(&budget.expenses);

    let mut vars = HashMap::new();
    vars.insert("income", income.as_str());
    vars.insert("savings_goal", savings_goal.as_str());
    vars.insert("expenses", expenses.as_str());

    let template = prompts.get(PromptId::BudgetTips)?;
    debug!(
        version = template.metadata.version,
        is_override = template.is_override,
        "Rendering budget tips prompt"
    );

    Ok(CompletionRequest {
        system: template.render_system(&vars),
        user: template.render_user(&vars),
    })
}

/// Result of asking for tips, ready to print
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TipsOutcome {
    /// Suggestions returned by the model, trimmed
    Tips(String),
    /// Why no suggestions could be fetched
    Failed(String),
}

impl TipsOutcome {
    pub fn failed(error: &Error) -> Self {
        TipsOutcome::Failed(error.to_string())
    }

    pub fn is_tips(&self) -> bool {
        matches!(self, TipsOutcome::Tips(_))
    }
}

impl From<Result<String>> for TipsOutcome {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(text) => TipsOutcome::Tips(text.trim().to_string()),
            Err(e) => TipsOutcome::failed(&e),
        }
    }
}

impl fmt::Display for TipsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TipsOutcome::Tips(text) => write!(f, "\n{}\n{}", TIPS_HEADER, text),
            TipsOutcome::Failed(message) => write!(f, "{} {}", TIPS_ERROR_PREFIX, message),
        }
    }
}

/// Send `request` and capture the outcome; never returns an error
pub async fn generate_tips<B: AIBackend + ?Sized>(
    client: &B,
    request: &CompletionRequest,
) -> TipsOutcome {
    debug!(model = client.model(), host = client.host(), "Requesting budgeting tips");
    let result = client.complete(request).await;
    if let Err(ref e) = result {
        warn!(error = %e, "Tip generation failed");
    }
    TipsOutcome::from(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AIClient, MockBackend};

    fn sample_budget() -> Budget {
        let expenses: Expenses = [("Rent", 1000.0), ("Food", 500.0)].into_iter().collect();
        Budget::new(3000.0, 250.5, expenses)
    }

    #[test]
    fn test_format_expenses() {
        assert_eq!(
            format_expenses(&sample_budget().expenses),
            "Rent: $1000.00, Food: $500.00"
        );
        assert_eq!(format_expenses(&Expenses::new()), "");
    }

    #[test]
    fn test_build_tips_request() {
        let mut prompts = PromptLibrary::embedded_only();
        let request = build_tips_request(&mut prompts, &sample_budget()).unwrap();

        assert!(request.system.is_none());
        assert_eq!(
            request.user,
            "My monthly income is $3000.00. My expenses are: Rent: $1000.00, Food: $500.00. \
             I want to save $250.50 per month. Suggest 3-5 concise and practical personal \
             finance tips to help me achieve this savings goal."
        );
    }

    #[test]
    fn test_build_tips_request_without_expenses() {
        let mut prompts = PromptLibrary::embedded_only();
        let budget = Budget::new(1200.0, 100.0, Expenses::new());
        let request = build_tips_request(&mut prompts, &budget).unwrap();

        assert!(!request.user.contains("My expenses are"));
        assert!(request
            .user
            .starts_with("My monthly income is $1200.00. I want to save $100.00 per month."));
    }

    #[test]
    fn test_build_tips_request_keeps_braces_in_names() {
        let expenses: Expenses = [("Gym {{/if}}", 40.0), ("{{savings_goal}}", 10.0)]
            .into_iter()
            .collect();
        let budget = Budget::new(1000.0, 100.0, expenses);

        let expected = "My monthly income is $1000.00. My expenses are: Gym {{/if}}: $40.00, \
             {{savings_goal}}: $10.00. I want to save $100.00 per month. Suggest 3-5 concise \
             and practical personal finance tips to help me achieve this savings goal.";

        // Same text every time, whatever order the variables are visited in
        for _ in 0..20 {
            let mut prompts = PromptLibrary::embedded_only();
            let request = build_tips_request(&mut prompts, &budget).unwrap();
            assert_eq!(request.user, expected);
        }
    }

    #[test]
    fn test_outcome_display() {
        let tips = TipsOutcome::from(Ok::<_, Error>("  1. Save.\n".to_string()));
        assert_eq!(tips.to_string(), "\n📌 Budgeting Tips:\n1. Save.");

        let failed = TipsOutcome::failed(&Error::MissingApiKey);
        assert_eq!(
            failed.to_string(),
            "Error calling OpenAI API: OPENAI_API_KEY is not set"
        );
        assert!(!failed.is_tips());
    }

    #[tokio::test]
    async fn test_generate_tips_success() {
        let client = AIClient::Mock(MockBackend::with_reply("\n1. Cook at home.\n"));
        let outcome = generate_tips(&client, &CompletionRequest::user("x")).await;
        assert_eq!(outcome, TipsOutcome::Tips("1. Cook at home.".to_string()));
    }

    #[tokio::test]
    async fn test_generate_tips_failure_is_captured() {
        let client = AIClient::Mock(MockBackend::failing("network unreachable"));
        let outcome = generate_tips(&client, &CompletionRequest::user("x")).await;
        assert!(!outcome.is_tips());
        assert!(outcome.to_string().starts_with(TIPS_ERROR_PREFIX));
        assert!(outcome.to_string().contains("network unreachable"));
    }
}
