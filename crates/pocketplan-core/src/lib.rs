//! PocketPlan Core Library
//!
//! Shared functionality for the PocketPlan budgeting helper:
//! - Budget model (income, savings goal, accumulated expenses, chart slices)
//! - Interactive prompt loops over any reader/writer pair
//! - Pluggable AI backends (OpenAI-compatible, mock)
//! - Prompt library for customizable AI prompts
//! - Tip generation that never fails the session

pub mod ai;
pub mod budget;
pub mod error;
pub mod input;
pub mod prompts;
pub mod tips;

/// Test utilities including a mock OpenAI-compatible server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, CompletionRequest, MockBackend, OpenAICompatibleBackend};
pub use budget::{Allocation, Budget, Expense, Expenses, Slice, SAVINGS_LABEL};
pub use error::{Error, Result};
pub use input::Prompter;
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use tips::{build_tips_request, generate_tips, TipsOutcome};
