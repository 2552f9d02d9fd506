//! CLI argument definitions using clap
//!
//! Every flag is optional. With none, `pocketplan` runs the interactive
//! session against the OpenAI API using `OPENAI_API_KEY`.

use clap::Parser;

/// PocketPlan - Plan a monthly budget and get savings tips
#[derive(Parser, Debug)]
#[command(name = "pocketplan")]
#[command(about = "Interactive monthly budget chart with AI savings tips", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Chat model used for tips (overrides OPENAI_MODEL, default gpt-4)
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible server (overrides OPENAI_BASE_URL)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Print the allocation as a text table instead of opening the chart view
    ///
    /// The text table is also used automatically when stdout is not a terminal.
    #[arg(long)]
    pub no_chart: bool,

    /// Check that the tips backend is reachable, then exit
    #[arg(long)]
    pub check: bool,
}
