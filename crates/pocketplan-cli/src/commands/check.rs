//! Connection check for the tips backend

use std::io::Write;

use anyhow::Result;
use pocketplan_core::{AIBackend, AIClient};

/// Report whether the tips backend is reachable, returning the result
pub async fn cmd_check<W: Write>(out: &mut W, client: &AIClient) -> Result<bool> {
    writeln!(out, "🔍 Checking tips backend...\n")?;
    writeln!(out, "  Host:  {}", client.host())?;
    writeln!(out, "  Model: {}\n", client.model())?;

    let healthy = client.health_check().await;
    if healthy {
        writeln!(out, "✅ Connected")?;
    } else {
        writeln!(out, "❌ Could not reach {}", client.host())?;
        writeln!(out, "\nCheck OPENAI_API_KEY and OPENAI_BASE_URL (or --api-base).")?;
    }
    Ok(healthy)
}
