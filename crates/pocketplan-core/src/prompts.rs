//! Prompt library for tip generation
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/pocketplan/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! A prompt file is Markdown with YAML frontmatter and optional `# System`
//! and `# User` sections. Variables use `{{name}}`; `{{#if name}}...{{/if}}`
//! blocks are dropped when `name` is missing or empty.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const BUDGET_TIPS: &str = include_str!("../../../prompts/budget_tips.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    BudgetTips,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BudgetTips => "budget_tips",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[Self::BudgetTips]
    }

    fn default_content(&self) -> &'static str {
        match self {
            Self::BudgetTips => defaults::BUDGET_TIPS,
        }
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
    pub task_type: String,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    /// The prompt content (system + user sections)
    pub content: String,
    /// Whether this came from an override file
    pub is_override: bool,
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    /// Get the system section of the prompt
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    /// Get the user section of the prompt
    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render the user section (or the whole body when there is none)
    pub fn render_user(&self, vars: &HashMap<&str, &str>) -> String {
        render_template(self.user_section().unwrap_or(&self.content), vars)
    }

    /// Render the system section, if the prompt has one
    pub fn render_system(&self, vars: &HashMap<&str, &str>) -> Option<String> {
        self.system_section()
            .map(|system| render_template(system, vars))
            .filter(|s| !s.is_empty())
    }
}

/// Prompt library for loading and caching prompts
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Create a new prompt library with the default override directory
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with a custom override directory
    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with no override directory (embedded only)
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, loading from override or default
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        if !self.cache.contains_key(&id) {
            let prompt = self.load(id)?;
            self.cache.insert(id, prompt);
        }
        self.cache
            .get(&id)
            .ok_or_else(|| Error::Prompt(format!("prompt {} missing from cache", id.as_str())))
    }

    fn load(&self, id: PromptId) -> Result<Prompt> {
        if let Some(ref override_dir) = self.override_dir {
            let override_path = override_dir.join(format!("{}.md", id.as_str()));
            if override_path.exists() {
                debug!(path = %override_path.display(), "Loading prompt override");
                let content = fs::read_to_string(&override_path).map_err(|e| {
                    Error::Prompt(format!("Failed to read prompt override: {}", e))
                })?;
                let (metadata, body) = parse_prompt(&content)?;
                return Ok(Prompt {
                    metadata,
                    content: body,
                    is_override: true,
                    override_path: Some(override_path),
                });
            }
        }

        let (metadata, body) = parse_prompt(id.default_content())?;
        Ok(Prompt {
            metadata,
            content: body,
            is_override: false,
            override_path: None,
        })
    }

    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("pocketplan").join("prompts").join("overrides"))
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    let rest = content
        .strip_prefix("---")
        .ok_or_else(|| Error::Prompt("Prompt must start with YAML frontmatter (---)".into()))?;

    let end = rest.find("---").ok_or_else(|| {
        Error::Prompt("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::Prompt(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Extract a section from the prompt content
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    // Up to the next header or end of content
    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

/// Render `{{#if}}` blocks, then substitute `{{var}}` placeholders
///
/// Substitution is a single left-to-right pass: values are inserted verbatim
/// and never scanned again, so user-typed text containing `{{...}}` stays
/// as typed. Placeholders with no matching variable are left in place.
fn render_template(template: &str, vars: &HashMap<&str, &str>) -> String {
    let resolved = remove_unmatched_conditionals(template, vars);
    substitute_vars(&resolved, vars)
}

fn substitute_vars(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            result.push_str(&rest[open..]);
            return result;
        };
        match vars.get(&after_open[..close]) {
            Some(value) => result.push_str(value),
            None => result.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &after_open[close + 2..];
    }

    result.push_str(rest);
    result
}

/// Resolve `{{#if var}}...{{/if}}` blocks
fn remove_unmatched_conditionals(content: &str, vars: &HashMap<&str, &str>) -> String {
    let mut result = content.to_string();

    while let Some(if_start) = result.find("{{#if ") {
        let var_start = if_start + 6;
        let Some(var_end) = result[var_start..].find("}}") else {
            break;
        };
        let var_name = &result[var_start..var_start + var_end];
        let block_start = var_start + var_end + 2;

        let Some(endif_pos) = result[block_start..].find("{{/if}}") else {
            break;
        };
        let block_content = &result[block_start..block_start + endif_pos];
        let full_end = block_start + endif_pos + 7;

        let keep = vars.get(var_name).is_some_and(|v| !v.is_empty());
        result = if keep {
            format!(
                "{}{}{}",
                &result[..if_start],
                block_content,
                &result[full_end..]
            )
        } else {
            format!("{}{}", &result[..if_start], &result[full_end..])
        };
    }

    result
}
