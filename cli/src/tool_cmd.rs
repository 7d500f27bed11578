//! `braid tool list` and `braid tool show <NAME>`.
//!
//! Both read the same registry the agent and demos use: the analyst tools, the
//! weather / air quality lookups, the advice tools and the PDF word counter.

use braid::tools::advice::{clothing_advice_tool, exercise_advice_tool};
use braid::tools::finance::analyst_registry;
use braid::tools::pdf::count_words_in_pdf_tool;
use braid::tools::web::{AqiTool, TemperatureTool};
use braid::{ToolRegistry, ToolSpec};

use crate::scenarios::RunError;

/// Longer descriptions are cut and end with "...".
const LIST_DESC_MAX_LEN: usize = 60;

/// Every tool the CLI knows about.
pub fn all_tools() -> ToolRegistry {
    analyst_registry()
        .with(TemperatureTool::new())
        .with(AqiTool::new(braid_config::waqi_token().unwrap_or_default()))
        .with(clothing_advice_tool())
        .with(exercise_advice_tool())
        .with(count_words_in_pdf_tool())
}

fn first_line(description: Option<&str>) -> String {
    let line = description.unwrap_or("").lines().next().unwrap_or("");
    if line.chars().count() > LIST_DESC_MAX_LEN {
        let cut: String = line.chars().take(LIST_DESC_MAX_LEN).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

/// `NAME\tDESCRIPTION` table, or a JSON array of specs when `json` is set.
pub fn render_list(tools: &ToolRegistry, json: bool) -> Result<String, RunError> {
    let specs = tools.list();
    if json {
        return Ok(serde_json::to_string_pretty(&specs)?);
    }
    let width = specs.iter().map(|s| s.name.len()).max().unwrap_or(4).max(4);
    let mut out = format!("{:<width$}\t{}\n", "NAME", "DESCRIPTION", width = width);
    for spec in &specs {
        out.push_str(&format!(
            "{:<width$}\t{}\n",
            spec.name,
            first_line(spec.description.as_deref()),
            width = width
        ));
    }
    Ok(out)
}

fn render_spec_text(spec: &ToolSpec) -> Result<String, RunError> {
    Ok(format!(
        "name: {}\ndescription: {}\ninput_schema:\n{}\n",
        spec.name,
        spec.description.as_deref().unwrap_or(""),
        serde_json::to_string_pretty(&spec.input_schema)?
    ))
}

/// Full spec of one tool; [`RunError::ToolNotFound`] for unknown names.
pub fn render_show(tools: &ToolRegistry, name: &str, json: bool) -> Result<String, RunError> {
    let spec = tools
        .get(name)
        .map(|t| t.spec())
        .ok_or_else(|| RunError::ToolNotFound(name.to_string()))?;
    if json {
        Ok(format!("{}\n", serde_json::to_string_pretty(&spec)?))
    } else {
        render_spec_text(&spec)
    }
}
