//! # scaffoldsrv Templates Command
//!
//! File: cli/src/commands/templates.rs
//!
//! ## Overview
//!
//! `scaffoldsrv templates` runs the same `new --list` invocation and parser as
//! `GET /templates`, and prints the result. Useful for checking that the
//! configured tool is reachable and that its listing still parses before
//! starting the server.
//!
//! ```bash
//! scaffoldsrv templates --tool ~/.dotnet/dotnet
//! scaffoldsrv templates --json
//! ```
//!
//! Example output:
//!
//! ```text
//! Short Name | Name                | Languages  | Tags
//! -----------+---------------------+------------+---------------
//! classlib   | Class Library       | [C#],F#,VB | Common/Library
//! console    | Console Application | [C#],F#,VB | Common/Console
//!
//! Found 2 template(s).
//! ```
//!
use crate::common::process::ProcessRunner;
use crate::core::config::{self, ToolArgs, ToolConfig};
use crate::core::error::Result;
use crate::core::template_list::{self, TemplateListing};
use anyhow::Context;
use clap::Parser;
use std::fmt::Write;
use tracing::info;

/// # Templates Arguments (`TemplatesArgs`)
#[derive(Parser, Debug)]
pub struct TemplatesArgs {
    /// Print the listing as JSON (same shape as `GET /templates`).
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub tool: ToolArgs,
}

/// # Handle Templates Command (`handle_templates`)
///
/// ## Errors
///
/// Fails if the configuration is invalid, the tool cannot be run or exits
/// non-zero, or its output no longer parses.
pub async fn handle_templates(args: TemplatesArgs) -> Result<()> {
    info!("Handling templates command...");

    let file_config = config::load_file_config(args.tool.config.as_deref())?;
    let tool = ToolConfig::resolve(&args.tool, file_config.as_ref())?;
    let runner = ProcessRunner::new(&tool);

    let stdout = runner
        .run(&["new", "--list"], None)
        .await
        .into_result()
        .with_context(|| format!("Failed to list templates with {}", tool.executable.display()))?;
    let templates = template_list::parse_listing(&stdout)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
    } else {
        print!("{}", format_template_table(&templates));
    }
    Ok(())
}

/// Renders templates as a `|`-separated table with a count footer.
fn format_template_table(templates: &TemplateListing) -> String {
    if templates.is_empty() {
        return "No templates installed.\n".to_string();
    }

    let width = |title: &str, cell: fn((&String, &template_list::TemplateInfo)) -> usize| {
        templates.iter().map(cell).max().unwrap_or(0).max(title.len())
    };
    let short_w = width("Short Name", |(short, _)| short.chars().count());
    let name_w = width("Name", |(_, t)| t.name.chars().count());
    let lang_w = width("Languages", |(_, t)| t.languages.chars().count());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<short_w$} | {:<name_w$} | {:<lang_w$} | Tags",
        "Short Name", "Name", "Languages"
    );
    let _ = writeln!(
        out,
        "{:-<short_w$}-+-{:-<name_w$}-+-{:-<lang_w$}-+-{:-<tags_w$}",
        "",
        "",
        "",
        "",
        tags_w = width("Tags", |(_, t)| t.tags.chars().count())
    );
    for (short, info) in templates {
        let _ = writeln!(
            out,
            "{:<short_w$} | {:<name_w$} | {:<lang_w$} | {}",
            short, info.name, info.languages, info.tags
        );
    }
    let _ = writeln!(out, "\nFound {} template(s).", templates.len());
    out
}
