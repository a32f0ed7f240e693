use console::style;
use serde::Serialize;

use crate::error::{CriError, Result};

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| CriError::Config(format!("serialize output: {err}")))?;
    println!("{payload}");
    Ok(())
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 18,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push(String::new());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push("-".repeat(text.len().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let key_style = style(format!("{key:width$}", width = self.key_width)).dim();
        self.lines.push(format!("{key_style} {value}"));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}

/// Print `err` the way the active output mode expects.
///
/// Robot mode writes a structured JSON error to stdout, human mode a single
/// line with the suggestion to stderr.
pub fn emit_error(err: &CriError, robot: bool) {
    let structured = err.to_structured();
    if robot {
        let payload = serde_json::json!({
            "error": true,
            "code": structured.code.code_string(),
            "numeric_code": structured.numeric_code,
            "message": structured.message,
            "suggestion": structured.suggestion,
            "category": structured.category,
            "recoverable": structured.recoverable,
            "context": structured.context,
        });
        println!("{}", serde_json::to_string(&payload).unwrap_or_default());
    } else {
        eprintln!("{} {err}", style("Error:").red().bold());
        eprintln!("  {}", style(&structured.suggestion).dim());
    }
}
