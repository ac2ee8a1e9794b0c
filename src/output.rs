//! Printing command results: a short human summary, or a JSON document
//! with `--json`.

use serde::Serialize;

use crate::error::{Error, JsonError, Result};

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Human rendering of one command result: a headline, `name: value`
/// fields, then one line per listed task.
#[derive(Debug, Clone, Default)]
pub struct Message {
    headline: String,
    fields: Vec<(&'static str, String)>,
    items: Vec<String>,
}

impl Message {
    pub fn new(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            ..Self::default()
        }
    }

    pub fn field(mut self, name: &'static str, value: impl ToString) -> Self {
        self.fields.push((name, value.to_string()));
        self
    }

    pub fn item(&mut self, line: impl Into<String>) {
        self.items.push(line.into());
    }

    pub fn render(&self) -> String {
        let mut out = self.headline.clone();
        for (name, value) in &self.fields {
            out.push_str(&format!("\n  {name}: {value}"));
        }
        for line in &self.items {
            out.push_str(&format!("\n  {line}"));
        }
        out
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    command: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonError>,
}

/// Print a successful result. `--quiet` silences the human form only.
pub fn print_result<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    message: &Message,
) -> Result<()> {
    if options.json {
        let envelope = Envelope {
            command,
            ok: true,
            data: Some(data),
            error: None,
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else if !options.quiet {
        println!("{}", message.render());
    }
    Ok(())
}

/// Print a failure: an `ok: false` document on stdout with `--json`,
/// otherwise `error: ...` on stderr.
pub fn print_error(command: &str, err: &Error, json: bool) {
    if json {
        let envelope: Envelope<'_, ()> = Envelope {
            command,
            ok: false,
            data: None,
            error: Some(JsonError::from(err)),
        };
        if let Ok(text) = serde_json::to_string_pretty(&envelope) {
            println!("{text}");
            return;
        }
    }
    eprintln!("error: {err}");
}
