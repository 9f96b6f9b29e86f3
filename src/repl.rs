//! Interactive search loop.
//!
//! Each line is a query against the loaded records. Lines starting with `:`
//! are commands:
//!
//! - `:count <query>` - number of matches only
//! - `:explain <query>` - canonical form and expression tree
//! - `:stats` - compiled-query cache counters
//! - `:help`, `:quit`

use colored::Colorize;
use lmsql_core::SearchEngine;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;

use crate::config::OutputConfig;
use crate::render::{render_error, render_explain, render_matches, render_stats};

const HELP: &str = "\
Enter a query such as `average>=90 AND courses>=4` or `name:ana`.
Commands:
  :count <query>    number of matching records
  :explain <query>  show how the query was parsed
  :stats            compiled-query cache statistics
  :help             this message
  :quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Query(&'a str),
    Count(&'a str),
    Explain(&'a str),
    Stats,
    Help,
    Quit,
    Unknown(&'a str),
}

pub fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Query(line);
    };

    let (name, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    match name {
        "count" | "c" => Command::Count(arg.trim()),
        "explain" | "e" => Command::Explain(arg.trim()),
        "stats" => Command::Stats,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => Command::Unknown(name),
    }
}

/// REPL state: the shared engine and the loaded records.
pub struct Session<'a> {
    engine: &'a SearchEngine,
    records: Vec<Value>,
    output: OutputConfig,
}

impl<'a> Session<'a> {
    pub fn new(engine: &'a SearchEngine, records: Vec<Value>, output: OutputConfig) -> Self {
        Self {
            engine,
            records,
            output,
        }
    }

    /// Evaluate one input line. `None` means the session should end.
    pub fn eval_line(&self, line: &str) -> Option<String> {
        let output = match parse_command(line) {
            Command::Quit => return None,
            Command::Help => HELP.to_string(),
            Command::Stats => render_stats(&self.engine.cache_stats()),
            Command::Unknown(name) => format!("unknown command ':{}' (try :help)", name),
            Command::Count(query) => match self.engine.count(&self.records, query) {
                Ok(n) => format!("{} of {} records match", n, self.records.len()),
                Err(e) => render_error(&e, query, self.output.color),
            },
            Command::Explain(query) => match self.engine.compile(query) {
                Ok(compiled) => render_explain(&compiled),
                Err(e) => render_error(&e, query, self.output.color),
            },
            Command::Query(query) => match self.engine.search(&self.records, query) {
                Ok(matches) => {
                    let summary =
                        format!("{} of {} records match", matches.len(), self.records.len());
                    match render_matches(&matches, self.output.pretty) {
                        Ok(body) => format!("{}{}", body, self.dim(&summary)),
                        Err(e) => format!("failed to render matches: {}", e),
                    }
                }
                Err(e) => render_error(&e, query, self.output.color),
            },
        };
        Some(output)
    }

    fn dim(&self, text: &str) -> String {
        if self.output.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Run the interactive loop until `:quit`, Ctrl-D or Ctrl-C.
pub fn run(session: &Session<'_>) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!(
        "lms-search: {} records loaded. Type :help for commands.",
        session.records.len()
    );

    loop {
        match editor.readline("search> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());
                match session.eval_line(&line) {
                    Some(output) => println!("{}", output.trim_end()),
                    None => break,
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
