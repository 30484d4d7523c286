//! Minimal CLI: JSON documents → (ReQL wire terms | expression check)
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use rayon::prelude::*;

use crate::coerce::Coercer;
use crate::config::{CoerceOptions, DepthPolicy};
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// coerce JSON/NDJSON documents into ReQL expression trees
#[derive(Parser, Debug)]
#[command(name = "reql-coerce", version)]
pub struct CommandLineInterface {
    /// verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// coerce every document and print its wire-encoded term
    Ast(AstOut),
    /// report which documents do not coerce to a value expression
    Check(CheckOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// turn RFC 3339 strings into timestamps instead of plain strings
    #[arg(long, default_value_t = false)]
    parse_dates: bool,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct CoerceSettings {
    /// JSON file with coercion options
    #[arg(long)]
    config: Option<PathBuf>,

    /// recursion budget (overrides the config file)
    #[arg(long)]
    max_depth: Option<u32>,

    /// give every map value a fresh budget instead of spending it
    #[arg(long, default_value_t = false)]
    arrays_only: bool,
}

#[derive(clap::Parser, Debug)]
struct AstOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    coerce_settings: CoerceSettings,

    /// output file (stdout if omitted); one term per line
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// pretty-print each term
    #[arg(long)]
    pretty: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    coerce_settings: CoerceSettings,
}

/// One input document and where it came from.
#[derive(Debug)]
struct Document {
    origin: String,
    json: serde_json::Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        for source_path in resolve_file_path_patterns(&self.input)? {
            let origin = source_path.to_string_lossy().to_string();
            let source = read_source(&source_path)
                .with_context(|| format!("failed to read source file ({origin})"))?;
            if self.ndjson {
                for (line_no, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let json = serde_json::from_str(line)
                        .with_context(|| format!("failed to parse JSON ({origin}:{})", line_no + 1))?;
                    self.select(format!("{origin}:{}", line_no + 1), json, &mut docs)?;
                }
            } else {
                let json = serde_json::from_str(&source)
                    .with_context(|| format!("failed to parse JSON source file ({origin})"))?;
                self.select(origin, json, &mut docs)?;
            }
        }
        debug!("loaded {} document(s)", docs.len());
        Ok(docs)
    }

    /// Apply the JSON pointer, then the jq filter.
    fn select(&self, origin: String, json: serde_json::Value, out: &mut Vec<Document>) -> Result<()> {
        let json = match self.json_pointer.as_deref() {
            None => json,
            Some(ptr) => json
                .pointer(ptr)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {ptr} matched nothing in {origin}"))?,
        };
        match self.jq_expr.as_deref() {
            None => out.push(Document { origin, json }),
            Some(jq_expr) => {
                let results = crate::jq_exec::run_filter(jq_expr, &json)
                    .with_context(|| format!("failed to apply jq expression to {origin}"))?;
                for (ix, json) in results.into_iter().enumerate() {
                    out.push(Document { origin: format!("{origin}#{ix}"), json });
                }
            }
        }
        Ok(())
    }

    fn to_value(&self, json: &serde_json::Value) -> Value {
        let value = Value::from(json.clone());
        if self.parse_dates { value.with_parsed_dates() } else { value }
    }
}

impl CoerceSettings {
    fn coercer(&self) -> Result<Coercer> {
        let mut options = match self.config.as_ref() {
            Some(path) => CoerceOptions::load(path)?,
            None => CoerceOptions::default(),
        };
        if let Some(max_depth) = self.max_depth {
            anyhow::ensure!(max_depth > 0, "--max-depth must be at least 1");
            options = options.with_max_depth(max_depth);
        }
        if self.arrays_only {
            options = options.with_depth_policy(DepthPolicy::ArraysOnly);
        }
        debug!("coercion options: {options:?}");
        Ok(Coercer::new(options))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Returns `false` when `check` found documents that fail.
    pub fn run(&self) -> Result<bool> {
        match &self.cmd {
            Command::Ast(target) => {
                let coercer = target.coerce_settings.coercer()?;
                let docs = target.input_settings.load_documents()?;
                let rendered = docs
                    .par_iter()
                    .map(|doc| {
                        let value = target.input_settings.to_value(&doc.json);
                        let wire = coercer
                            .to_ast(value)
                            .and_then(|term| term.build())
                            .with_context(|| format!("failed to coerce {}", doc.origin))?;
                        let text = if target.pretty {
                            serde_json::to_string_pretty(&wire)?
                        } else {
                            serde_json::to_string(&wire)?
                        };
                        Ok(text)
                    })
                    .collect::<Result<Vec<String>>>()?;

                let mut output = rendered.join("\n");
                output.push('\n');
                match target.out.as_ref() {
                    Some(out) => {
                        if let Some(parent) = out.parent() {
                            std::fs::create_dir_all(parent)?;
                        }
                        std::fs::write(out, &output)
                            .with_context(|| format!("failed to write {}", out.display()))?;
                        info!("wrote {} term(s) to {}", rendered.len(), out.display());
                    }
                    None => print!("{output}"),
                }
                Ok(true)
            }
            Command::Check(target) => {
                let coercer = target.coerce_settings.coercer()?;
                let docs = target.input_settings.load_documents()?;
                let outcomes = docs
                    .par_iter()
                    .map(|doc| coercer.to_expr(target.input_settings.to_value(&doc.json)))
                    .collect::<Vec<_>>();

                let mut failures = 0usize;
                for (doc, outcome) in docs.iter().zip(outcomes) {
                    match outcome {
                        Ok(_) => println!("{} {}", "ok".green(), doc.origin),
                        Err(error) => {
                            failures += 1;
                            println!("{} {}: {error} ({:?})", "error".red().bold(), doc.origin, error.kind());
                        }
                    }
                }
                info!("{} of {} document(s) failed", failures, docs.len());
                Ok(failures == 0)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_source(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            anyhow::ensure!(matched_any, "glob pattern matched no files: {pattern}");
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
