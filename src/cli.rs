//! Minimal CLI: convert → (coerced JSON) | registry-check
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use crate::registry::{PseudoType, Registry};
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// coerce JSON values to a WebIDL-style type descriptor
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// convert every input document and print the coerced values
    Convert(ConvertOut),
    /// load a pseudo-type registry file and report what it defines
    RegistryCheck(RegistryCheckOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /detail/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct ConvertOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// target type descriptor, e.g. '[EnforceRange] long' or 'sequence<DOMString>'
    #[arg(short = 't', long = "type")]
    descriptor: String,

    /// pseudo-type registry .json file (dictionaries, enumerations, callbacks)
    #[arg(long)]
    registry: Option<PathBuf>,

    /// output .json file (stdout if omitted); one value per document, as an
    /// array when there is more than one
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct RegistryCheckOut {
    /// registry .json file to check
    #[arg(long)]
    registry: PathBuf,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Vec<(String, serde_json::Value)> {
        let mut documents = Vec::new();
        self.load_process(|source_path, value| documents.push((source_path.to_owned(), value)));
        documents
    }

    fn load_process(&self, mut apply: impl FnMut(&str, serde_json::Value)) {
        let source_paths = resolve_file_path_patterns(&self.input)
            .expect("failed to resolve input file paths");
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = match std::fs::read_to_string(&source_path) {
                Ok(x) => x,
                Err(error) => {
                    panic!("Failed to read source file ({source_path_str}): {error}");
                }
            };
            if self.ndjson {
                for line in source.lines().filter(|line| !line.trim().is_empty()) {
                    self.process_document(&source_path_str, line, &mut apply);
                }
            } else {
                self.process_document(&source_path_str, &source, &mut apply);
            }
        }
    }

    fn process_document(
        &self,
        source_path: &str,
        source: &str,
        apply: &mut impl FnMut(&str, serde_json::Value),
    ) {
        let json_value = match serde_json::from_str::<serde_json::Value>(source) {
            Ok(x) => x,
            Err(error) => {
                panic!("Failed to parse JSON source file ({source_path}): {error}");
            }
        };
        let json_value = match self.json_pointer.as_ref() {
            None => json_value,
            Some(pointer) => match json_value.pointer(pointer) {
                Some(node) => node.clone(),
                None => {
                    panic!("JSON pointer {pointer} selects nothing in {source_path}");
                }
            },
        };
        match self.jq_expr.as_ref() {
            None => apply(source_path, json_value),
            Some(jq_expr) => {
                let produced = match crate::jq_exec::apply_filter(jq_expr, &json_value) {
                    Ok(xs) => xs,
                    Err(error) => {
                        panic!(
                            "Failed to apply jq expression to source file ({source_path}): {error}"
                        );
                    }
                };
                for json_value in produced {
                    apply(source_path, json_value);
                }
            }
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) {
        match &self.cmd {
            Command::Convert(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return;
                }

                let registry = match target.registry.as_ref() {
                    None => Registry::new(),
                    Some(path) => match crate::path_de::load_registry(path) {
                        Ok(x) => x,
                        Err(error) => {
                            eprintln!("{} {error:#}", "error:".red().bold());
                            std::process::exit(1);
                        }
                    },
                };

                // 1) load every document up front
                let documents = target.input_settings.load_documents();
                log::debug!("loaded {} documents", documents.len());

                // 2) convert in parallel, keeping document order
                let outcomes: Vec<_> = documents
                    .par_iter()
                    .map(|(source_path, document)| {
                        let value = Value::from_json(document);
                        let outcome = crate::convert::convert(&target.descriptor, &value, &registry)
                            .map(|converted| converted.to_json());
                        (source_path, outcome)
                    })
                    .collect();

                // 3) report failures, collect the rest
                let mut converted = Vec::new();
                let mut failures = 0usize;
                for (source_path, outcome) in outcomes {
                    match outcome {
                        Ok(json_value) => converted.push(json_value),
                        Err(error) => {
                            failures += 1;
                            eprintln!("{} {source_path}: {error}", "error:".red().bold());
                            let mut cause = error.cause();
                            while let Some(inner) = cause {
                                eprintln!("  {} {inner}", "caused by:".yellow());
                                cause = inner.cause();
                            }
                        }
                    }
                }

                // 4) print (or write to file)
                let output = match converted.len() {
                    1 => converted.into_iter().next().unwrap(),
                    _ => serde_json::Value::Array(converted),
                };
                let output_src = serde_json::to_string_pretty(&output).unwrap();
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent).unwrap();
                    }
                    std::fs::write(out, &output_src).unwrap();
                } else {
                    println!("{output_src}");
                }
                if failures > 0 {
                    std::process::exit(1);
                }
            }
            Command::RegistryCheck(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return;
                }

                let registry = match crate::path_de::load_registry(&target.registry) {
                    Ok(x) => x,
                    Err(error) => {
                        eprintln!("{} {error:#}", "error:".red().bold());
                        std::process::exit(1);
                    }
                };
                for (name, pseudo_type) in registry.iter() {
                    let kind = match pseudo_type {
                        PseudoType::Dictionary { members } => {
                            format!("dictionary ({} members)", members.len())
                        }
                        PseudoType::Enum { values } => {
                            format!("enumeration ({} values)", values.len())
                        }
                        PseudoType::CallbackInterface => "callback interface".to_owned(),
                        PseudoType::SingleOperationCallbackInterface => {
                            "single operation callback interface".to_owned()
                        }
                        PseudoType::CallbackFunction => "callback function".to_owned(),
                    };
                    println!("{name}: {kind}");
                }
                println!("{} {} definitions", "ok:".green().bold(), registry.len());
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn looks_like_glob(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if looks_like_glob(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                match entry {
                    Ok(p) => {
                        matched_any = true;
                        out.push(p);
                    }
                    Err(e) => return Err(Box::new(e)),
                }
            }
            if !matched_any {
                // an explicit glob that matches nothing is an error
                return Err(format!("glob pattern matched no files: {pattern}").into());
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
