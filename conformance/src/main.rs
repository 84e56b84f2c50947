//! Fixture-driven conformance runner.
//!
//! Each `fixtures/*.json` file declares an optional registry and a list
//! of cases; every case feeds one JSON document through the conversion
//! entry point and checks the coerced result, or the error category,
//! message, and cause chain, against what the fixture records.
//!
//! Exits nonzero when any case fails. An alternate fixture directory
//! can be given as the first argument.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;

use idlcast::error::CoercionError;
use idlcast::registry::Registry;
use idlcast::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// FIXTURE SHAPE
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    registry: Registry,
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    #[serde(rename = "type")]
    descriptor: String,
    input: serde_json::Value,
    expect: Expectation,
}

#[derive(Debug, Deserialize)]
enum Expectation {
    #[serde(rename = "value")]
    Value(serde_json::Value),
    #[serde(rename = "error")]
    Error(ExpectedError),
}

/// `causes` is checked as a prefix of the actual cause chain, outermost
/// first; an empty list skips the chain entirely.
#[derive(Debug, Deserialize)]
struct ExpectedError {
    kind: String,
    message: String,
    #[serde(default)]
    causes: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// RUNNER
// ————————————————————————————————————————————————————————————————————————————

fn main() -> Result<()> {
    let fixture_dir = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures")),
    };
    let mut fixture_paths: Vec<PathBuf> = std::fs::read_dir(&fixture_dir)
        .with_context(|| format!("reading {}", fixture_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|extension| extension == "json"))
        .collect();
    fixture_paths.sort();
    anyhow::ensure!(
        !fixture_paths.is_empty(),
        "no fixture files under {}",
        fixture_dir.display()
    );
    let mut passed = 0usize;
    let mut failed = 0usize;
    for path in &fixture_paths {
        let fixture = load_fixture(path)?;
        println!("{}", file_name(path).bold());
        for case in &fixture.cases {
            match check(case, &fixture.registry) {
                Ok(()) => {
                    passed += 1;
                    println!("  {} {}", "ok".green(), case.name);
                }
                Err(reason) => {
                    failed += 1;
                    println!("  {} {}", "FAILED".red().bold(), case.name);
                    println!("         {reason}");
                }
            }
        }
    }
    if failed > 0 {
        println!("{}", format!("{passed} passed, {failed} failed").red().bold());
        std::process::exit(1);
    }
    println!("{}", format!("{passed} passed").green());
    Ok(())
}

fn load_fixture(path: &Path) -> Result<Fixture> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    idlcast::path_de::from_str_with_path(&source)
        .with_context(|| format!("parsing {}", path.display()))
}

fn check(case: &Case, registry: &Registry) -> Result<(), String> {
    let input = Value::from_json(&case.input);
    let result = idlcast::convert::convert(&case.descriptor, &input, registry);
    match (&case.expect, result) {
        (Expectation::Value(expected), Ok(actual)) => {
            let actual = actual.to_json();
            if &actual == expected {
                Ok(())
            } else {
                Err(format!("expected {expected}, got {actual}"))
            }
        }
        (Expectation::Value(_), Err(error)) => {
            Err(format!("unexpected {}: {}", category(&error), error.message()))
        }
        (Expectation::Error(_), Ok(actual)) => {
            Err(format!("expected an error, got {}", actual.to_json()))
        }
        (Expectation::Error(expected), Err(error)) => check_error(expected, &error),
    }
}

fn check_error(expected: &ExpectedError, error: &CoercionError) -> Result<(), String> {
    let kind = category(error);
    if kind != expected.kind {
        return Err(format!("expected a {} error, got {kind}", expected.kind));
    }
    if error.message() != expected.message {
        return Err(format!(
            "expected message {:?}, got {:?}",
            expected.message,
            error.message()
        ));
    }
    let mut link = error.cause();
    for (depth, expected_cause) in expected.causes.iter().enumerate() {
        let Some(cause) = link else {
            return Err(format!("cause {depth} missing, expected {expected_cause:?}"));
        };
        if cause.message() != expected_cause {
            return Err(format!(
                "cause {depth}: expected {expected_cause:?}, got {:?}",
                cause.message()
            ));
        }
        link = cause.cause();
    }
    Ok(())
}

fn category(error: &CoercionError) -> &'static str {
    if error.is_domain() { "domain" } else { "invalid-argument" }
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(|| path.display().to_string(), |name| {
        name.to_string_lossy().into_owned()
    })
}
