//! jq filtering over input documents, via the jaq engine.

use anyhow::{anyhow, Result};
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Run `filter` over one document and collect every value it produces.
pub fn apply_filter(filter: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter, path: () };

    let modules = loader.load(&arena, program).map_err(render_load_errors)?;

    let compiled = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(render_undefined_errors)?;

    let inputs = RcIter::new(core::iter::empty());
    let mut outputs = Vec::new();
    for item in compiled.run((Ctx::new([], &inputs), Val::from(input.clone()))) {
        let produced = item.map_err(|error| anyhow!("jq filter failed: {error:?}"))?;
        outputs.push(Value::from(produced));
    }
    Ok(outputs)
}

fn render_load_errors(errors: Vec<(load::File<&str, ()>, load::Error<&str>)>) -> anyhow::Error {
    let mut rendered = String::new();
    for (file, error) in errors {
        rendered.push_str(&format!("jq parse error: {error:?} in `{}`\n", file.code));
    }
    anyhow!(rendered)
}

fn render_undefined_errors(
    errors: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>,
) -> anyhow::Error {
    let mut rendered = String::new();
    for (file, names) in errors {
        for (name, undefined) in names {
            rendered.push_str(&format!("jq undefined `{name}`: {undefined:?} in `{}`\n", file.code));
        }
    }
    anyhow!(rendered)
}
