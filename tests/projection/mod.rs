// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use docschema::source::{ConfigSpec, SourceCatalog};
use docschema::*;

use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;
use test_generator::test_resources;

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct TestCase {
    note: String,
    catalog: SourceCatalog,
    #[serde(default)]
    config: ConfigSpec,
    register: Vec<String>,
    want_types: Option<Vec<String>>,
    want_models: Option<Value>,
    want_error: Option<String>,
    skip: Option<bool>,
}

#[derive(Deserialize, Debug)]
struct YamlTest {
    cases: Vec<TestCase>,
}

struct Outcome {
    types: Vec<String>,
    models: Value,
}

fn project(case: &TestCase) -> Result<Outcome> {
    let models = case.catalog.build()?;
    let namespace = Arc::new(Namespace::new("docs"));
    let config = case.config.resolve(&models, namespace.clone())?;

    let mut types = vec![];
    for name in &case.register {
        types.push(register_model(models.resolve(name)?, &config)?.to_string());
    }

    let rendered = serde_json::to_value(namespace.as_ref())?;
    Ok(Outcome {
        types,
        models: rendered["models"].clone(),
    })
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;

    std::eprintln!("running {file}");

    for case in test.cases {
        std::eprint!("case {} ", case.note);
        if case.skip == Some(true) {
            std::eprintln!("skipped");
            continue;
        }

        match (project(&case), &case.want_error) {
            (Ok(outcome), None) => {
                if let Some(want_types) = &case.want_types {
                    assert_eq!(&outcome.types, want_types, "case {}", case.note);
                }
                if let Some(want_models) = &case.want_models {
                    assert_eq!(&outcome.models, want_models, "case {}", case.note);
                }
            }
            (Err(actual), Some(expected)) => {
                if !actual.to_string().contains(expected.as_str()) {
                    panic!("`{actual}` does not contain `{expected}`");
                }
            }
            (Ok(outcome), Some(expected)) => {
                panic!(
                    "case {} succeeded with types {:?}, expected error `{expected}`",
                    case.note, outcome.types
                );
            }
            (Err(actual), None) => {
                panic!("case {} failed unexpectedly: {actual}", case.note);
            }
        }

        std::eprintln!("passed");
    }

    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    super::init_tracing();
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{e}");
        }
    }
}

#[test_resources("tests/projection/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
