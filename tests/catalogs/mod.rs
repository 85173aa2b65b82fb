// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use docschema::registry::namespaces;
use docschema::*;

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

fn str_() -> TypeExpr {
    TypeExpr::leaf("builtins.str")
}

fn check_model() -> Result<ModelRef> {
    Ok(ModelRef::new(
        "loco.schema",
        "BaseCheck",
        ModelDef::new()
            .doc("A check.\n\nChecks run after the action.")
            .field(Field::new("description", TypeExpr::optional(str_())).with_default(json!(null))),
    )?)
}

struct Http {
    cookie: ModelRef,
    request: ModelRef,
    response: ModelRef,
    action: ModelRef,
}

fn http_models(check: &ModelRef) -> Result<Http> {
    let cookie = ModelRef::new(
        "loco.http.schema",
        "CookieModel",
        ModelDef::new()
            .doc("An HTTP cookie.")
            .field(Field::new("name", str_()))
            .field(
                Field::new("http_only", TypeExpr::optional(TypeExpr::leaf("builtins.bool")))
                    .with_default(false)
                    .with_serialization_alias(Alias::choices(["httpOnly", "HttpOnly"])),
            ),
    )?;
    let request = ModelRef::new(
        "loco.http.schema",
        "RequestModel",
        ModelDef::new()
            .field(Field::new("url", str_()))
            .field(
                Field::new("cookies", TypeExpr::list(TypeExpr::model(&cookie)))
                    .with_default_factory(DefaultFactory::func(|| json!([]))),
            ),
    )?;
    let response = ModelRef::new(
        "loco.http.schema",
        "ResponseModel",
        ModelDef::new()
            .field(Field::new("status", TypeExpr::leaf("builtins.int")))
            .field(Field::new("request", TypeExpr::model(&request)))
            .field(Field::new("cookies", TypeExpr::list(TypeExpr::model(&cookie)))),
    )?;
    let action = ModelRef::new(
        "loco.http.actions",
        "GetAction",
        ModelDef::new()
            .doc("Sends a GET request.\nThe response is kept for checks.")
            .field(
                Field::new("url", str_())
                    .with_validation_alias(Alias::choices(["url", "endpoint"]))
                    .with_description("Target URL."),
            )
            .field(
                Field::new("expect", TypeExpr::list(TypeExpr::model(check)))
                    .with_default_factory(DefaultFactory::func(|| json!([]))),
            ),
    )?;
    Ok(Http {
        cookie,
        request,
        response,
        action,
    })
}

fn fields_of(model: &ModelRef) -> Result<Vec<(String, String)>> {
    Ok(model
        .body()?
        .fields()
        .map(|field| (field.name().to_string(), field.ty().to_string()))
        .collect())
}

#[test]
fn http_catalog_mixes_modes() -> Result<()> {
    super::init_tracing();
    let check = check_model()?;
    let http = http_models(&check)?;

    let namespace = Arc::new(Namespace::new("docs.http"));
    let config = ProjectionConfig::new(namespace.clone())
        .rename_model(&http.cookie, "Cookie")
        .rename_model(&http.request, "Request")
        .rename_model(&http.response, "Response")
        .rename_model(&http.action, "HttpGet")
        .replace_model(&check, TypeExpr::forward("Check"));

    let projected = Catalog::new(config)
        .models([&http.cookie, &http.request, &http.response], Mode::Output)
        .model(&http.action, Mode::Input)
        .register()?;

    let names: Vec<String> = projected.iter().map(ToString::to_string).collect();
    assert_eq!(names, ["Cookie", "Request", "Response", "HttpGet"]);
    assert_eq!(
        namespace.list_names(),
        vec![
            Arc::<str>::from("Cookie"),
            Arc::<str>::from("HttpGet"),
            Arc::<str>::from("Request"),
            Arc::<str>::from("Response")
        ]
    );

    let cookie = namespace.get("Cookie").unwrap();
    assert_eq!(
        fields_of(&cookie)?,
        [
            ("name".to_string(), "str".to_string()),
            ("httpOnly".to_string(), "bool".to_string())
        ]
    );
    assert_eq!(
        cookie.body()?.field("httpOnly").unwrap().description(),
        Some("**Aliases**: `httpOnly` and `HttpOnly`")
    );

    let response = namespace.get("Response").unwrap();
    assert_eq!(
        fields_of(&response)?,
        [
            ("status".to_string(), "int".to_string()),
            ("request".to_string(), "Request".to_string()),
            ("cookies".to_string(), "list[Cookie]".to_string())
        ]
    );

    let action = namespace.get("HttpGet").unwrap();
    let body = action.body()?;
    assert_eq!(body.doc(), Some("Sends a GET request."));
    assert_eq!(
        body.field("url").unwrap().description(),
        Some("Target URL.\n\n**Aliases**: `url` and `endpoint`")
    );
    assert_eq!(body.field("expect").unwrap().ty().to_string(), "list[Check]");
    assert!(action.extends(&http.action));
    Ok(())
}

#[test]
fn json_catalog_renames_extracted_variants() -> Result<()> {
    super::init_tracing();
    let decoder = ModelRef::new(
        "loco.json.format",
        "JsonDecoder",
        ModelDef::new().field(Field::new("format", TypeExpr::literal(["json"]))),
    )?;
    let decoder_with_query = ModelRef::new(
        "loco.json.format",
        "JsonDecoderWithQuery",
        ModelDef::new()
            .field(Field::new("format", TypeExpr::literal(["json"])))
            .field(Field::new("query", str_())),
    )?;
    let any_decoder = ModelRef::new(
        "loco.json.format",
        "AnyDecoder",
        ModelDef::root(TypeExpr::annotated(
            TypeExpr::union([
                TypeExpr::model(&decoder),
                TypeExpr::model(&decoder_with_query),
            ]),
            [Annotation::Note("discriminated by query".into())],
        )),
    )?;
    let encoder = ModelRef::new(
        "loco.json.format",
        "JsonEncoder",
        ModelDef::new().field(Field::new("indent", TypeExpr::leaf("builtins.int")).with_default(2)),
    )?;
    let any_encoder = ModelRef::new(
        "loco.json.format",
        "AnyEncoder",
        ModelDef::root(TypeExpr::union([TypeExpr::model(&encoder)])),
    )?;

    let decoders = extract_models(&any_decoder)?;
    let encoders = extract_models(&any_encoder)?;
    let (first, second, encoder) = (&decoders[0], &decoders[1], &encoders[0]);

    let namespace = namespaces::get_or_create("tests.catalogs.json");
    let config = ProjectionConfig::new(namespace.clone())
        .rename_model(first, "Decoder")
        .rename_model(second, "SelectiveDecoder")
        .rename_model(encoder, "Encoder");

    Catalog::new(config)
        .models([first, second, encoder], Mode::Input)
        .register()?;

    let rendered = serde_json::to_value(namespace.as_ref())?;
    assert_eq!(
        rendered,
        json!({
            "name": "tests.catalogs.json",
            "models": {
                "Decoder": {
                    "name": "Decoder",
                    "extends": "loco.json.format.JsonDecoder",
                    "fields": [
                        {"name": "format", "type": "Literal[\"json\"]", "required": true}
                    ]
                },
                "Encoder": {
                    "name": "Encoder",
                    "extends": "loco.json.format.JsonEncoder",
                    "fields": [
                        {"name": "indent", "type": "int", "required": false, "default": 2}
                    ]
                },
                "SelectiveDecoder": {
                    "name": "SelectiveDecoder",
                    "extends": "loco.json.format.JsonDecoderWithQuery",
                    "fields": [
                        {"name": "format", "type": "Literal[\"json\"]", "required": true},
                        {"name": "query", "type": "str", "required": true}
                    ]
                }
            },
            "types": {}
        })
    );

    // The module-level namespace is the same instance on every lookup.
    assert!(Arc::ptr_eq(
        &namespace,
        &namespaces::get("tests.catalogs.json").unwrap()
    ));
    namespaces::remove("tests.catalogs.json");
    Ok(())
}

fn checker(name: &str, ty: TypeExpr) -> Result<ModelRef> {
    Ok(ModelRef::new(
        "loco.builtins.checkers",
        name,
        ModelDef::new()
            .doc(format!("Checks the value with `{name}`."))
            .field(Field::new("value", ty))
            .validator("compare"),
    )?)
}

fn checker_name(name: &str) -> String {
    name.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<String>()
        + "Check"
}

#[test]
fn core_catalog_exports_types_and_checkers() -> Result<()> {
    super::init_tracing();
    let check = check_model()?;
    let type_name = ModelRef::new(
        "loco.schema.inputs",
        "TypeName",
        ModelDef::root(TypeExpr::annotated(
            TypeExpr::literal(["str", "int", "float"]),
            [Annotation::Validator("normalize".into())],
        )),
    )?;
    let parameter = ModelRef::new(
        "loco.schema.cases",
        "Parameter",
        ModelDef::new()
            .field(Field::new("name", str_()))
            .field(Field::new("type", TypeExpr::model(&type_name)).with_default("str")),
    )?;

    let mut models = vec![parameter.clone(), check.clone()];
    let mut config = ProjectionConfig::new(Arc::new(Namespace::new("docs.core")))
        .rename_model(&check, "Check");
    for name in ["eq", "not_eq", "regex_match"] {
        let model = checker(name, TypeExpr::leaf("typing.Any"))?;
        config = config.rename_model(&model, checker_name(name));
        models.push(model);
    }

    let catalog = Catalog::new(config).models(&models, Mode::Input);
    let exported = catalog.export_type("TypeName", &TypeExpr::model(&type_name))?;
    assert_eq!(exported.to_string(), r#"Literal["str", "int", "float"]"#);
    catalog.register()?;

    let namespace = catalog.config().namespace();
    assert_eq!(
        namespace.list_names(),
        vec![
            Arc::<str>::from("Check"),
            Arc::<str>::from("EqCheck"),
            Arc::<str>::from("NotEqCheck"),
            Arc::<str>::from("Parameter"),
            Arc::<str>::from("RegexMatchCheck")
        ]
    );

    let parameter_type = namespace.get("Parameter").unwrap().body()?.field("type").unwrap().ty().clone();
    assert_eq!(parameter_type, exported);

    let eq = namespace.get("EqCheck").unwrap();
    assert_eq!(eq.validators(), vec![Arc::<str>::from("compare")]);
    assert_eq!(eq.body()?.doc(), Some("Checks the value with `eq`."));

    // Exports keep the first definition.
    let again = catalog.export_type("TypeName", &str_())?;
    assert_eq!(again, exported);

    let rendered = serde_json::to_value(namespace.as_ref())?;
    assert_eq!(
        rendered["types"],
        json!({"TypeName": "Literal[\"str\", \"int\", \"float\"]"})
    );
    assert_eq!(
        rendered["models"]["Check"],
        json!({
            "name": "Check",
            "description": "A check.",
            "extends": "loco.schema.BaseCheck",
            "fields": [
                {"name": "description", "type": "Union[str, None]", "required": false, "default": null}
            ]
        })
    );
    Ok(())
}

#[test]
fn catalog_stops_at_first_failure() -> Result<()> {
    super::init_tracing();
    let fine = ModelRef::new("loco.schema", "Fine", ModelDef::new())?;
    let undefined = ModelRef::declare("loco.schema", "Undefined");
    let after = ModelRef::new("loco.schema", "After", ModelDef::new())?;

    let namespace = Arc::new(Namespace::new("docs.failing"));
    let result = Catalog::new(ProjectionConfig::new(namespace.clone()))
        .models([&fine, &undefined, &after], Mode::Input)
        .register();

    assert_eq!(
        result,
        Err(ProjectionError::Model(ModelError::Undefined(
            "loco.schema.Undefined".to_string()
        )))
    );
    assert!(namespace.contains("Fine"));
    assert!(!namespace.contains("After"));
    Ok(())
}

#[test]
fn qualname_is_module_and_name() -> Result<()> {
    let check = check_model()?;
    assert_eq!(qualname(&check), "loco.schema.BaseCheck");
    Ok(())
}
