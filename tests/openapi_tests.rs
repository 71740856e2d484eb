#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use oas3::OpenApiV3Spec;
use protoroute::config::GeneratorConfig;
use protoroute::descriptor::{parse_bundle, SchemaGraph};
use protoroute::generator::{render_openapi, strip_nulls, OpenApiDocument};
use protoroute::model::build_server_specs;
use serde_json::Value;

fn widgets_document(config: &GeneratorConfig) -> OpenApiDocument {
    let bundle = common::widgets_bundle();
    let graph = SchemaGraph::new(&bundle);
    let file = bundle.targets()[0];
    let servers = build_server_specs(file, &graph).unwrap();
    render_openapi(file, &servers, &graph, config).unwrap()
}

#[test]
fn test_yaml_is_an_openapi_document() {
    let doc = widgets_document(&GeneratorConfig::default());
    let spec: OpenApiV3Spec = serde_yaml::from_str(&doc.yaml).unwrap();
    assert_eq!(spec.openapi, "3.0.3");
    assert_eq!(spec.info.title, "widgets.v1");
    assert_eq!(spec.info.version, "1.0");

    let paths = spec.paths.as_ref().unwrap();
    let get = paths["/widgets/{id}"].get.as_ref().unwrap();
    assert_eq!(get.operation_id.as_deref(), Some("WidgetService_GetWidget"));
    assert_eq!(get.summary.as_deref(), Some("Get a widget"));
    assert!(paths["/widgets/{id}"].delete.is_some());
    assert!(paths["/widgets"].get.is_some());
    assert!(paths["/widgets"].post.is_some());

    let schemas = &spec.components.as_ref().unwrap().schemas;
    for name in ["Widget", "Owner", "ListWidgetsResponse", "Empty"] {
        assert!(schemas.contains_key(name), "missing component {name}");
    }
}

#[test]
fn test_shared_message_is_one_component_referenced_twice() {
    let doc = widgets_document(&GeneratorConfig::default());
    let v: Value = serde_json::from_str(&doc.json).unwrap();

    let widget_ref = "#/components/schemas/Widget";
    let create = &v["paths"]["/widgets"]["post"];
    assert_eq!(
        create["requestBody"]["content"]["application/json"]["schema"]["$ref"],
        widget_ref
    );
    assert_eq!(create["requestBody"]["description"], "Widget");
    assert_eq!(create["requestBody"]["required"], true);
    let get = &v["paths"]["/widgets/{id}"]["get"];
    assert_eq!(
        get["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
        widget_ref
    );

    // self reference through a repeated field
    let widget = &v["components"]["schemas"]["Widget"];
    assert_eq!(widget["properties"]["parts"]["items"]["$ref"], widget_ref);
    assert_eq!(
        widget["properties"]["attributes"]["additionalProperties"]["format"],
        "int32"
    );
    assert!(v["components"]["schemas"]
        .as_object()
        .unwrap()
        .keys()
        .all(|k| k != "Widget_AttributesEntry"));
}

#[test]
fn test_paths_keep_first_appearance_order() {
    let doc = widgets_document(&GeneratorConfig::default());
    let yaml: serde_yaml::Value = serde_yaml::from_str(&doc.yaml).unwrap();
    let paths: Vec<&str> = yaml["paths"]
        .as_mapping()
        .unwrap()
        .keys()
        .map(|k| k.as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["/widgets/{id}", "/widgets"]);

    let verbs: Vec<&str> = yaml["paths"]["/widgets/{id}"]
        .as_mapping()
        .unwrap()
        .keys()
        .map(|k| k.as_str().unwrap())
        .collect();
    assert_eq!(verbs, vec!["get", "delete"]);
}

#[test]
fn test_query_parameters_follow_the_tree() {
    let doc = widgets_document(&GeneratorConfig::default());
    let v: Value = serde_json::from_str(&doc.json).unwrap();
    let params = v["paths"]["/widgets"]["get"]["parameters"].as_array().unwrap();
    let names: Vec<&str> = params.iter().map(|p| p["name"].as_str().unwrap()).collect();
    // `extra` is a generic struct and is never bound from the query
    assert_eq!(
        names,
        vec!["colors", "pageSize", "owner.tenantId", "owner.displayName"]
    );

    let colors = &params[0];
    assert_eq!(colors["in"], "query");
    assert_eq!(colors["required"], false);
    assert_eq!(colors["schema"]["type"], "array");
    assert_eq!(
        colors["schema"]["items"]["enum"],
        serde_json::json!(["COLOR_UNSPECIFIED", "A", "B"])
    );
    assert_eq!(colors["schema"]["items"]["example"], "COLOR_UNSPECIFIED");
    assert_eq!(params[1]["required"], true);
    assert_eq!(params[1]["schema"]["format"], "int32");

    let get = &v["paths"]["/widgets/{id}"]["get"]["parameters"];
    assert_eq!(get[0]["in"], "path");
    assert_eq!(get[0]["required"], true);
    assert_eq!(get[2]["name"], "createdAt");
    assert_eq!(get[2]["schema"]["format"], "date-time");
    assert_eq!(get[2]["schema"]["example"], "2017-07-21T17:32:28Z");
}

#[test]
fn test_time_example_stays_a_string_in_yaml() {
    let doc = widgets_document(&GeneratorConfig::default());
    assert!(doc.yaml.contains("example: '2017-07-21T17:32:28Z'"));
    assert!(!doc.yaml.contains("example: 2017-07-21T17:32:28Z"));
    let v: Value = serde_json::from_str(&doc.json).unwrap();
    assert_eq!(
        v["components"]["schemas"]["Widget"]["properties"]["createdAt"]["example"],
        "2017-07-21T17:32:28Z"
    );
}

#[test]
fn test_json_is_the_null_stripped_yaml() {
    let doc = widgets_document(&GeneratorConfig::default());
    let mut from_yaml: Value = serde_yaml::from_str(&doc.yaml).unwrap();
    strip_nulls(&mut from_yaml);
    let json: Value = serde_json::from_str(&doc.json).unwrap();
    assert_eq!(from_yaml, json);
    assert!(!doc.json.contains("null"));
    assert!(doc.yaml.contains("description: null"));
}

#[test]
fn test_config_shapes_json_output() {
    let config = GeneratorConfig {
        strip_nulls: false,
        pretty_json: false,
        openapi_version: "2.4.0".to_string(),
        ..GeneratorConfig::default()
    };
    let doc = widgets_document(&config);
    assert!(!doc.json.contains('\n'));
    assert!(doc.json.contains(r#""summary":null"#));
    let v: Value = serde_json::from_str(&doc.json).unwrap();
    assert_eq!(v["info"]["version"], "2.4.0");
}

#[test]
fn test_documents_are_scoped_per_file() {
    let text = std::fs::read_to_string(common::fixture_path("widgets.yaml")).unwrap();
    let mut bundle = parse_bundle(&text, true).unwrap();
    // a second routed file using the same shared messages
    let mut second = bundle.files[1].clone();
    second.name = "widgets/v1/mirror.proto".to_string();
    bundle.files.push(second);

    let graph = SchemaGraph::new(&bundle);
    let counts: Vec<usize> = bundle
        .targets()
        .into_iter()
        .map(|file| {
            let servers = build_server_specs(file, &graph).unwrap();
            render_openapi(file, &servers, &graph, &GeneratorConfig::default())
                .unwrap()
                .schema_count
        })
        .collect();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0], counts[1]);
    assert!(counts[0] > 0);
}
