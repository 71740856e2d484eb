#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use protoroute::config::GeneratorConfig;
use protoroute::descriptor::SchemaGraph;
use protoroute::generator::{generate_bundle, render_handlers, ArtifactKind};
use protoroute::model::build_server_specs;

fn widgets_handlers() -> String {
    let bundle = common::widgets_bundle();
    let graph = SchemaGraph::new(&bundle);
    let file = bundle.targets()[0];
    let servers = build_server_specs(file, &graph).unwrap();
    render_handlers(file, &servers, &graph, &GeneratorConfig::default()).unwrap()
}

/// Body of the binder method `name`, up to the handler call
fn binder_body<'s>(src: &'s str, name: &str) -> &'s str {
    let start = src
        .find(&format!("fn {name}(&self, req: &rt::HttpRequest)"))
        .unwrap_or_else(|| panic!("binder {name} not found"));
    let rest = &src[start..];
    let end = rest.find("let ctx = req.context();").unwrap();
    &rest[..end]
}

/// `tests/fixtures/widgets_v1_widgets_http.rs` is compiled into
/// `runtime_binding_tests`; it must stay what the generator emits.
#[test]
fn test_checked_in_handler_source_matches_generator() {
    let rendered = widgets_handlers();
    let checked_in =
        std::fs::read_to_string(common::fixture_path("widgets_v1_widgets_http.rs")).unwrap();
    // formatting aside
    let tokens = |src: &str| src.split_whitespace().map(str::to_string).collect::<Vec<_>>();
    assert_eq!(
        tokens(&rendered),
        tokens(&checked_in),
        "regenerate the fixture from widgets.yaml:\n{rendered}"
    );
}

#[test]
fn test_service_surface() {
    let src = widgets_handlers();
    assert!(src.starts_with("// Code generated by protoroute-gen. DO NOT EDIT.\n"));
    assert!(src.contains("/// HTTP surface of `widgets.v1.WidgetService`."));
    assert!(src.contains("pub trait WidgetServiceHttpServer: Send + Sync + 'static {"));
    assert!(src.contains("    /// Fetch one widget.\n    fn get_widget(\n"));
    assert!(src.contains("        input: super::ListWidgetsRequest,\n    ) -> Result<super::ListWidgetsResponse, rt::HandlerError>;"));
    assert!(src.contains("struct WidgetServiceController<S> {"));
    assert!(src.contains("pub fn register_widget_service_http_server<R: rt::HttpRouter, S: WidgetServiceHttpServer>("));
    // unrouted RPCs are not part of the surface
    assert!(!src.contains("fn ping("));
}

#[test]
fn test_get_binder_binds_query_then_path() {
    let src = widgets_handlers();
    let body = binder_body(&src, "bind_get_widget");
    let name = body
        .find(r#"body.name = req.query().optional("name", rt::parse::string)?;"#)
        .unwrap();
    let created = body
        .find(r#"body.created_at = Some(req.query().required("createdAt", rt::parse::timestamp)?);"#)
        .unwrap();
    let id = body
        .find(r#"body.id = req.path_params().required("id", rt::parse::int64)?;"#)
        .unwrap();
    assert!(name < created && created < id);
    assert!(!body.contains("decode_body"));
    // the path-bound field is not read from the query
    assert!(!body.contains(r#"req.query().required("id""#));
}

#[test]
fn test_list_binder_uses_enum_table_and_nested_targets() {
    let src = widgets_handlers();
    assert!(src.contains("const COLOR_VALUES: &[(&str, i32)] = &[\n    (\"COLOR_UNSPECIFIED\", 0),\n    (\"A\", 1),\n    (\"B\", 2),\n];"));
    let body = binder_body(&src, "bind_list_widgets");
    assert!(body.contains(
        r#"body.colors = req.query().list("colors", |v: &str| rt::parse::enumeration(COLOR_VALUES, v))?;"#
    ));
    assert!(body.contains(r#"body.page_size = req.query().required("pageSize", rt::parse::int32)?;"#));
    assert!(body.contains(
        r#"body.owner.get_or_insert_with(Default::default).display_name = req.query().optional("owner.displayName", rt::parse::string)?;"#
    ));
    assert!(!body.contains("extra"));
}

#[test]
fn test_body_binders_decode_json() {
    let src = widgets_handlers();
    let create = binder_body(&src, "bind_create_widget");
    assert!(create.contains("let mut body: super::Widget = req.decode_body()?;"));
    assert!(!create.contains("req.query()"));

    let delete = binder_body(&src, "bind_delete_widget");
    assert!(delete.contains("let mut body = super::DeleteWidgetRequest::default();"));
    assert!(delete.contains(r#"body.id = req.path_params().required("id", rt::parse::int64)?;"#));
}

#[test]
fn test_registration_wires_every_route() {
    let src = widgets_handlers();
    for (verb, path, binder) in [
        ("GET", "/widgets/{id}", "bind_get_widget"),
        ("GET", "/widgets", "bind_list_widgets"),
        ("POST", "/widgets", "bind_create_widget"),
        ("DELETE", "/widgets/{id}", "bind_delete_widget"),
    ] {
        let wiring = format!(
            "rt::Method::{verb},\n            \"{path}\",\n            Box::new(move |req: &rt::HttpRequest| controller.{binder}(req)),"
        );
        assert!(src.contains(&wiring), "missing registration of {binder}");
    }
}

#[test]
fn test_bundle_generates_only_routed_files() {
    let bundle = common::widgets_bundle();
    let files = generate_bundle(&bundle, &GeneratorConfig::default()).unwrap();
    assert_eq!(files.len(), 4);
    assert!(files.iter().all(|f| f.source == "widgets/v1/widgets.proto"));
    let kinds: Vec<ArtifactKind> = files.iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ArtifactKind::Handlers,
            ArtifactKind::OpenApiYaml,
            ArtifactKind::OpenApiJson,
            ArtifactKind::Permissions,
        ]
    );

    let permissions: serde_json::Value = serde_json::from_str(&files[3].contents).unwrap();
    assert_eq!(
        permissions,
        serde_json::json!({
            "WidgetService": {
                "GetWidgetRequest": {"Roles": ["reader"], "Features": []},
                "ListWidgetsRequest": {"Roles": ["reader"], "Features": []},
                "Widget": {"Roles": ["writer"], "Features": ["widget-create"]},
                "DeleteWidgetRequest": {"Roles": ["admin"], "Features": []}
            }
        })
    );
}
