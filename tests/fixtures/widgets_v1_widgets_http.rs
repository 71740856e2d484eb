// Code generated by protoroute-gen. DO NOT EDIT.
// source: widgets/v1/widgets.proto
// package: widgets.v1

use std::sync::Arc;

#[allow(unused_imports)]
use protoroute::runtime::{self as rt, ParamSource as _};

/// Name to ordinal table of `widgets.v1.Color`
const COLOR_VALUES: &[(&str, i32)] = &[
    ("COLOR_UNSPECIFIED", 0),
    ("A", 1),
    ("B", 2),
];

/// HTTP surface of `widgets.v1.WidgetService`.
pub trait WidgetServiceHttpServer: Send + Sync + 'static {
    /// Fetch one widget.
    fn get_widget(
        &self,
        ctx: &rt::RequestContext,
        input: super::GetWidgetRequest,
    ) -> Result<super::Widget, rt::HandlerError>;
    fn list_widgets(
        &self,
        ctx: &rt::RequestContext,
        input: super::ListWidgetsRequest,
    ) -> Result<super::ListWidgetsResponse, rt::HandlerError>;
    fn create_widget(
        &self,
        ctx: &rt::RequestContext,
        input: super::Widget,
    ) -> Result<super::Widget, rt::HandlerError>;
    fn delete_widget(
        &self,
        ctx: &rt::RequestContext,
        input: super::DeleteWidgetRequest,
    ) -> Result<super::Empty, rt::HandlerError>;
}

struct WidgetServiceController<S> {
    app: Arc<S>,
}

impl<S: WidgetServiceHttpServer> WidgetServiceController<S> {
    /// GET /widgets/{id}
    fn bind_get_widget(&self, req: &rt::HttpRequest) -> Result<rt::HttpResponse, rt::RouteError> {
        #[allow(unused_mut)]
        let mut body = super::GetWidgetRequest::default();
        body.name = req.query().optional("name", rt::parse::string)?;
        body.created_at = Some(req.query().required("createdAt", rt::parse::timestamp)?);
        body.id = req.path_params().required("id", rt::parse::int64)?;
        let ctx = req.context();
        let res = self
            .app
            .get_widget(&ctx, body)
            .map_err(rt::RouteError::Handler)?;
        rt::HttpResponse::json(200, &res)
    }
    /// GET /widgets
    fn bind_list_widgets(&self, req: &rt::HttpRequest) -> Result<rt::HttpResponse, rt::RouteError> {
        #[allow(unused_mut)]
        let mut body = super::ListWidgetsRequest::default();
        body.colors = req.query().list("colors", |v: &str| rt::parse::enumeration(COLOR_VALUES, v))?;
        body.page_size = req.query().required("pageSize", rt::parse::int32)?;
        body.owner.get_or_insert_with(Default::default).tenant_id = req.query().required("owner.tenantId", rt::parse::string)?;
        body.owner.get_or_insert_with(Default::default).display_name = req.query().optional("owner.displayName", rt::parse::string)?;
        let ctx = req.context();
        let res = self
            .app
            .list_widgets(&ctx, body)
            .map_err(rt::RouteError::Handler)?;
        rt::HttpResponse::json(200, &res)
    }
    /// POST /widgets
    fn bind_create_widget(&self, req: &rt::HttpRequest) -> Result<rt::HttpResponse, rt::RouteError> {
        #[allow(unused_mut)]
        let mut body: super::Widget = req.decode_body()?;
        let ctx = req.context();
        let res = self
            .app
            .create_widget(&ctx, body)
            .map_err(rt::RouteError::Handler)?;
        rt::HttpResponse::json(200, &res)
    }
    /// DELETE /widgets/{id}
    fn bind_delete_widget(&self, req: &rt::HttpRequest) -> Result<rt::HttpResponse, rt::RouteError> {
        #[allow(unused_mut)]
        let mut body = super::DeleteWidgetRequest::default();
        body.id = req.path_params().required("id", rt::parse::int64)?;
        let ctx = req.context();
        let res = self
            .app
            .delete_widget(&ctx, body)
            .map_err(rt::RouteError::Handler)?;
        rt::HttpResponse::json(200, &res)
    }
}

/// Register every routed RPC of `widgets.v1.WidgetService` on `router`.
pub fn register_widget_service_http_server<R: rt::HttpRouter, S: WidgetServiceHttpServer>(
    router: &mut R,
    service: Arc<S>,
) {
    let controller = Arc::new(WidgetServiceController { app: service });
    {
        let controller = Arc::clone(&controller);
        router.route(
            rt::Method::GET,
            "/widgets/{id}",
            Box::new(move |req: &rt::HttpRequest| controller.bind_get_widget(req)),
        );
    }
    {
        let controller = Arc::clone(&controller);
        router.route(
            rt::Method::GET,
            "/widgets",
            Box::new(move |req: &rt::HttpRequest| controller.bind_list_widgets(req)),
        );
    }
    {
        let controller = Arc::clone(&controller);
        router.route(
            rt::Method::POST,
            "/widgets",
            Box::new(move |req: &rt::HttpRequest| controller.bind_create_widget(req)),
        );
    }
    {
        let controller = Arc::clone(&controller);
        router.route(
            rt::Method::DELETE,
            "/widgets/{id}",
            Box::new(move |req: &rt::HttpRequest| controller.bind_delete_widget(req)),
        );
    }
}
