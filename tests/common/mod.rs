//! Shared controllers and request helpers for integration tests.

#![allow(dead_code)]

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};

use mvc_router::{
    Actions, AppConfig, Callbacks, Context, Controller, ControllerRegistry, HookSpec, HookTable, HttpServer,
    RequestHead, Resolver, RouteTable,
};

/// Ordered record of callback invocations.
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Marker a scoped before hook leaves for the action.
#[derive(Debug, Clone)]
pub struct Authorized(pub String);

/// Echoes what the action saw:
/// `<endpoint> <method> id=<id> title=<title> auth=<who> len=<content-length>`,
/// then ` file=<filename>:<bytes>` per upload.
pub struct PostsController {
    log: Log,
}

impl PostsController {
    pub fn new(log: Log) -> Self {
        Self { log }
    }

    async fn echo(self: Arc<Self>, cx: Context) -> String {
        let mut line = format!(
            "{} {} id={} title={} auth={} len={}",
            cx.endpoint(),
            cx.method(),
            cx.param("id").unwrap_or("-"),
            cx.form().get("title").unwrap_or("-"),
            cx.get::<Authorized>().map(|a| a.0.as_str()).unwrap_or("-"),
            cx.content_length().map_or_else(|| "-".to_string(), |len| len.to_string()),
        );
        for file in cx.form().files() {
            line.push_str(&format!(" file={}:{}", file.filename, file.data.len()));
        }
        line
    }

    fn authorize(&self, cx: &mut Context) -> ControlFlow<Response> {
        self.log.lock().unwrap().push(format!("authorize {}", cx.endpoint()));
        if cx.headers().contains_key("x-deny") {
            return ControlFlow::Break((StatusCode::FORBIDDEN, "denied").into_response());
        }
        cx.insert(Authorized("editor".into()));
        ControlFlow::Continue(())
    }

    fn trace(&self, cx: &mut Context) -> ControlFlow<Response> {
        self.log.lock().unwrap().push(format!("trace {}", cx.endpoint()));
        ControlFlow::Continue(())
    }

    fn tag(&self, head: &RequestHead, mut response: Response) -> Response {
        self.log.lock().unwrap().push(format!("tag {}", head.endpoint));
        response
            .headers_mut()
            .insert("x-controller", HeaderValue::from_static("posts"));
        response
    }

    fn finish(&self, head: &RequestHead) {
        self.log.lock().unwrap().push(format!("finish {}", head.endpoint));
    }
}

impl Controller for PostsController {
    fn actions(actions: &mut Actions<Self>) {
        for action in ["index", "new", "create", "show", "edit", "update", "delete"] {
            actions.add(action, Self::echo);
        }
    }

    fn callbacks(callbacks: &mut Callbacks<Self>) {
        callbacks
            .before("authorize", Self::authorize)
            .before("trace", Self::trace)
            .after("tag", Self::tag)
            .teardown("finish", Self::finish);
    }

    fn hooks(hooks: &mut HookTable) {
        hooks
            .declare("before_request", HookSpec::callback("authorize", "edit update delete"))
            .declare("after_request", ["tag"])
            .declare("teardown_request", ["finish"]);
    }
}

/// Contributes application-wide hooks and one action.
pub struct AuditController {
    log: Log,
}

impl AuditController {
    pub fn new(log: Log) -> Self {
        Self { log }
    }

    async fn ping(self: Arc<Self>, _cx: Context) -> &'static str {
        "pong"
    }

    fn push(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

impl Controller for AuditController {
    fn actions(actions: &mut Actions<Self>) {
        actions.add("ping", Self::ping);
    }

    fn callbacks(callbacks: &mut Callbacks<Self>) {
        callbacks
            .before("boot", |c: &Self, _cx: &mut Context| {
                c.push("boot".into());
                ControlFlow::Continue(())
            })
            .before("audit", |c: &Self, cx: &mut Context| {
                c.push(format!("audit {}", cx.endpoint()));
                ControlFlow::Continue(())
            })
            .after("stamp", |c: &Self, head: &RequestHead, mut response: Response| {
                c.push(format!("stamp {}", head.endpoint));
                response.headers_mut().insert("x-audited", HeaderValue::from_static("1"));
                response
            })
            .teardown("done", |c: &Self, head: &RequestHead| {
                c.push(format!("done {}", head.endpoint));
            });
    }

    fn hooks(hooks: &mut HookTable) {
        hooks
            .declare("before_app_first_request", ["boot"])
            .declare("before_app_request", ["audit"])
            .declare("after_app_request", ["stamp"])
            .declare("teardown_app_request", ["done"]);
    }
}

/// Registry with `posts` and `audit` sharing `log`.
pub fn registry(log: &Log) -> ControllerRegistry {
    let mut registry = ControllerRegistry::new();
    let posts_log = log.clone();
    registry
        .register("posts", move || PostsController::new(posts_log.clone()))
        .unwrap();
    let audit_log = log.clone();
    registry
        .register("audit", move || AuditController::new(audit_log.clone()))
        .unwrap();
    registry
}

/// Resolve `table` and wrap it in a server with default configuration.
pub fn server(table: &RouteTable, registry: &ControllerRegistry) -> HttpServer {
    server_with(AppConfig::default(), table, registry)
}

pub fn server_with(config: AppConfig, table: &RouteTable, registry: &ControllerRegistry) -> HttpServer {
    let app = Resolver::new(table, registry)
        .body_limit(config.limits.max_body_bytes)
        .resolve()
        .unwrap();
    HttpServer::new(config, app)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

pub async fn send(server: &HttpServer, request: Request<Body>) -> TestResponse {
    let response = server.handle(request).await;
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8(body.to_vec()).unwrap(),
    }
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

pub fn form(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::CONTENT_LENGTH, body.len().to_string())
        .body(Body::from(body))
        .unwrap()
}

/// Multipart POST with `fields` and one `cover` file part.
pub fn multipart(uri: &str, fields: &[(&str, &str)], cover: &str) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--XyZ\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            name, value
        ));
    }
    body.push_str(&format!(
        "--XyZ\r\nContent-Disposition: form-data; name=\"cover\"; filename=\"cover.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n{}\r\n--XyZ--\r\n",
        cover
    ));

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XyZ")
        .header(header::CONTENT_LENGTH, body.len().to_string())
        .body(Body::from(body))
        .unwrap()
}
