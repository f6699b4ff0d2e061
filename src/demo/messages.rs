//! In-memory message board exercising every RESTful action.
//!
//! `edit` renders a POST form with a hidden `_method=PUT` field, so the
//! method-override layer routes the submission to `update`.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::controller::{Actions, Callbacks, Context, Controller, RequestHead};
use crate::demo::escape;
use crate::helpers::{form_script, hidden_method};
use crate::hooks::{HookSpec, HookTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub title: String,
}

#[derive(Debug, Default)]
pub struct MessagesController {
    store: RwLock<BTreeMap<u64, Message>>,
    next_id: AtomicU64,
}

impl MessagesController {
    /// Create a message, returning its id.
    pub fn add(&self, title: &str) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let message = Message {
            id,
            title: title.to_string(),
        };
        self.store.write().unwrap_or_else(PoisonError::into_inner).insert(id, message);
        id
    }

    pub fn get(&self, id: u64) -> Option<Message> {
        self.store.read().unwrap_or_else(PoisonError::into_inner).get(&id).cloned()
    }

    async fn index(self: Arc<Self>, _cx: Context) -> Html<String> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        let mut html = String::from("<h1>Messages</h1><ul>");
        for message in store.values() {
            let _ = write!(html, "<li><a href=\"/messages/{}\">{}</a></li>", message.id, escape(&message.title));
        }
        html.push_str("</ul><a href=\"/messages/new\">New message</a>");
        Html(html)
    }

    async fn new_form(self: Arc<Self>, _cx: Context) -> Html<&'static str> {
        Html(
            "<form method=\"post\" action=\"/messages\">\
             <input name=\"title\"><button>Create</button></form>",
        )
    }

    async fn create(self: Arc<Self>, cx: Context) -> Response {
        match title(&cx) {
            Some(title) => {
                let id = self.add(title);
                tracing::debug!(id, "Message created");
                Redirect::to(&format!("/messages/{}", id)).into_response()
            }
            None => (StatusCode::UNPROCESSABLE_ENTITY, "title is required").into_response(),
        }
    }

    async fn show(self: Arc<Self>, cx: Context) -> Response {
        match cx.get::<Message>() {
            Some(message) => Html(format!(
                "<h1>{}</h1><a href=\"/messages/{}/edit\">Edit</a>",
                escape(&message.title),
                message.id
            ))
            .into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn edit(self: Arc<Self>, cx: Context) -> Response {
        let Some(message) = cx.get::<Message>() else {
            return StatusCode::NOT_FOUND.into_response();
        };
        let hidden = match hidden_method("put") {
            Ok(hidden) => hidden,
            Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        };
        Html(format!(
            "<form method=\"post\" action=\"/messages/{}\">{}\
             <input name=\"title\" value=\"{}\"><button>Save</button></form>{}",
            message.id,
            hidden,
            escape(&message.title),
            form_script()
        ))
        .into_response()
    }

    async fn update(self: Arc<Self>, cx: Context) -> Response {
        let (Some(message), Some(title)) = (cx.get::<Message>(), title(&cx)) else {
            return (StatusCode::UNPROCESSABLE_ENTITY, "title is required").into_response();
        };
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(stored) = store.get_mut(&message.id) {
            stored.title = title.to_string();
        }
        Redirect::to(&format!("/messages/{}", message.id)).into_response()
    }

    async fn delete(self: Arc<Self>, cx: Context) -> Response {
        if let Some(message) = cx.get::<Message>() {
            self.store
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&message.id);
            tracing::debug!(id = message.id, "Message deleted");
        }
        Redirect::to("/messages").into_response()
    }

    /// Put the message named by `<id>` into the context, or answer 404.
    fn load(&self, cx: &mut Context) -> ControlFlow<Response> {
        let message = cx
            .param("id")
            .and_then(|id| id.parse::<u64>().ok())
            .and_then(|id| self.get(id));
        match message {
            Some(message) => {
                cx.insert(message);
                ControlFlow::Continue(())
            }
            None => ControlFlow::Break((StatusCode::NOT_FOUND, "Message not found").into_response()),
        }
    }

    fn no_store(&self, _head: &RequestHead, mut response: Response) -> Response {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response
    }
}

fn title(cx: &Context) -> Option<&str> {
    cx.form().get("title").map(str::trim).filter(|t| !t.is_empty())
}

impl Controller for MessagesController {
    fn actions(actions: &mut Actions<Self>) {
        actions
            .add("index", Self::index)
            .add("new", Self::new_form)
            .add("create", Self::create)
            .add("show", Self::show)
            .add("edit", Self::edit)
            .add("update", Self::update)
            .add("delete", Self::delete);
    }

    fn callbacks(callbacks: &mut Callbacks<Self>) {
        callbacks.before("load", Self::load).after("no_store", Self::no_store);
    }

    fn hooks(hooks: &mut HookTable) {
        hooks
            .declare("before_request", HookSpec::callback("load", "show edit update delete"))
            .declare("after_request", ["no_store"]);
    }
}
