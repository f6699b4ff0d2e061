//! Landing page plus the application-wide hooks of the demo.

use std::ops::ControlFlow;
use std::sync::Arc;

use axum::{
    http::HeaderValue,
    response::{Html, Response},
};

use crate::controller::{Actions, Callbacks, Context, Controller, RequestHead};
use crate::hooks::HookTable;

#[derive(Debug, Default)]
pub struct HomeController;

impl HomeController {
    async fn index(self: Arc<Self>, _cx: Context) -> Html<&'static str> {
        Html("<h1>mvc-router</h1><p><a href=\"/messages\">Messages</a></p>")
    }

    fn warm_up(&self, cx: &mut Context) -> ControlFlow<Response> {
        tracing::info!(endpoint = %cx.endpoint(), "First request received");
        ControlFlow::Continue(())
    }

    fn powered_by(&self, _head: &RequestHead, mut response: Response) -> Response {
        response
            .headers_mut()
            .insert("x-powered-by", HeaderValue::from_static("mvc-router"));
        response
    }
}

impl Controller for HomeController {
    fn actions(actions: &mut Actions<Self>) {
        actions.add("index", Self::index);
    }

    fn callbacks(callbacks: &mut Callbacks<Self>) {
        callbacks
            .before("warm_up", Self::warm_up)
            .after("powered_by", Self::powered_by);
    }

    fn hooks(hooks: &mut HookTable) {
        hooks
            .declare("before_app_first_request", ["warm_up"])
            .declare("after_app_request", ["powered_by"]);
    }
}
