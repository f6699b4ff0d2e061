use std::sync::Arc;

use axum::Json;
use serde_json::{json, Value};

use crate::controller::{Actions, Context, Controller};

#[derive(Debug, Default)]
pub struct HealthController;

impl HealthController {
    async fn check(self: Arc<Self>, _cx: Context) -> Json<Value> {
        Json(json!({ "status": "ok" }))
    }
}

impl Controller for HealthController {
    fn actions(actions: &mut Actions<Self>) {
        actions.add("check", Self::check);
    }
}
