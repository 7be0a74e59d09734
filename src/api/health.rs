use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::api::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database_up = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .is_ok();

    Json(json!({
        "status": if database_up { "ok" } else { "degraded" },
        "database": database_up,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
