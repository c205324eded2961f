use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{handler::*, AppState};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_todos))
        .route("/add", post(add_todo))
        .route("/edit/:id", get(edit_todo_form).post(edit_todo))
        .route("/check/:id", get(toggle_todo))
        .route("/delete/:id", get(delete_todo))
        .layer(app_state.sessions.layer())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
