use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_sessions::extractors::{ReadableSession, WritableSession};

use crate::{
    csrf,
    db::RequestDb,
    error::AppError,
    model::Todo,
    repository::TodoRepository,
    schema::{AddTodoSchema, EditTodoSchema},
    AppState,
};

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    todos: Vec<Todo>,
    csrf_token: String,
}

#[derive(Template)]
#[template(path = "edit.html")]
struct EditTemplate {
    todo: Todo,
    csrf_token: String,
}

fn to_list() -> Redirect {
    Redirect::to("/")
}

// Handler for the list view
pub async fn list_todos(
    State(state): State<Arc<AppState>>,
    mut session: WritableSession,
    mut db: RequestDb,
) -> Result<Html<String>, AppError> {
    let todos = TodoRepository::new(db.conn().await?, state.clock.as_ref())
        .list_all()
        .await?;
    let csrf_token = csrf::get_or_create_token(&mut session)?;

    Ok(Html(IndexTemplate { todos, csrf_token }.render()?))
}

// Handler for adding a new Todo
pub async fn add_todo(
    State(state): State<Arc<AppState>>,
    session: ReadableSession,
    mut db: RequestDb,
    Form(body): Form<AddTodoSchema>,
) -> Result<Redirect, AppError> {
    if !csrf::validate(&session, body.csrf_token.as_deref().unwrap_or_default()) {
        tracing::warn!("add rejected: csrf token mismatch");
        return Ok(to_list());
    }

    if let Some(task) = body.todos {
        let id = TodoRepository::new(db.conn().await?, state.clock.as_ref())
            .create(&task)
            .await?;
        tracing::info!(id, "todo added");
    }

    Ok(to_list())
}

// Handler for the edit form of a Todo
pub async fn edit_todo_form(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    mut session: WritableSession,
    mut db: RequestDb,
) -> Result<Response, AppError> {
    let todo = TodoRepository::new(db.conn().await?, state.clock.as_ref())
        .get(id)
        .await?;
    let Some(todo) = todo else {
        tracing::debug!(id, "edit requested for unknown todo");
        return Ok(to_list().into_response());
    };
    let csrf_token = csrf::get_or_create_token(&mut session)?;

    Ok(Html(EditTemplate { todo, csrf_token }.render()?).into_response())
}

// Handler for saving the edited task text of a Todo
pub async fn edit_todo(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    session: ReadableSession,
    mut db: RequestDb,
    Form(body): Form<EditTodoSchema>,
) -> Result<Redirect, AppError> {
    let mut todos = TodoRepository::new(db.conn().await?, state.clock.as_ref());

    if todos.get(id).await?.is_none() {
        tracing::debug!(id, "edit submitted for unknown todo");
        return Ok(to_list());
    }

    if !csrf::validate(&session, body.csrf_token.as_deref().unwrap_or_default()) {
        tracing::warn!(id, "edit rejected: csrf token mismatch");
        return Ok(to_list());
    }

    if let Some(task) = body.todos {
        todos.update(id, &task).await?;
        tracing::info!(id, "todo updated");
    }

    Ok(to_list())
}

// Handler for flipping the done flag of a Todo
pub async fn toggle_todo(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    mut db: RequestDb,
) -> Result<Redirect, AppError> {
    let toggled = TodoRepository::new(db.conn().await?, state.clock.as_ref())
        .toggle(id)
        .await?;
    if !toggled {
        tracing::debug!(id, "toggle requested for unknown todo");
    }

    Ok(to_list())
}

// Handler for deleting a Todo
pub async fn delete_todo(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    mut db: RequestDb,
) -> Result<Redirect, AppError> {
    let deleted = TodoRepository::new(db.conn().await?, state.clock.as_ref())
        .delete(id)
        .await?;
    if deleted {
        tracing::info!(id, "todo deleted");
    } else {
        tracing::debug!(id, "delete requested for unknown todo");
    }

    Ok(to_list())
}
