
// Data model representing a Todo item
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Todo {
    pub(crate) id: i64,
    pub(crate) task: String,
    pub(crate) done: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}
