// Form body for adding a new Todo
#[derive(Debug, serde::Deserialize)]
pub struct AddTodoSchema {
    pub todos: Option<String>,
    pub csrf_token: Option<String>,
}

// Form body for editing the task text of a Todo
#[derive(Debug, serde::Deserialize)]
pub struct EditTodoSchema {
    pub todos: Option<String>,
    pub csrf_token: Option<String>,
}
