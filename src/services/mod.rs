pub mod todo;
pub mod todo_status;
