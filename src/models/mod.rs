//! Request, response and query shapes for both resources.

mod item;
mod pagination;
mod patch;
mod todo;
mod validation;

pub use item::{CreateItem, Item, ItemListQuery, ItemSearchQuery, ItemStats, UpdateItem};
pub use pagination::{Page, PageError, PageParams};
pub use patch::Patch;
pub use todo::{
    CreateTodo, InvalidPriority, NewTodo, Priority, PriorityBreakdown, Todo, TodoChanges,
    TodoListQuery, TodoSearchQuery, TodoStats, UpdateTodo,
};
pub use validation::{FieldError, Validate, ValidationErrors};
