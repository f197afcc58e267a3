use actix_web::{delete, get, post, routes, web, HttpResponse};
use log::info;

use crate::db::Session;
use crate::error::ApiResult;
use crate::models::{
    CreateTodo, NewTodo, PageParams, Priority, Todo, TodoChanges, TodoListQuery, TodoSearchQuery,
    UpdateTodo, Validate,
};
use crate::state::AppState;
use crate::store::{self, todos, TodoFilter};

pub const DELETED_COUNT_HEADER: &str = "x-deleted-count";

#[post("/todos")]
async fn create_todo(mut session: Session, body: web::Json<CreateTodo>) -> ApiResult<HttpResponse> {
    let input = body.into_inner();
    input.validate()?;
    let todo = todos::create(session.conn(), NewTodo::try_from(input)?).await?;
    Ok(HttpResponse::Created().json(todo))
}

#[get("/todos")]
async fn list_todos(
    state: web::Data<AppState>,
    mut session: Session,
    page: web::Query<PageParams>,
    query: web::Query<TodoListQuery>,
) -> ApiResult<HttpResponse> {
    let page = state.page(page.into_inner())?;
    let mut filters = Vec::new();
    if let Some(completed) = query.completed {
        filters.push(TodoFilter::Completed(completed));
    }
    if let Some(priority) = query.priority {
        filters.push(TodoFilter::Priority(Priority::try_from(priority)?));
    }
    let todos = store::list::<Todo>(session.conn(), &filters, page).await?;
    Ok(HttpResponse::Ok().json(todos))
}

#[get("/todos/stats")]
async fn todo_stats(mut session: Session) -> ApiResult<HttpResponse> {
    let stats = todos::stats(session.conn()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/todos/search")]
async fn search_todos(
    state: web::Data<AppState>,
    mut session: Session,
    page: web::Query<PageParams>,
    query: web::Query<TodoSearchQuery>,
) -> ApiResult<HttpResponse> {
    let page = state.page(page.into_inner())?;
    let filters = [TodoFilter::TitleContains(query.into_inner().q)];
    let todos = store::list::<Todo>(session.conn(), &filters, page).await?;
    Ok(HttpResponse::Ok().json(todos))
}

#[delete("/todos/completed")]
async fn delete_completed(mut session: Session) -> ApiResult<HttpResponse> {
    let deleted = todos::delete_completed(session.conn()).await?;
    Ok(HttpResponse::NoContent()
        .insert_header((DELETED_COUNT_HEADER, deleted.to_string()))
        .finish())
}

#[get("/todos/priority/{priority}")]
async fn todos_by_priority(
    state: web::Data<AppState>,
    mut session: Session,
    priority: web::Path<i64>,
    page: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let priority = Priority::try_from(priority.into_inner())?;
    let page = state.page(page.into_inner())?;
    let todos = store::list::<Todo>(session.conn(), &[TodoFilter::Priority(priority)], page).await?;
    Ok(HttpResponse::Ok().json(todos))
}

#[get("/todos/{id}")]
async fn get_todo(mut session: Session, id: web::Path<i64>) -> ApiResult<HttpResponse> {
    let todo = store::get::<Todo>(session.conn(), id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(todo))
}

#[routes]
#[put("/todos/{id}")]
#[patch("/todos/{id}")]
async fn update_todo(
    mut session: Session,
    id: web::Path<i64>,
    body: web::Json<UpdateTodo>,
) -> ApiResult<HttpResponse> {
    let patch = body.into_inner();
    patch.validate()?;
    let changes = TodoChanges::try_from(patch)?;
    let todo = todos::update(session.conn(), id.into_inner(), changes).await?;
    Ok(HttpResponse::Ok().json(todo))
}

#[delete("/todos/{id}")]
async fn delete_todo(mut session: Session, id: web::Path<i64>) -> ApiResult<HttpResponse> {
    let id = id.into_inner();
    store::delete::<Todo>(session.conn(), id).await?;
    info!("deleted todo {}", id);
    Ok(HttpResponse::NoContent().finish())
}

#[post("/todos/{id}/toggle")]
async fn toggle_todo(mut session: Session, id: web::Path<i64>) -> ApiResult<HttpResponse> {
    let todo = todos::toggle(session.conn(), id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(todo))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_todo)
        .service(list_todos)
        .service(todo_stats)
        .service(search_todos)
        .service(delete_completed)
        .service(todos_by_priority)
        .service(get_todo)
        .service(update_todo)
        .service(delete_todo)
        .service(toggle_todo);
}
