use actix_web::{delete, get, post, routes, web, HttpResponse};
use log::info;

use crate::db::Session;
use crate::error::ApiResult;
use crate::models::{
    CreateItem, Item, ItemListQuery, ItemSearchQuery, PageParams, UpdateItem, Validate,
};
use crate::state::AppState;
use crate::store::{self, items, ItemFilter};

#[post("/items")]
async fn create_item(mut session: Session, body: web::Json<CreateItem>) -> ApiResult<HttpResponse> {
    let input = body.into_inner();
    input.validate()?;
    let item = items::create(session.conn(), input).await?;
    Ok(HttpResponse::Created().json(item))
}

#[get("/items")]
async fn list_items(
    state: web::Data<AppState>,
    mut session: Session,
    page: web::Query<PageParams>,
    query: web::Query<ItemListQuery>,
) -> ApiResult<HttpResponse> {
    let page = state.page(page.into_inner())?;
    let mut filters = Vec::new();
    if query.available_only {
        filters.push(ItemFilter::Available(true));
    }
    let items = store::list::<Item>(session.conn(), &filters, page).await?;
    Ok(HttpResponse::Ok().json(items))
}

#[get("/items/search")]
async fn search_items(
    state: web::Data<AppState>,
    mut session: Session,
    page: web::Query<PageParams>,
    query: web::Query<ItemSearchQuery>,
) -> ApiResult<HttpResponse> {
    let page = state.page(page.into_inner())?;
    let ItemSearchQuery {
        q,
        min_price,
        max_price,
    } = query.into_inner();

    let mut filters = Vec::new();
    if let Some(q) = q.filter(|q| !q.is_empty()) {
        filters.push(ItemFilter::NameContains(q));
    }
    if let Some(min) = min_price {
        filters.push(ItemFilter::MinPrice(min));
    }
    if let Some(max) = max_price {
        filters.push(ItemFilter::MaxPrice(max));
    }

    let items = store::list::<Item>(session.conn(), &filters, page).await?;
    Ok(HttpResponse::Ok().json(items))
}

#[get("/items/stats/count")]
async fn item_stats(mut session: Session) -> ApiResult<HttpResponse> {
    let stats = items::stats(session.conn()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/items/{id}")]
async fn get_item(mut session: Session, id: web::Path<i64>) -> ApiResult<HttpResponse> {
    let item = store::get::<Item>(session.conn(), id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

#[routes]
#[put("/items/{id}")]
#[patch("/items/{id}")]
async fn update_item(
    mut session: Session,
    id: web::Path<i64>,
    body: web::Json<UpdateItem>,
) -> ApiResult<HttpResponse> {
    let patch = body.into_inner();
    patch.validate()?;
    let item = items::update(session.conn(), id.into_inner(), patch).await?;
    Ok(HttpResponse::Ok().json(item))
}

#[delete("/items/{id}")]
async fn delete_item(mut session: Session, id: web::Path<i64>) -> ApiResult<HttpResponse> {
    let id = id.into_inner();
    store::delete::<Item>(session.conn(), id).await?;
    info!("deleted item {}", id);
    Ok(HttpResponse::NoContent().finish())
}

/// Fixed paths first: `/items/{id}` would otherwise claim `search` and `stats`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_item)
        .service(list_items)
        .service(search_items)
        .service(item_stats)
        .service(get_item)
        .service(update_item)
        .service(delete_item);
}
