//! Request handlers.

use axum::extract::{Path, Query, State};
use axum::response::{Html, Response};
use serde::Serialize;
use tracing::{debug, error, info};

use super::forms::{EditForm, FindForm, FormOrJson, IndexQuery, InsertForm};
use super::response::{redirect_home, redirect_home_with, AppError};
use super::AppState;
use crate::error::Result;
use crate::model::{parse_ton_co2eq, RecordId, SortOrder};
use crate::views::{ChartView, DetailPage, FactorPage, Notice, View};

type HandlerResult<T> = std::result::Result<T, AppError>;

fn render<S: Serialize>(state: &AppState, view: View, ctx: &S) -> HandlerResult<Html<String>> {
    Ok(Html(state.renderer.render(view, ctx)?))
}

/// `GET /`: every record, the chart and the average.
pub(crate) async fn index_handler(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> HandlerResult<Html<String>> {
    let records = state.repo.list_all().await?;
    let average = state.repo.average_ton_co2eq().await?;
    let notice = query.error.as_deref().and_then(Notice::from_code);

    let page = FactorPage::new(records, average)?.with_notice(notice);
    render(&state, View::Index, &page)
}

/// `POST /`: look a record up by model name.
pub(crate) async fn find_handler(
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<FindForm>,
) -> HandlerResult<Html<String>> {
    let found = state.repo.find_by_model(&form.model).await?;
    debug!(model = %form.model, found = found.is_some(), "Model lookup");

    render(&state, View::Detail, &DetailPage::new(found, None)?)
}

/// `POST /insert`
pub(crate) async fn insert_handler(
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<InsertForm>,
) -> HandlerResult<Response> {
    let ton_co2eq = parse_ton_co2eq(&form.co2)?;
    let id = state.repo.insert(&form.name, ton_co2eq).await?;
    info!(%id, model = %form.name, "Inserted emission factor");

    Ok(redirect_home())
}

/// `GET /detail/:model`
pub(crate) async fn detail_handler(
    State(state): State<AppState>,
    Path(model): Path<String>,
) -> HandlerResult<Html<String>> {
    let found = state.repo.find_by_model(&model).await?;
    let average = state.repo.average_ton_co2eq().await?;

    render(&state, View::Detail, &DetailPage::new(found, average)?)
}

/// `POST /delete/:id`
pub(crate) async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<Response> {
    let id: RecordId = id.parse()?;
    if state.repo.delete_by_id(id).await? {
        info!(%id, "Deleted emission factor");
    } else {
        debug!(%id, "Delete matched no record");
    }

    Ok(redirect_home())
}

/// `POST /edit`
///
/// Always answers with a redirect. A failed edit is logged and the index
/// page shows a notice instead of the user getting an error page.
pub(crate) async fn edit_handler(
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<EditForm>,
) -> Response {
    match apply_edit(&state, &form).await {
        Ok(true) => {
            info!(id = %form.id, model = %form.model, "Updated emission factor");
            redirect_home()
        }
        Ok(false) => {
            debug!(id = %form.id, "Edit matched no record");
            redirect_home()
        }
        Err(err) => {
            error!(id = %form.id, error = %err, "Edit failed");
            redirect_home_with(Notice::EditFailed)
        }
    }
}

async fn apply_edit(state: &AppState, form: &EditForm) -> Result<bool> {
    let id: RecordId = form.id.parse()?;
    let ton_co2eq = parse_ton_co2eq(&form.co2)?;
    state.repo.update_by_id(id, &form.model, ton_co2eq).await
}

/// `GET /year`
pub(crate) async fn year_handler(State(state): State<AppState>) -> HandlerResult<Html<String>> {
    let records = state.repo.list_yearly().await?;
    render(&state, View::Year, &ChartView::new(records)?)
}

/// `GET /sort`
pub(crate) async fn sort_handler(State(state): State<AppState>) -> HandlerResult<Html<String>> {
    sorted_page(&state, SortOrder::Ascending, View::Sort).await
}

/// `GET /reverseSort`
pub(crate) async fn reverse_sort_handler(
    State(state): State<AppState>,
) -> HandlerResult<Html<String>> {
    sorted_page(&state, SortOrder::Descending, View::ReverseSort).await
}

async fn sorted_page(
    state: &AppState,
    order: SortOrder,
    view: View,
) -> HandlerResult<Html<String>> {
    let records = state.repo.sorted(order).await?;
    let average = state.repo.average_ton_co2eq().await?;

    render(state, view, &FactorPage::new(records, average)?)
}
