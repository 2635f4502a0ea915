//! Request-level entry points
//!
//! These bind a request's parameters, run the executor and compute page
//! metadata in one call. The `*_api_response` variants go one step further and
//! fold errors into the response envelope. The `*_query_layer` variants hand
//! the validated filter to a caller-owned query function instead of the
//! built-in executor.

use std::future::Future;

use crate::dialect::Dialect;
use crate::error::{PagerError, Result};
use crate::executor::paginated_query;
use crate::filter::{BindQuery, Filterable, IncludableQueryBuilder};
use crate::pagination::{PaginationRequest, PaginationResponse, parse_includes};
use crate::params::QueryParams;
use crate::response::PaginatedResponse;
use crate::sql::query::Query;
use crate::sql::search::build_search_clause;
use crate::store::{Row, Store};

/// Paginate a prebuilt filter with paging and includes taken from `params`
pub async fn paginate<S, F>(
    store: &S,
    params: &QueryParams,
    filter: &F,
) -> Result<(Vec<Row>, PaginationResponse)>
where
    S: Store,
    F: Filterable + ?Sized,
{
    let pagination = PaginationRequest::from_params(params);
    let includes = params.get("includes").map(parse_includes).unwrap_or_default();

    let (rows, total) = paginated_query(store, filter, &pagination, &includes).await?;
    Ok((rows, PaginationResponse::calculate(&pagination, total)))
}

/// Bind a custom filter from `params`, then validate its includes
pub fn bind_and_validate_filter<F>(params: &QueryParams, filter: &mut F) -> Result<()>
where
    F: IncludableQueryBuilder + BindQuery,
{
    filter.bind_query(params)?;
    filter.validate();
    Ok(())
}

/// Bind, validate and paginate a custom filter
pub async fn paginate_with_custom_filter<S, F>(
    store: &S,
    params: &QueryParams,
    filter: &mut F,
) -> Result<(Vec<Row>, PaginationResponse)>
where
    S: Store,
    F: IncludableQueryBuilder + BindQuery,
{
    bind_and_validate_filter(params, filter)?;

    let pagination = filter.pagination();
    let includes = filter.includes();
    let (rows, total) = paginated_query(store, &*filter, &pagination, &includes).await?;
    Ok((rows, PaginationResponse::calculate(&pagination, total)))
}

/// [`paginate`] folded into a response envelope
pub async fn paginated_api_response<S, F>(
    store: &S,
    params: &QueryParams,
    filter: &F,
    message: &str,
) -> PaginatedResponse<Vec<Row>>
where
    S: Store,
    F: Filterable + ?Sized,
{
    into_response(paginate(store, params, filter).await, message)
}

/// [`paginate_with_custom_filter`] folded into a response envelope
pub async fn paginated_api_response_with_custom_filter<S, F>(
    store: &S,
    params: &QueryParams,
    filter: &mut F,
    message: &str,
) -> PaginatedResponse<Vec<Row>>
where
    S: Store,
    F: IncludableQueryBuilder + BindQuery,
{
    into_response(paginate_with_custom_filter(store, params, filter).await, message)
}

/// Validate a filter's includes, then run a caller-owned query function on it
///
/// The query function returns the page of items and the total match count;
/// its errors are passed through unchanged.
pub async fn paginated_query_with_query_layer<'a, F, T, Q, Fut>(
    filter: &'a mut F,
    query: Q,
) -> Result<(Vec<T>, i64)>
where
    F: IncludableQueryBuilder,
    Q: FnOnce(&'a F) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, i64)>> + 'a,
{
    filter.validate();
    let filter: &'a F = filter;
    query(filter).await
}

/// Bind `params` into a custom filter, run a query function and build the envelope
///
/// A binding failure is a 400 and the query function is not called. Any error
/// returned by the query function is a 500.
pub async fn paginated_api_response_with_query_layer<'a, F, T, Q, Fut>(
    params: &QueryParams,
    filter: &'a mut F,
    message: &str,
    query: Q,
) -> PaginatedResponse<Vec<T>>
where
    F: IncludableQueryBuilder + BindQuery,
    Q: FnOnce(&'a F) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, i64)>> + 'a,
{
    if let Err(e) = filter.bind_query(params) {
        tracing::debug!(error = %e, "rejecting request parameters");
        return PaginatedResponse::error(400, format!("Invalid query parameters: {}", e));
    }

    let pagination = filter.pagination();
    match paginated_query_with_query_layer(filter, query).await {
        Ok((items, total)) => PaginatedResponse::success(
            message,
            items,
            PaginationResponse::calculate(&pagination, total),
        ),
        Err(e) => PaginatedResponse::error(500, format!("Internal Server Error: {}", e)),
    }
}

fn into_response(
    result: Result<(Vec<Row>, PaginationResponse)>,
    message: &str,
) -> PaginatedResponse<Vec<Row>> {
    match result {
        Ok((rows, pagination)) => PaginatedResponse::success(message, rows, pagination),
        Err(e) => error_response(&e),
    }
}

fn error_response(e: &PagerError) -> PaginatedResponse<Vec<Row>> {
    if e.is_client_error() {
        tracing::debug!(error = %e, "rejecting request parameters");
        PaginatedResponse::error(400, format!("Invalid query parameters: {}", e))
    } else {
        PaginatedResponse::error(500, format!("Internal Server Error: {}", e))
    }
}

/// Reusable search function for custom filters
///
/// Applies the same predicate as the executor's built-in search, for filters
/// that search a different set of columns than their
/// [`search_fields`](Filterable::search_fields).
///
/// ```
/// use query_pager::{Dialect, Query, create_searchable_filter};
///
/// let search = create_searchable_filter(["athletes.name", "provinces.name"], Dialect::PostgreSQL);
/// let query = search(Query::new("athletes", Dialect::PostgreSQL), "bali");
/// assert_eq!(query.predicates()[0].sql(), "(athletes.name ILIKE ? OR provinces.name ILIKE ?)");
/// ```
pub fn create_searchable_filter<I, S>(
    fields: I,
    dialect: Dialect,
) -> impl Fn(Query, &str) -> Query + Clone + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
    move |query: Query, term: &str| match build_search_clause(&fields, term, dialect) {
        Some(predicate) => query.where_predicate(predicate),
        None => query,
    }
}
