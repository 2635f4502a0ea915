//! Paginated query execution
//!
//! Runs a filter strategy against a [`Store`]: filters and search are applied
//! to a fresh [`Query`], the filtered rows are counted, then the sorted page is
//! fetched and includes are preloaded onto it. Count and fetch are separate
//! round trips and do not share a snapshot.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::filter::{Filterable, IncludableQueryBuilder};
use crate::pagination::PaginationRequest;
use crate::relation::preload;
use crate::sql::query::Query;
use crate::sql::sanitize::{is_valid_include, is_valid_sort_field};
use crate::sql::search::apply_search;
use crate::store::{Row, Store};

/// Resolve the ORDER BY expression for a request
///
/// A valid sort field becomes `"<field> <order>"`; anything else falls back to
/// the filter's default sort, used verbatim.
pub fn resolve_sort(pagination: &PaginationRequest, default_sort: &str) -> String {
    if !pagination.sort.is_empty() && is_valid_sort_field(&pagination.sort) {
        format!("{} {}", pagination.sort, pagination.order)
    } else {
        if !pagination.sort.is_empty() {
            tracing::debug!(sort = %pagination.sort, "ignoring invalid sort field");
        }
        default_sort.to_string()
    }
}

/// Build the filtered, searched query without ordering or paging
pub fn filtered_query<F: Filterable + ?Sized>(filter: &F, pagination: &PaginationRequest) -> Query {
    let query = filter.apply_filters(Query::new(filter.table_name(), filter.dialect()));
    apply_search(query, &filter.search_fields(), &pagination.search)
}

/// Fetch one page of rows and the total number of matching rows
///
/// `includes` are gated by the include-name validator only; relations that the
/// filter does not register are skipped. Any store failure aborts the whole
/// operation and no rows are returned.
pub async fn paginated_query<S, F>(
    store: &S,
    filter: &F,
    pagination: &PaginationRequest,
    includes: &[String],
) -> Result<(Vec<Row>, i64)>
where
    S: Store,
    F: Filterable + ?Sized,
{
    let mut pagination = pagination.clone();
    pagination.validate();

    let query = filtered_query(filter, &pagination);

    let (count_sql, count_params) = query.count_sql();
    tracing::debug!(
        table = %filter.table_name(),
        sql = %count_sql,
        params = count_params.len(),
        "counting rows"
    );
    let total = store.count(&count_sql, &count_params).await?;

    let mut query = query.order_by(resolve_sort(&pagination, filter.default_sort()));
    if !pagination.is_disabled {
        query = query.limit(pagination.limit()).offset(pagination.offset());
    }

    let (select_sql, select_params) = query.select_sql();
    tracing::debug!(
        table = %filter.table_name(),
        sql = %select_sql,
        params = select_params.len(),
        "fetching page"
    );
    let mut rows = store.fetch_all(&select_sql, &select_params).await?;

    let includes: Vec<String> = includes
        .iter()
        .filter(|include| {
            let valid = is_valid_include(include);
            if !valid {
                tracing::debug!(include = %include, "dropping malformed include");
            }
            valid
        })
        .cloned()
        .collect();
    preload(store, filter.dialect(), &mut rows, filter.relations(), &includes).await?;

    Ok((rows, total))
}

/// [`paginated_query`] for a filter that carries its own includes
///
/// The filter is validated first, so only allow-listed includes are loaded.
pub async fn paginated_query_with_includable<S, F>(
    store: &S,
    filter: &mut F,
) -> Result<(Vec<Row>, i64)>
where
    S: Store,
    F: IncludableQueryBuilder,
{
    filter.validate();
    let pagination = filter.pagination();
    let includes = filter.includes();
    paginated_query(store, &*filter, &pagination, &includes).await
}

/// [`paginated_query`] with rows deserialized into `T`
pub async fn paginated_query_as<T, S, F>(
    store: &S,
    filter: &F,
    pagination: &PaginationRequest,
    includes: &[String],
) -> Result<(Vec<T>, i64)>
where
    T: DeserializeOwned,
    S: Store,
    F: Filterable + ?Sized,
{
    let (rows, total) = paginated_query(store, filter, pagination, includes).await?;
    let items = rows
        .into_iter()
        .map(|row| serde_json::from_value(Value::Object(row)))
        .collect::<std::result::Result<Vec<T>, _>>()?;
    Ok((items, total))
}
