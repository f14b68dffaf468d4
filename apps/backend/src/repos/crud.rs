//! Generic CRUD over sea-orm entities keyed by an integer `id` column.
//!
//! Listing goes through [`ResourceParams`]: an optional filter expression,
//! an order column and page coordinates, all taken from the query string.

use lazy_regex::regex_captures;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Condition, SimpleExpr};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ColumnType, ConnectionTrait,
    EntityName, EntityTrait, IdenStatic, IntoActiveModel, Iterable, ModelTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Value,
};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::debug;

use crate::errors::domain::DomainError;
use crate::utils::text::to_snake_case;

pub const DEFAULT_PAGE_SIZE: u64 = 40;
/// Page size used when a caller asks for the whole table.
pub const UNPAGED_PAGE_SIZE: u64 = 5000;

fn default_asc() -> bool {
    true
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_page_number() -> u64 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceParams {
    #[serde(default, rename = "OrderBy", alias = "orderBy", alias = "order_by")]
    pub order_by: Option<String>,
    #[serde(default = "default_asc", rename = "Asc", alias = "asc")]
    pub asc: bool,
    #[serde(default, rename = "FilterQuery", alias = "filterQuery", alias = "filter_query")]
    pub filter_query: Option<String>,
    #[serde(default = "default_page_size", rename = "PageSize", alias = "pageSize", alias = "page_size")]
    pub page_size: u64,
    #[serde(default = "default_page_number", rename = "PageNumber", alias = "pageNumber", alias = "page_number")]
    pub page_number: u64,
}

impl Default for ResourceParams {
    fn default() -> Self {
        Self {
            order_by: None,
            asc: true,
            filter_query: None,
            page_size: DEFAULT_PAGE_SIZE,
            page_number: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_size: u64,
    pub current_page: u64,
    pub total_pages: u64,
}

impl<T> PagedList<T> {
    pub fn new(items: Vec<T>, total_count: u64, page_number: u64, page_size: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_count.div_ceil(page_size)
        };
        Self {
            items,
            total_count,
            page_size,
            current_page: page_number,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedList<U> {
        PagedList {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_size: self.page_size,
            current_page: self.current_page,
            total_pages: self.total_pages,
        }
    }
}

/// Per-role row narrowing applied to every read. The default leaves the
/// query untouched.
pub trait RoleScope<E: EntityTrait>: Send + Sync {
    fn apply(&self, query: Select<E>) -> Select<E> {
        query
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Unscoped;

impl<E: EntityTrait> RoleScope<E> for Unscoped {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
}

impl FilterOp {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "==" | "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            op if op.eq_ignore_ascii_case("contains") => Some(Self::Contains),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

fn unquote(raw: &str) -> &str {
    let raw = raw.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    raw
}

fn parse_clause(raw: &str) -> Result<FilterClause, DomainError> {
    // `Name.Contains("abc")`
    if let Some((_, column, value)) =
        regex_captures!(r#"^\s*([A-Za-z_][A-Za-z0-9_]*)\.(?i:contains)\(\s*(.+?)\s*\)\s*$"#, raw)
    {
        return Ok(FilterClause {
            column: column.to_string(),
            op: FilterOp::Contains,
            value: unquote(value).to_string(),
        });
    }

    let (_, column, op, value) = regex_captures!(
        r#"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(==|!=|>=|<=|=|>|<|(?i:contains)\b)\s*(.+?)\s*$"#,
        raw
    )
    .ok_or_else(|| DomainError::validation(format!("Invalid filter clause '{}'", raw.trim())))?;

    let op = FilterOp::parse(op)
        .ok_or_else(|| DomainError::validation(format!("Unsupported filter operator '{op}'")))?;

    Ok(FilterClause {
        column: column.to_string(),
        op,
        value: unquote(value).to_string(),
    })
}

/// Length of a whitespace-wrapped `and` at the start of `rest`.
fn and_separator_len(rest: &[u8]) -> Option<usize> {
    let lead = rest.iter().take_while(|b| b.is_ascii_whitespace()).count();
    let word = rest.get(lead..lead + 3)?;
    if lead == 0 || !word.eq_ignore_ascii_case(b"and") {
        return None;
    }
    let trail = rest[lead + 3..]
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count();
    (trail > 0).then_some(lead + 3 + trail)
}

/// Split on `and` / `&&`, leaving quoted values intact. A quote only opens
/// at the start of a value, so `O'Brien` stays a plain word.
fn split_clauses(query: &str) -> Vec<&str> {
    let bytes = query.as_bytes();
    let mut parts = Vec::new();
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        let opens_value = i == 0
            || matches!(bytes[i - 1], b'=' | b'<' | b'>' | b'(')
            || bytes[i - 1].is_ascii_whitespace();
        if (b == b'"' || b == b'\'') && opens_value {
            quote = Some(b);
            i += 1;
        } else if bytes[i..].starts_with(b"&&") {
            parts.push(&query[start..i]);
            i += 2;
            start = i;
        } else if let Some(len) = and_separator_len(&bytes[i..]) {
            parts.push(&query[start..i]);
            i += len;
            start = i;
        } else {
            i += 1;
        }
    }
    parts.push(&query[start..]);
    parts
}

/// Parse `column op value` clauses joined by `and` / `&&`.
pub fn parse_filter(query: &str) -> Result<Vec<FilterClause>, DomainError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    split_clauses(query).into_iter().map(parse_clause).collect()
}

/// Column whose name matches `name` in either PascalCase or snake_case.
pub fn find_column<E: EntityTrait>(name: &str) -> Option<E::Column> {
    let wanted = to_snake_case(name.trim());
    E::Column::iter().find(|col| col.as_str().eq_ignore_ascii_case(&wanted))
}

fn id_column<E: EntityTrait>() -> Result<E::Column, DomainError> {
    find_column::<E>("id").ok_or_else(|| {
        DomainError::validation(format!("Entity '{}' has no id column", E::default().table_name()))
    })
}

fn is_textual(col_type: &ColumnType) -> bool {
    matches!(
        col_type,
        ColumnType::String(_) | ColumnType::Text | ColumnType::Char(_)
    )
}

fn typed_value(col_type: &ColumnType, column: &str, raw: &str) -> Result<Value, DomainError> {
    let invalid = || DomainError::validation(format!("Invalid value '{raw}' for '{column}'"));
    let value = match col_type {
        ColumnType::TinyInteger | ColumnType::SmallInteger | ColumnType::Integer => {
            Value::from(raw.parse::<i32>().map_err(|_| invalid())?)
        }
        ColumnType::BigInteger => Value::from(raw.parse::<i64>().map_err(|_| invalid())?),
        ColumnType::Float | ColumnType::Double => {
            Value::from(raw.parse::<f64>().map_err(|_| invalid())?)
        }
        ColumnType::Decimal(_) => {
            Value::from(raw.parse::<Decimal>().map_err(|_| invalid())?)
        }
        ColumnType::Boolean => Value::from(
            raw.to_ascii_lowercase()
                .parse::<bool>()
                .map_err(|_| invalid())?,
        ),
        ColumnType::Date => Value::from(
            Date::parse(raw, format_description!("[year]-[month]-[day]")).map_err(|_| invalid())?,
        ),
        ColumnType::TimestampWithTimeZone => {
            Value::from(OffsetDateTime::parse(raw, &Rfc3339).map_err(|_| invalid())?)
        }
        _ => Value::from(raw.to_string()),
    };
    Ok(value)
}

fn clause_expr<E: EntityTrait>(clause: &FilterClause) -> Result<SimpleExpr, DomainError> {
    let col = find_column::<E>(&clause.column).ok_or_else(|| {
        DomainError::validation(format!("Unknown filter column '{}'", clause.column))
    })?;
    let def = col.def();
    let col_type = def.get_column_type();

    if clause.op == FilterOp::Contains {
        if !is_textual(col_type) {
            return Err(DomainError::validation(format!(
                "'contains' is only supported on text columns, not '{}'",
                clause.column
            )));
        }
        return Ok(col.contains(clause.value.as_str()));
    }

    let value = typed_value(col_type, &clause.column, &clause.value)?;
    Ok(match clause.op {
        FilterOp::Eq => col.eq(value),
        FilterOp::Ne => col.ne(value),
        FilterOp::Gt => col.gt(value),
        FilterOp::Ge => col.gte(value),
        FilterOp::Lt => col.lt(value),
        FilterOp::Le => col.lte(value),
        FilterOp::Contains => col.contains(clause.value.as_str()),
    })
}

/// Build the `WHERE` condition for a filter expression.
pub fn filter_condition<E: EntityTrait>(query: &str) -> Result<Condition, DomainError> {
    parse_filter(query)?
        .iter()
        .try_fold(Condition::all(), |cond, clause| {
            Ok(cond.add(clause_expr::<E>(clause)?))
        })
}

/// Filtered, ordered and scoped `SELECT` without paging.
pub fn list_query<E: EntityTrait>(
    params: &ResourceParams,
    scope: &dyn RoleScope<E>,
) -> Result<Select<E>, DomainError> {
    let mut query = E::find();

    if let Some(filter) = params.filter_query.as_deref() {
        query = query.filter(filter_condition::<E>(filter)?);
    }

    let order_col = params
        .order_by
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .and_then(find_column::<E>)
        .map_or_else(id_column::<E>, Ok)?;
    let order = if params.asc { Order::Asc } else { Order::Desc };
    query = query.order_by(order_col, order);

    Ok(scope.apply(query))
}

/// Page number and size with the size capped at [`UNPAGED_PAGE_SIZE`]. The
/// row offset they imply must fit a postgres `OFFSET`.
pub fn page_bounds(params: &ResourceParams) -> Result<(u64, u64), DomainError> {
    let page_number = params.page_number.max(1);
    let page_size = params.page_size.clamp(1, UNPAGED_PAGE_SIZE);
    (page_number - 1)
        .checked_mul(page_size)
        .filter(|offset| i64::try_from(*offset).is_ok())
        .ok_or_else(|| {
            DomainError::validation(format!("PageNumber {page_number} is out of range"))
        })?;
    Ok((page_number, page_size))
}

pub async fn get_all<E, C>(
    conn: &C,
    params: &ResourceParams,
    ignore_paging: bool,
    scope: &dyn RoleScope<E>,
) -> Result<PagedList<E::Model>, DomainError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let (page_number, page_size) = if ignore_paging {
        (1, UNPAGED_PAGE_SIZE)
    } else {
        page_bounds(params)?
    };

    let paginator = list_query::<E>(params, scope)?.paginate(conn, page_size);
    let total_count = paginator.num_items().await?;
    let items = paginator.fetch_page(page_number - 1).await?;

    debug!(
        table = E::default().table_name(),
        total_count,
        page_number,
        page_size,
        "listed rows"
    );

    Ok(PagedList::new(items, total_count, page_number, page_size))
}

pub async fn get_by_id<E, C>(
    conn: &C,
    id: i32,
    scope: &dyn RoleScope<E>,
) -> Result<Option<E::Model>, DomainError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let query = E::find().filter(id_column::<E>()?.eq(id));
    Ok(scope.apply(query).one(conn).await?)
}

fn id_of<M: ModelTrait>(model: &M, col: <M::Entity as EntityTrait>::Column) -> Option<i32> {
    match model.get(col) {
        Value::Int(Some(id)) => Some(id),
        Value::BigInt(Some(id)) => i32::try_from(id).ok(),
        _ => None,
    }
}

/// Insert and return the generated id, if the row reports one.
pub async fn create<E, C>(conn: &C, model: E::ActiveModel) -> Result<Option<i32>, DomainError>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    C: ConnectionTrait,
{
    let inserted = model.insert(conn).await?;
    Ok(id_of(&inserted, id_column::<E>()?))
}

#[derive(Debug, Clone, Copy)]
pub enum UpdateMode<'a, Col> {
    /// Overwrite every column except the key
    Direct,
    /// Copy only these columns, and only when they differ
    Partial(&'a [Col]),
}

/// Returns `false` when no row has `id`.
pub async fn update<E, C>(
    conn: &C,
    id: i32,
    incoming: E::Model,
    mode: UpdateMode<'_, E::Column>,
) -> Result<bool, DomainError>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    C: ConnectionTrait,
{
    let id_col = id_column::<E>()?;
    let Some(existing) = E::find().filter(id_col.eq(id)).one(conn).await? else {
        return Ok(false);
    };

    let protected = |col: &E::Column| {
        let name = col.as_str();
        name == id_col.as_str() || name == "user_id"
    };

    let mut active = existing.clone().into_active_model();
    let mut changed = 0usize;
    match mode {
        UpdateMode::Direct => {
            for col in E::Column::iter().filter(|c| !protected(c)) {
                active.set(col, incoming.get(col));
                changed += 1;
            }
        }
        UpdateMode::Partial(columns) => {
            for col in columns.iter().copied().filter(|c| !protected(c)) {
                let new_value = incoming.get(col);
                if existing.get(col) != new_value {
                    active.set(col, new_value);
                    changed += 1;
                }
            }
        }
    }

    if changed > 0 {
        active.update(conn).await?;
    }
    debug!(table = E::default().table_name(), id, changed, "updated row");
    Ok(true)
}

pub async fn any<E, C>(conn: &C, column: E::Column, value: impl Into<Value>) -> Result<bool, DomainError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    Ok(E::find().filter(column.eq(value)).count(conn).await? > 0)
}

/// Returns `false` when no row has `id`.
pub async fn delete<E, C>(conn: &C, id: i32) -> Result<bool, DomainError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let res = E::delete_many()
        .filter(id_column::<E>()?.eq(id))
        .exec(conn)
        .await?;
    Ok(res.rows_affected > 0)
}

pub async fn delete_range<E, C>(conn: &C, ids: &[i32]) -> Result<bool, DomainError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(false);
    }
    let res = E::delete_many()
        .filter(id_column::<E>()?.is_in(ids.iter().copied()))
        .exec(conn)
        .await?;
    Ok(res.rows_affected > 0)
}
