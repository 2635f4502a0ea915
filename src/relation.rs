//! Relation preloading
//!
//! A filter registers the relations it knows how to load. After a page of rows
//! is fetched, every validated include is resolved against those relations and
//! loaded with one `IN (...)` query per relation per nesting level, split into
//! batches of [`PRELOAD_BATCH_SIZE`] keys to stay under driver bind limits.
//! Loaded rows are attached to their parent row under the relation's field name.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::sql::query::Query;
use crate::store::{Row, Store};

/// Most keys bound into a single preload `IN (...)` list
pub const PRELOAD_BATCH_SIZE: usize = 1000;

/// Cardinality of a relation, seen from the parent row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Parent holds the key (`athletes.province_id -> provinces.id`)
    BelongsTo,
    /// Target holds the key, at most one match
    HasOne,
    /// Target holds the key, any number of matches
    HasMany,
}

/// A loadable association between a parent table and a target table
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    name: String,
    field: String,
    kind: RelationKind,
    table: String,
    local_key: String,
    foreign_key: String,
    constraints: Vec<(String, Value)>,
    children: RelationSet,
}

impl Relation {
    fn new(
        kind: RelationKind,
        name: impl Into<String>,
        table: impl Into<String>,
        local_key: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            field: to_snake_case(&name),
            name,
            kind,
            table: table.into(),
            local_key: local_key.into(),
            foreign_key: foreign_key.into(),
            constraints: Vec::new(),
            children: RelationSet::new(),
        }
    }

    /// The parent row holds `local_key`, matched against `id` on `table`
    pub fn belongs_to(
        name: impl Into<String>,
        table: impl Into<String>,
        local_key: impl Into<String>,
    ) -> Self {
        Self::new(RelationKind::BelongsTo, name, table, local_key, "id")
    }

    /// `table` holds `foreign_key`, matched against the parent's `id`
    pub fn has_one(
        name: impl Into<String>,
        table: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self::new(RelationKind::HasOne, name, table, "id", foreign_key)
    }

    /// `table` holds `foreign_key`, matched against the parent's `id`
    pub fn has_many(
        name: impl Into<String>,
        table: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self::new(RelationKind::HasMany, name, table, "id", foreign_key)
    }

    /// Match on a parent column other than `id`
    pub fn local_key(mut self, column: impl Into<String>) -> Self {
        self.local_key = column.into();
        self
    }

    /// Match on a target column other than the default
    pub fn references(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = column.into();
        self
    }

    /// Attach loaded rows under `field` instead of the snake_case name
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Only load target rows where `column` equals `value`
    ///
    /// Used for polymorphic associations, e.g. `player_type = 'athlete'`.
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constraints.push((column.into(), value.into()));
        self
    }

    /// Register a nested relation, reachable through a dotted include
    pub fn with(mut self, child: Relation) -> Self {
        self.children.insert(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn children(&self) -> &RelationSet {
        &self.children
    }

    fn target_query(&self, dialect: Dialect, keys: Vec<Value>) -> Query {
        let placeholders = vec!["?"; keys.len()].join(", ");
        let mut query = Query::new(self.table.as_str(), dialect)
            .where_clause(format!("{} IN ({})", self.foreign_key, placeholders), keys);
        for (column, value) in &self.constraints {
            query = query.where_clause(format!("{} = ?", column), [value.clone()]);
        }
        query
    }
}

/// Relations registered on a filter, looked up by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationSet {
    relations: Vec<Relation>,
}

impl RelationSet {
    pub const fn new() -> Self {
        Self {
            relations: Vec::new(),
        }
    }

    /// Shared empty set for filters without relations
    pub fn empty() -> &'static RelationSet {
        static EMPTY: RelationSet = RelationSet::new();
        &EMPTY
    }

    /// Register a relation, replacing one with the same name
    pub fn insert(&mut self, relation: Relation) {
        match self.relations.iter_mut().find(|r| r.name == relation.name) {
            Some(existing) => *existing = relation,
            None => self.relations.push(relation),
        }
    }

    pub fn with(mut self, relation: Relation) -> Self {
        self.insert(relation);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }
}

/// Dotted include paths folded into a tree, first-seen order kept
#[derive(Debug, Default)]
struct IncludeTree {
    children: Vec<(String, IncludeTree)>,
}

impl IncludeTree {
    fn build(includes: &[String]) -> Self {
        let mut root = IncludeTree::default();
        for include in includes {
            let mut node = &mut root;
            for segment in include.split('.') {
                node = node.child(segment);
            }
        }
        root
    }

    fn child(&mut self, name: &str) -> &mut IncludeTree {
        let index = match self.children.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.children.push((name.to_string(), IncludeTree::default()));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }
}

/// Load `includes` for `rows` through the registered `relations`
///
/// Includes must already be validated. An include naming a relation that is
/// not registered is skipped with a warning; any store failure is returned.
pub async fn preload<S: Store>(
    store: &S,
    dialect: Dialect,
    rows: &mut [Row],
    relations: &RelationSet,
    includes: &[String],
) -> Result<()> {
    if rows.is_empty() || includes.is_empty() {
        return Ok(());
    }

    let tree = IncludeTree::build(includes);
    load_level(store, dialect, rows, relations, &tree).await
}

fn load_level<'a, S: Store>(
    store: &'a S,
    dialect: Dialect,
    rows: &'a mut [Row],
    relations: &'a RelationSet,
    tree: &'a IncludeTree,
) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
    Box::pin(async move {
        for (name, subtree) in &tree.children {
            let Some(relation) = relations.get(name) else {
                tracing::warn!(include = %name, "no relation registered for include, skipping");
                continue;
            };

            let keys = distinct_keys(rows, &relation.local_key);
            let mut targets = Vec::new();
            for batch in keys.chunks(PRELOAD_BATCH_SIZE) {
                let (sql, params) = relation.target_query(dialect, batch.to_vec()).select_sql();
                tracing::debug!(relation = %relation.name, sql = %sql, params = params.len(), "preloading relation");
                targets.extend(store.fetch_all(&sql, &params).await?);
            }

            if !subtree.children.is_empty() && !targets.is_empty() {
                load_level(store, dialect, &mut targets, &relation.children, subtree).await?;
            }

            attach(rows, relation, targets);
        }
        Ok(())
    })
}

/// Non-null values of `column` across `rows`, deduplicated in first-seen order
fn distinct_keys(rows: &[Row], column: &str) -> Vec<Value> {
    let mut seen = std::collections::HashSet::new();
    rows.iter()
        .filter_map(|row| row.get(column))
        .filter(|value| !value.is_null())
        .filter(|value| seen.insert(key_of(value)))
        .cloned()
        .collect()
}

/// Grouping key that treats `7` and `"7"` alike
fn key_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn attach(rows: &mut [Row], relation: &Relation, targets: Vec<Row>) {
    let mut grouped: HashMap<String, Vec<Row>> = HashMap::new();
    for target in targets {
        if let Some(key) = target.get(&relation.foreign_key).filter(|v| !v.is_null()) {
            grouped.entry(key_of(key)).or_default().push(target);
        }
    }

    for row in rows.iter_mut() {
        let matches = row
            .get(&relation.local_key)
            .filter(|v| !v.is_null())
            .and_then(|key| grouped.get(&key_of(key)));

        let value = match relation.kind {
            RelationKind::HasMany => Value::Array(
                matches
                    .map(|m| m.iter().cloned().map(Value::Object).collect())
                    .unwrap_or_default(),
            ),
            RelationKind::BelongsTo | RelationKind::HasOne => matches
                .and_then(|m| m.first())
                .cloned()
                .map(Value::Object)
                .unwrap_or(Value::Null),
        };

        row.insert(relation.field.clone(), value);
    }
}

/// `PlayerEvents` -> `player_events`
fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}
