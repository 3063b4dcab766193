use crate::{
    conditions::Conditions,
    cursor::{CursorKind, FetchMode},
    ident,
    query::{PreparedQuery, placeholder_list},
    result::Result,
    value::Value,
};

/// Column list of a SELECT
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Fields {
    /// `*`
    #[default]
    All,
    /// Validated column references, joined with `,`
    Columns(Vec<String>),
    /// Trusted text spliced in as-is, e.g. `parent_id, COUNT(*) AS n`
    Raw(String),
}

impl Fields {
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Fields::Columns(columns.into_iter().map(Into::into).collect())
    }

    fn render(&self) -> Result<String> {
        match self {
            Fields::All => Ok("*".to_string()),
            Fields::Columns(columns) if columns.is_empty() => Ok("*".to_string()),
            Fields::Columns(columns) => {
                for column in columns {
                    ident::validate_column_ref(column)?;
                }
                Ok(columns.join(","))
            }
            Fields::Raw(text) => Ok(text.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn keyword(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Limit {
    Count { count: u64, offset: Option<u64> },
    /// Trusted fragment appended verbatim, e.g. `LIMIT 0,10`
    Raw(String),
}

impl Limit {
    fn render(&self) -> String {
        match self {
            Limit::Count {
                count,
                offset: None,
            } => format!("LIMIT {count}"),
            Limit::Count {
                count,
                offset: Some(offset),
            } => format!("LIMIT {count} OFFSET {offset}"),
            Limit::Raw(text) => text.trim().to_string(),
        }
    }
}

/// Description of a single-table SELECT.
///
/// ```
/// use tableaccess::{Conditions, Fields, Order, SelectQuery};
///
/// let query = SelectQuery::from_table("categories")
///     .fields(Fields::columns(["id", "name"]))
///     .filter(Conditions::new().eq("parent_id", 1).eq("active", true))
///     .order_by("name", Order::Asc)
///     .limit(10);
/// let prepared = query.build_parameterized().unwrap();
/// assert_eq!(
///     prepared.sql,
///     "SELECT id,name FROM categories WHERE parent_id = :parent_id AND active = :active ORDER BY name ASC LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: String,
    fields: Fields,
    conditions: Conditions,
    group_by: Vec<String>,
    order_by: Vec<(String, Order)>,
    limit: Option<Limit>,
    cursor: CursorKind,
    fetch_mode: Option<FetchMode>,
}

impl SelectQuery {
    pub fn from_table(table: impl Into<String>) -> Self {
        SelectQuery {
            table: table.into(),
            fields: Fields::All,
            conditions: Conditions::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            cursor: CursorKind::ForwardOnly,
            fetch_mode: None,
        }
    }

    pub fn fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    /// Replace the WHERE conditions
    pub fn filter(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// Add one equality condition
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.set(column, value);
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order_by.push((column.into(), order));
        self
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(Limit::Count {
            count,
            offset: None,
        });
        self
    }

    pub fn limit_offset(mut self, count: u64, offset: u64) -> Self {
        self.limit = Some(Limit::Count {
            count,
            offset: Some(offset),
        });
        self
    }

    /// Append a caller-written limit fragment such as `LIMIT 5,10`.
    /// The text is not checked; pass trusted input only.
    pub fn limit_raw(mut self, fragment: impl Into<String>) -> Self {
        self.limit = Some(Limit::Raw(fragment.into()));
        self
    }

    /// Ask for a scrollable cursor instead of a forward-only one
    pub fn scrollable(mut self) -> Self {
        self.cursor = CursorKind::Scrollable;
        self
    }

    pub fn fetch_mode(mut self, fetch_mode: FetchMode) -> Self {
        self.fetch_mode = Some(fetch_mode);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// Build the SELECT with one `:column` placeholder per condition
    pub fn build_parameterized(&self) -> Result<PreparedQuery> {
        self.conditions.validate()?;
        let where_clause = placeholder_list(self.conditions.columns(), " = ", "", " AND ");
        let sql = self.render(&where_clause)?;
        let params = self
            .conditions
            .iter()
            .map(|(column, value)| (column.to_string(), value.clone()))
            .collect();

        let mut prepared = PreparedQuery::new(sql, params).with_cursor(self.cursor);
        prepared.fetch_mode = self.fetch_mode;
        Ok(prepared)
    }

    /// Build the SELECT with condition values inlined as SQL literals.
    ///
    /// String values are quoted with `'` doubling, but the result must only be
    /// used with trusted input (diagnostics, logging). Executed queries always
    /// go through [`SelectQuery::build_parameterized`].
    pub fn build_literal(&self) -> Result<String> {
        self.conditions.validate()?;
        let where_clause = self
            .conditions
            .iter()
            .map(|(column, value)| format!("{column} = {}", value.to_sql_literal()))
            .collect::<Vec<_>>()
            .join(" AND ");
        self.render(&where_clause)
    }

    fn render(&self, where_clause: &str) -> Result<String> {
        ident::validate_table(&self.table)?;
        let mut sql = format!("SELECT {} FROM {}", self.fields.render()?, self.table);

        if !where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(where_clause);
        }

        if !self.group_by.is_empty() {
            for column in &self.group_by {
                ident::validate_column_ref(column)?;
            }
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.order_by.is_empty() {
            let mut keys = Vec::with_capacity(self.order_by.len());
            for (column, order) in &self.order_by {
                ident::validate_column_ref(column)?;
                keys.push(format!("{column} {}", order.keyword()));
            }
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }

        if let Some(limit) = &self.limit {
            let limit = limit.render();
            if !limit.is_empty() {
                sql.push(' ');
                sql.push_str(&limit);
            }
        }

        Ok(sql)
    }
}
