//! Explicit binding for hand-written SQL (joins, subqueries) that the table
//! builders cannot express.

use crate::{
    cursor::{CursorKind, FetchMode},
    query::PreparedQuery,
    result::{AccessError, Result},
    str_utils,
    value::Value,
};
use std::str::FromStr;

/// How a manually bound value is coerced before binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    Int,
    Str,
    Bool,
    Null,
}

impl FromStr for TypeHint {
    type Err = AccessError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "int" | "integer" => Ok(TypeHint::Int),
            "str" | "string" => Ok(TypeHint::Str),
            "bool" | "boolean" => Ok(TypeHint::Bool),
            "null" => Ok(TypeHint::Null),
            _ => Err(AccessError::new_parameter_type_mismatch(
                "int, str, bool or null",
                s,
            )),
        }
    }
}

impl std::fmt::Display for TypeHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TypeHint::Int => "int",
            TypeHint::Str => "str",
            TypeHint::Bool => "bool",
            TypeHint::Null => "null",
        };
        write!(f, "{s}")
    }
}

fn coercion_error(hint: TypeHint, value: &Value) -> AccessError {
    AccessError::new_parameter_type_mismatch(
        hint.to_string(),
        format!("{} ({value})", value.type_name()),
    )
}

impl TypeHint {
    /// Coerce `value` to the representation this hint asks for.
    /// NULL stays NULL under every hint.
    pub fn coerce(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self {
            TypeHint::Null => Ok(Value::Null),
            TypeHint::Int => match value {
                Value::Int(_) => Ok(value),
                Value::Bool(b) => Ok(Value::Int(b as i64)),
                Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(Value::Int(f as i64)),
                Value::Text(ref s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| coercion_error(*self, &value)),
                _ => Err(coercion_error(*self, &value)),
            },
            TypeHint::Str => match value {
                Value::Text(_) => Ok(value),
                Value::Bool(b) => Ok(Value::Text(if b { "1" } else { "0" }.to_string())),
                Value::Int(i) => Ok(Value::Text(i.to_string())),
                Value::Float(f) => Ok(Value::Text(f.to_string())),
                Value::Blob(bytes) => String::from_utf8(bytes)
                    .map(Value::Text)
                    .map_err(|e| coercion_error(*self, &Value::Blob(e.into_bytes()))),
                Value::Null => Ok(Value::Null),
            },
            TypeHint::Bool => match value {
                Value::Bool(_) => Ok(value),
                Value::Int(i) => Ok(Value::Bool(i != 0)),
                Value::Text(ref s) => match s.trim().to_lowercase().as_str() {
                    "true" | "1" => Ok(Value::Bool(true)),
                    "false" | "0" => Ok(Value::Bool(false)),
                    _ => Err(coercion_error(*self, &value)),
                },
                _ => Err(coercion_error(*self, &value)),
            },
        }
    }
}

/// A hand-written statement with explicitly named bindings.
///
/// ```
/// use tableaccess::{ManualQuery, TypeHint};
///
/// let query = ManualQuery::new(
///     "SELECT c.name FROM categories c JOIN items i ON i.category_id = c.id WHERE i.price > :min",
/// )
/// .bind_as("min", "100", TypeHint::Int);
/// let prepared = query.to_prepared().unwrap();
/// assert_eq!(prepared.params[0].1, tableaccess::Value::Int(100));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ManualQuery {
    sql: String,
    bindings: Vec<(String, Value, Option<TypeHint>)>,
    cursor: CursorKind,
    fetch_mode: Option<FetchMode>,
}

impl ManualQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        ManualQuery {
            sql: sql.into(),
            bindings: Vec::new(),
            cursor: CursorKind::ForwardOnly,
            fetch_mode: None,
        }
    }

    /// Build from parallel name / value / hint lists.
    ///
    /// Names may be given with or without the leading `:`. The lists must
    /// have the same length.
    pub fn from_parts<S: AsRef<str>>(
        sql: impl Into<String>,
        names: &[S],
        values: Vec<Value>,
        hints: Option<&[TypeHint]>,
    ) -> Result<Self> {
        if names.len() != values.len() {
            return Err(AccessError::ParameterCountMismatch {
                names: names.len(),
                values: values.len(),
            });
        }
        if let Some(hints) = hints {
            if hints.len() != names.len() {
                return Err(AccessError::ParameterCountMismatch {
                    names: names.len(),
                    values: hints.len(),
                });
            }
        }

        let mut query = ManualQuery::new(sql);
        for (idx, (name, value)) in names.iter().zip(values).enumerate() {
            let hint = hints.map(|hints| hints[idx]);
            query.push(name.as_ref(), value, hint);
        }
        Ok(query)
    }

    fn push(&mut self, name: &str, value: Value, hint: Option<TypeHint>) {
        let name = name.trim_start_matches(':').to_string();
        self.bindings.push((name, value, hint));
    }

    /// Bind a value as-is
    pub fn bind(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.push(name, value.into(), None);
        self
    }

    /// Bind a value coerced through `hint`
    pub fn bind_as(mut self, name: &str, value: impl Into<Value>, hint: TypeHint) -> Self {
        self.push(name, value.into(), Some(hint));
        self
    }

    pub fn scrollable(mut self) -> Self {
        self.cursor = CursorKind::Scrollable;
        self
    }

    pub fn fetch_mode(mut self, fetch_mode: FetchMode) -> Self {
        self.fetch_mode = Some(fetch_mode);
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Coerce every binding, check that each name appears in the SQL and that
    /// every placeholder in the SQL is bound
    pub fn to_prepared(&self) -> Result<PreparedQuery> {
        let placeholders = str_utils::extract_placeholders(&self.sql);
        let mut params = Vec::with_capacity(self.bindings.len());

        for (name, value, hint) in &self.bindings {
            if !placeholders.contains(name) {
                return Err(AccessError::UnknownParameter(name.clone()));
            }
            let value = match hint {
                Some(hint) => hint.coerce(value.clone())?,
                None => value.clone(),
            };
            params.push((name.clone(), value));
        }

        // An unbound placeholder would silently bind NULL
        if let Some(missing) = placeholders
            .iter()
            .find(|placeholder| !params.iter().any(|(name, _)| name == *placeholder))
        {
            return Err(AccessError::ParameterNotProvided(missing.clone()));
        }

        let mut prepared = PreparedQuery::new(self.sql.clone(), params).with_cursor(self.cursor);
        prepared.fetch_mode = self.fetch_mode;
        Ok(prepared)
    }
}
