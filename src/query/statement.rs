use crate::{
    conditions::Conditions,
    dialect::Dialect,
    ident,
    query::{CONDITION_PLACEHOLDER_PREFIX, PreparedQuery, placeholder_list},
    result::{AccessError, Result},
};

/// Rows targeted by an UPDATE or DELETE.
///
/// A whole-table mutation has to be asked for with [`Scope::AllRows`]; an
/// empty condition map is refused rather than silently widened.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    AllRows,
    Matching(&'a Conditions),
}

impl<'a> Scope<'a> {
    fn conditions(&self, operation: &'static str, table: &str) -> Result<Option<&'a Conditions>> {
        match *self {
            Scope::AllRows => Ok(None),
            Scope::Matching(conditions) if conditions.is_empty() => {
                Err(AccessError::UnscopedMutation {
                    operation,
                    table: table.to_string(),
                })
            }
            Scope::Matching(conditions) => {
                conditions.validate()?;
                Ok(Some(conditions))
            }
        }
    }
}

/// `INSERT [IGNORE] INTO table(k1,k2) VALUES (:k1,:k2)`
pub fn build_insert(
    dialect: Dialect,
    table: &str,
    values: &Conditions,
    ignore: bool,
) -> Result<PreparedQuery> {
    ident::validate_table(table)?;
    if values.is_empty() {
        return Err(AccessError::EmptyColumnList {
            operation: "INSERT",
            table: table.to_string(),
        });
    }
    values.validate()?;

    let columns = values.columns().collect::<Vec<_>>().join(",");
    let placeholders = values
        .columns()
        .map(|column| format!(":{column}"))
        .collect::<Vec<_>>()
        .join(",");
    let sql = format!(
        "{} {table}({columns}) VALUES ({placeholders})",
        dialect.insert_prefix(ignore)
    );
    let params = values
        .iter()
        .map(|(column, value)| (column.to_string(), value.clone()))
        .collect();
    Ok(PreparedQuery::new(sql, params))
}

/// `UPDATE table SET k1=:k1, k2=:k2 [WHERE c1=:Dc1 AND c2=:Dc2]`
pub fn build_update(table: &str, set: &Conditions, scope: Scope<'_>) -> Result<PreparedQuery> {
    ident::validate_table(table)?;
    if set.is_empty() {
        return Err(AccessError::EmptyColumnList {
            operation: "UPDATE",
            table: table.to_string(),
        });
    }
    set.validate()?;
    let conditions = scope.conditions("UPDATE", table)?;

    let mut sql = format!(
        "UPDATE {table} SET {}",
        placeholder_list(set.columns(), "=", "", ", ")
    );
    let mut params: Vec<_> = set
        .iter()
        .map(|(column, value)| (column.to_string(), value.clone()))
        .collect();

    if let Some(conditions) = conditions {
        sql.push_str(" WHERE ");
        sql.push_str(&placeholder_list(
            conditions.columns(),
            "=",
            CONDITION_PLACEHOLDER_PREFIX,
            " AND ",
        ));
        for (column, value) in conditions.iter() {
            let placeholder = format!("{CONDITION_PLACEHOLDER_PREFIX}{column}");
            // A SET column literally named e.g. `Did` would share `:Did` with condition `id`
            if set.get(&placeholder).is_some() {
                return Err(AccessError::PlaceholderCollision(placeholder));
            }
            params.push((placeholder, value.clone()));
        }
    }

    Ok(PreparedQuery::new(sql, params))
}

/// `DELETE FROM table [WHERE c1=:c1 AND c2=:c2]`
pub fn build_delete(table: &str, scope: Scope<'_>) -> Result<PreparedQuery> {
    ident::validate_table(table)?;
    let conditions = scope.conditions("DELETE", table)?;

    let mut sql = format!("DELETE FROM {table}");
    let mut params = Vec::new();
    if let Some(conditions) = conditions {
        sql.push_str(" WHERE ");
        sql.push_str(&placeholder_list(conditions.columns(), "=", "", " AND "));
        params.extend(
            conditions
                .iter()
                .map(|(column, value)| (column.to_string(), value.clone())),
        );
    }
    Ok(PreparedQuery::new(sql, params))
}
