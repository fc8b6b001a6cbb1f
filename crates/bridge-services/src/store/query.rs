//! Dynamic `UPDATE` statements.
//!
//! Partial updates must touch only the columns the caller sent. The
//! [`UpdateBuilder`] collects one `SET` assignment per present field and an
//! equality filter on the key. It produces `None` when there is nothing to set,
//! so an empty update never reaches the store.
//!
//! [`UpdateStatement::to_sql`] renders the statement with positional `$n`
//! placeholders for a relational backend. In-process stores apply the
//! assignments directly.

/// One `column = value` pair of a `SET` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: &'static str,
    pub value: String,
}

/// A fully built `UPDATE <table> SET ... WHERE <key_column> = <key_value>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    pub table: &'static str,
    pub assignments: Vec<Assignment>,
    pub key_column: &'static str,
    pub key_value: String,
}

impl UpdateStatement {
    /// Renders the statement and its positional arguments.
    pub fn to_sql(&self) -> (String, Vec<String>) {
        let mut sql = format!("UPDATE {} SET ", self.table);
        let mut args = Vec::with_capacity(self.assignments.len() + 1);
        for (n, assignment) in self.assignments.iter().enumerate() {
            if n > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&format!("{} = ${}", assignment.column, n + 1));
            args.push(assignment.value.clone());
        }
        sql.push_str(&format!(" WHERE {} = ${}", self.key_column, args.len() + 1));
        args.push(self.key_value.clone());
        (sql, args)
    }
}

/// Builder for [`UpdateStatement`].
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: &'static str,
    assignments: Vec<Assignment>,
    filter: Option<(&'static str, String)>,
}

impl UpdateBuilder {
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            filter: None,
        }
    }

    /// Adds `column = value`. A later assignment to the same column replaces
    /// the earlier one.
    pub fn set(mut self, column: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.assignments.iter_mut().find(|a| a.column == column) {
            Some(existing) => existing.value = value,
            None => self.assignments.push(Assignment { column, value }),
        }
        self
    }

    /// Adds `column = value` only when `value` is present.
    pub fn set_if_present(self, column: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.set(column, value),
            None => self,
        }
    }

    /// Restricts the update to rows where `column = value`.
    pub fn filter_eq(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.filter = Some((column, value.into()));
        self
    }

    /// `None` when no column is set or no filter was given.
    pub fn build(self) -> Option<UpdateStatement> {
        if self.assignments.is_empty() {
            return None;
        }
        let (key_column, key_value) = self.filter?;
        Some(UpdateStatement {
            table: self.table,
            assignments: self.assignments,
            key_column,
            key_value,
        })
    }
}
