//! SQL statements.

/// Comparison used in a WHERE condition. The right-hand side is always a
/// placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
        }
    }
}

/// `column <op> $n`, joined with AND when there are several.
#[derive(Debug, Clone)]
pub struct Condition {
    pub column: String,
    pub op: CompareOp,
}

impl Condition {
    pub fn eq(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: CompareOp::Eq,
        }
    }

    pub fn not_eq(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: CompareOp::NotEq,
        }
    }
}

/// A SELECT statement over a single table.
#[derive(Debug, Clone, Default)]
pub struct SelectStmt {
    pub table: String,
    pub columns: Vec<String>,
    pub where_: Vec<Condition>,
    pub order_by: Option<String>,
    pub limit: Option<u32>,
    /// Wrap the query in `SELECT EXISTS(...)`.
    pub exists: bool,
}

impl SelectStmt {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn where_(mut self, cond: Condition) -> Self {
        self.where_.push(cond);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn exists(mut self) -> Self {
        self.exists = true;
        self
    }
}

/// An INSERT statement.
#[derive(Debug, Clone, Default)]
pub struct InsertStmt {
    pub table: String,
    pub columns: Vec<String>,
    pub returning: Vec<String>,
}

impl InsertStmt {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn returning<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returning.extend(columns.into_iter().map(Into::into));
        self
    }
}

/// An UPDATE statement. SET placeholders come first, WHERE placeholders
/// follow them.
#[derive(Debug, Clone, Default)]
pub struct UpdateStmt {
    pub table: String,
    pub set: Vec<String>,
    pub where_: Vec<Condition>,
}

impl UpdateStmt {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn set<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn where_(mut self, cond: Condition) -> Self {
        self.where_.push(cond);
        self
    }
}

/// A DELETE statement.
#[derive(Debug, Clone, Default)]
pub struct DeleteStmt {
    pub table: String,
    pub where_: Vec<Condition>,
}

impl DeleteStmt {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn where_(mut self, cond: Condition) -> Self {
        self.where_.push(cond);
        self
    }
}
