//! Render statements to SQL strings.

use std::cell::Cell;
use std::fmt::{self, Write};

use crate::stmt::*;
use crate::{Ident, RenderedSql};

/// Rendering context that hands out placeholder indices in order.
pub struct RenderContext {
    next_param_idx: Cell<usize>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self {
            next_param_idx: Cell::new(1),
        }
    }

    /// Allocate the next `$n` placeholder.
    fn next_param(&self) -> usize {
        let idx = self.next_param_idx.get();
        self.next_param_idx.set(idx + 1);
        idx
    }

    fn param_count(&self) -> usize {
        self.next_param_idx.get() - 1
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for types that can be rendered to SQL.
pub trait Render {
    fn render(&self, ctx: &RenderContext, f: &mut dyn Write) -> fmt::Result;
}

/// Render a statement, numbering placeholders from `$1`.
pub fn render(stmt: &impl Render) -> RenderedSql {
    let ctx = RenderContext::new();
    let mut sql = String::new();
    stmt.render(&ctx, &mut sql)
        .expect("writing to a String cannot fail");
    RenderedSql {
        sql,
        param_count: ctx.param_count(),
    }
}

fn column_list(f: &mut dyn Write, columns: &[String]) -> fmt::Result {
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", Ident(col))?;
    }
    Ok(())
}

fn where_clause(ctx: &RenderContext, f: &mut dyn Write, conds: &[Condition]) -> fmt::Result {
    for (i, cond) in conds.iter().enumerate() {
        f.write_str(if i == 0 { " WHERE " } else { " AND " })?;
        write!(
            f,
            "{} {} ${}",
            Ident(&cond.column),
            cond.op.as_str(),
            ctx.next_param()
        )?;
    }
    Ok(())
}

impl Render for SelectStmt {
    fn render(&self, ctx: &RenderContext, f: &mut dyn Write) -> fmt::Result {
        if self.exists {
            f.write_str("SELECT EXISTS(SELECT 1")?;
        } else {
            f.write_str("SELECT ")?;
            if self.columns.is_empty() {
                f.write_str("*")?;
            } else {
                column_list(f, &self.columns)?;
            }
        }
        write!(f, " FROM {}", Ident(&self.table))?;
        where_clause(ctx, f, &self.where_)?;
        if !self.exists {
            if let Some(order_by) = &self.order_by {
                write!(f, " ORDER BY {}", Ident(order_by))?;
            }
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        if self.exists {
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl Render for InsertStmt {
    fn render(&self, ctx: &RenderContext, f: &mut dyn Write) -> fmt::Result {
        write!(f, "INSERT INTO {} (", Ident(&self.table))?;
        column_list(f, &self.columns)?;
        f.write_str(") VALUES (")?;
        for i in 0..self.columns.len() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "${}", ctx.next_param())?;
        }
        f.write_str(")")?;
        if !self.returning.is_empty() {
            f.write_str(" RETURNING ")?;
            column_list(f, &self.returning)?;
        }
        Ok(())
    }
}

impl Render for UpdateStmt {
    fn render(&self, ctx: &RenderContext, f: &mut dyn Write) -> fmt::Result {
        write!(f, "UPDATE {} SET ", Ident(&self.table))?;
        for (i, col) in self.set.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} = ${}", Ident(col), ctx.next_param())?;
        }
        where_clause(ctx, f, &self.where_)
    }
}

impl Render for DeleteStmt {
    fn render(&self, ctx: &RenderContext, f: &mut dyn Write) -> fmt::Result {
        write!(f, "DELETE FROM {}", Ident(&self.table))?;
        where_clause(ctx, f, &self.where_)
    }
}
