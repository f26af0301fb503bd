//! SQL execution of relation scopes and delete plans.
//!
//! # Responsibility
//! - Render `Scope` values into nested `uuid IN (...)` subqueries.
//! - Run a `DeletePlan` atomically: all restrict checks, then all deletions.
//!
//! # Invariants
//! - Every rendered query binds the root uuid as `?1` and nothing else.
//! - A failed restrict check returns before the first `DELETE` runs.
//! - The whole delete runs in one `IMMEDIATE` transaction; any error rolls back.

use crate::model::relation::{plan_delete, Scope, Table};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use uuid::Uuid;

/// Rows removed from one table by a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeletedRows {
    pub table: Table,
    pub count: usize,
}

/// Outcome of a successful delete, leaves first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub root: Table,
    pub uuid: Uuid,
    pub rows: Vec<DeletedRows>,
}

impl DeleteReport {
    /// Rows removed from `table`, summed over every plan step touching it.
    pub fn count(&self, table: Table) -> usize {
        self.rows
            .iter()
            .filter(|rows| rows.table == table)
            .map(|rows| rows.count)
            .sum()
    }

    pub fn total(&self) -> usize {
        self.rows.iter().map(|rows| rows.count).sum()
    }
}

/// Renders `SELECT uuid ...` for the rows addressed by `scope`.
pub(crate) fn scope_sql(scope: &Scope) -> String {
    let mut sql = format!("SELECT uuid FROM {} WHERE uuid = ?1", scope.root.as_str());
    for hop in &scope.path {
        sql = format!(
            "SELECT uuid FROM {} WHERE {} IN ({sql})",
            hop.table.as_str(),
            hop.foreign_key
        );
    }
    sql
}

pub(crate) fn row_exists(conn: &Connection, table: Table, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE uuid = ?1);", table.as_str()),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn ensure_row_exists(conn: &Connection, table: Table, id: Uuid) -> RepoResult<()> {
    if row_exists(conn, table, id)? {
        Ok(())
    } else {
        Err(RepoError::NotFound { table, id })
    }
}

/// Plans and executes the delete of one `root` row.
pub(crate) fn delete_row(conn: &Connection, root: Table, id: Uuid) -> RepoResult<DeleteReport> {
    let plan = plan_delete(root);
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    ensure_row_exists(&tx, root, id)?;

    for check in &plan.checks {
        let count: i64 = tx.query_row(
            &format!("SELECT COUNT(*) FROM ({});", scope_sql(&check.scope)),
            [id.to_string()],
            |row| row.get(0),
        )?;
        if count > 0 {
            warn!(
                "event=delete module=repo status=restricted table={root} uuid={id} relation={} count={count}",
                check.relation
            );
            return Err(RepoError::RestrictedDeletion {
                table: root,
                id,
                relation: check.relation,
                count: count as u64,
            });
        }
    }

    let mut rows = Vec::with_capacity(plan.deletions.len());
    for scope in &plan.deletions {
        let table = scope.table();
        let count = tx.execute(
            &format!(
                "DELETE FROM {} WHERE uuid IN ({});",
                table.as_str(),
                scope_sql(scope)
            ),
            [id.to_string()],
        )?;
        rows.push(DeletedRows { table, count });
    }
    tx.commit()?;

    let report = DeleteReport {
        root,
        uuid: id,
        rows,
    };
    info!(
        "event=delete module=repo status=ok table={root} uuid={id} rows_removed={}",
        report.total()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::scope_sql;
    use crate::model::relation::{resolve, Scope, Table};

    #[test]
    fn root_scope_selects_single_row() {
        assert_eq!(
            scope_sql(&Scope::root(Table::Entities)),
            "SELECT uuid FROM entities WHERE uuid = ?1"
        );
    }

    #[test]
    fn through_scope_nests_one_subquery_per_hop() {
        let scope = resolve(Table::Entities, "grandchildren").unwrap();
        assert_eq!(
            scope_sql(&scope),
            "SELECT uuid FROM grandchildren WHERE child_uuid IN (\
             SELECT uuid FROM children WHERE entity_uuid IN (\
             SELECT uuid FROM entities WHERE uuid = ?1))"
        );
    }
}
