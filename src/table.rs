//! Table：通过连接执行编译结果的表级入口。

use crate::columns::ColumnSelector;
use crate::compiler::{Assignments, Compiled, Compiler, Filter};
use crate::conditions::ConditionTree;
use crate::connection::{ColumnInfo, ConnectionError, Row, SharedConnection};
use crate::entry::{Entry, ResultSet};
use crate::error::CompileError;
use crate::options::OptionsSpec;
use crate::row::{DecodeError, decode_rows};
use crate::tables::{TableEntry, TableSelector};
use crate::value::SqlValue;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// 对象层错误。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("table `{0}` has no primary key")]
    MissingPrimaryKey(String),
    #[error("entry has no pending changes")]
    EmptyChangeSet,
}

struct TableInner {
    conn: SharedConnection,
    name: String,
    compiler: Compiler,
    primary: RefCell<Option<String>>,
}

/// 表句柄；clone 只增加引用计数。
#[derive(Clone)]
pub struct Table {
    inner: Rc<TableInner>,
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.inner.name)
            .field("config", self.inner.compiler.config())
            .finish()
    }
}

impl Table {
    pub fn new(conn: SharedConnection, name: impl Into<String>) -> Self {
        Self::with_compiler(conn, name, Compiler::new())
    }

    pub fn with_compiler(conn: SharedConnection, name: impl Into<String>, compiler: Compiler) -> Self {
        Self {
            inner: Rc::new(TableInner {
                conn,
                name: name.into(),
                compiler,
                primary: RefCell::new(None),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn compiler(&self) -> &Compiler {
        &self.inner.compiler
    }

    pub fn columns(&self) -> Result<Vec<ColumnInfo>, TableError> {
        describe(&self.inner.conn, &self.inner.name)
    }

    /// 第一个被标记为主键的列，结果会被缓存。
    pub fn primary_column(&self) -> Result<String, TableError> {
        if let Some(pk) = self.inner.primary.borrow().as_ref() {
            return Ok(pk.clone());
        }
        let pk = self
            .columns()?
            .into_iter()
            .find(|c| c.primary)
            .map(|c| c.name)
            .ok_or_else(|| TableError::MissingPrimaryKey(self.inner.name.clone()))?;
        *self.inner.primary.borrow_mut() = Some(pk.clone());
        Ok(pk)
    }

    /// 查询本表。空列选择器会展开为本表的全部列，保证每一列都带复合别名。
    pub fn select(
        &self,
        columns: ColumnSelector,
        conditions: &ConditionTree,
        options: &OptionsSpec,
    ) -> Result<ResultSet, TableError> {
        let tables = TableSelector::single(self.inner.name.as_str());
        self.select_from(&tables, columns, conditions, options)
    }

    /// 联表查询；本表的列成为每个 `Entry` 自身的列。
    ///
    /// 没有表名前缀的列归属主表（`tables` 的第一项），否则行映射时找不到它们的归属。
    pub fn select_from(
        &self,
        tables: &TableSelector,
        columns: ColumnSelector,
        conditions: &ConditionTree,
        options: &OptionsSpec,
    ) -> Result<ResultSet, TableError> {
        let columns = if columns.is_empty() {
            self.expand_columns(tables)?
        } else {
            qualify_columns(&columns, tables.primary_table().unwrap_or(&self.inner.name))
        };
        let compiled = self
            .inner
            .compiler
            .select(tables, &columns, conditions, options, true)?;
        let rows = self.run(&compiled)?;
        let entries = decode_rows(&rows)?
            .into_iter()
            .map(|row| Entry::from_row(self.clone(), row))
            .collect();
        Ok(ResultSet::new(entries))
    }

    /// 插入一行，返回生成的主键。
    pub fn insert(&self, data: &Assignments) -> Result<SqlValue, TableError> {
        let compiled = self.inner.compiler.insert(&self.inner.name, data, true)?;
        self.run(&compiled)?;
        Ok(self.inner.conn.borrow().last_insert_id()?)
    }

    pub fn update(&self, data: &Assignments, filter: &Filter) -> Result<(), TableError> {
        let compiled = self
            .inner
            .compiler
            .update(&self.inner.name, data, filter, true)?;
        self.run(&compiled)?;
        Ok(())
    }

    pub fn delete(&self, filter: &Filter) -> Result<(), TableError> {
        let compiled = self.inner.compiler.delete(&self.inner.name, filter, true)?;
        self.run(&compiled)?;
        Ok(())
    }

    fn expand_columns(&self, tables: &TableSelector) -> Result<ColumnSelector, TableError> {
        let mut names: Vec<&str> = Vec::new();
        match tables {
            TableSelector::Single(t) => names.push(t),
            TableSelector::List(entries) => {
                for entry in entries {
                    names.push(entry.table());
                    if let TableEntry::Joined { joins, .. } = entry {
                        names.extend(joins.iter().map(|j| j.target.as_str()));
                    }
                }
            }
        }

        let mut sel = ColumnSelector::new();
        for table in names {
            for col in describe(&self.inner.conn, table)? {
                sel.push(format!("{table}.{}", col.name), None::<String>);
            }
        }
        if sel.is_empty() {
            return Err(CompileError::InvalidArgument(format!(
                "no columns described for `{}`",
                self.inner.name
            ))
            .into());
        }
        Ok(sel)
    }

    fn run(&self, compiled: &Compiled) -> Result<Vec<Row>, TableError> {
        tracing::debug!(
            table = %self.inner.name,
            sql = %compiled.sql,
            bindings = compiled.bindings.len(),
            "executing statement"
        );
        let rows = self
            .inner
            .conn
            .borrow_mut()
            .execute(&compiled.sql, &compiled.bindings)?;
        Ok(rows)
    }
}

fn qualify_columns(columns: &ColumnSelector, table: &str) -> ColumnSelector {
    let mut sel = ColumnSelector::new();
    for (selector, label) in columns.iter() {
        if selector.contains('.') {
            sel.push(selector, label);
        } else {
            sel.push(format!("{table}.{selector}"), label);
        }
    }
    sel
}

fn describe(conn: &SharedConnection, table: &str) -> Result<Vec<ColumnInfo>, TableError> {
    Ok(conn.borrow_mut().describe(table)?)
}
