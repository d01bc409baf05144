//! Entry 与 ResultSet：查询结果中的可修改记录。

use crate::compiler::{Assignments, Filter};
use crate::conditions::ConditionTree;
use crate::row::{Cell, DecodedRow};
use crate::table::{Table, TableError};
use crate::value::SqlValue;
use std::collections::BTreeMap;

/// 一条记录。所属表的单元格是它自己的列，联表得到的其他表通过 `joined` 访问。
#[derive(Debug, Clone)]
pub struct Entry {
    table: Table,
    own: BTreeMap<String, Cell>,
    joined: BTreeMap<String, BTreeMap<String, Cell>>,
    changes: Vec<(String, SqlValue)>,
}

impl Entry {
    /// 尚未写入数据库的新记录。
    pub fn new(table: Table) -> Self {
        Self {
            table,
            own: BTreeMap::new(),
            joined: BTreeMap::new(),
            changes: Vec::new(),
        }
    }

    pub fn from_row(table: Table, row: DecodedRow) -> Self {
        let mut tables = row.into_tables();
        let own = tables.remove(table.name()).unwrap_or_default();
        Self {
            table,
            own,
            joined: tables,
            changes: Vec::new(),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// 按列名查找，找不到再按查询别名查找；未写入的修改优先。
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        let column = self.resolve(name);
        if let Some((_, v)) = self.changes.iter().find(|(c, _)| c == column) {
            return Some(v);
        }
        self.own.get(column).map(|c| &c.value)
    }

    /// 记录一次修改；别名会被换算成真实列名。
    pub fn set(&mut self, name: &str, value: impl Into<SqlValue>) -> &mut Self {
        let column = self.resolve(name).to_string();
        let value = value.into();
        match self.changes.iter_mut().find(|(c, _)| *c == column) {
            Some((_, v)) => *v = value,
            None => self.changes.push((column, value)),
        }
        self
    }

    pub fn changes(&self) -> &[(String, SqlValue)] {
        &self.changes
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn columns(&self) -> &BTreeMap<String, Cell> {
        &self.own
    }

    pub fn joined(&self, table: &str) -> Option<&BTreeMap<String, Cell>> {
        self.joined.get(table)
    }

    /// 写入新记录并保存生成的主键。
    pub fn insert(&mut self) -> Result<SqlValue, TableError> {
        let data = self.pending()?;
        let id = self.table.insert(&data)?;
        self.commit();
        let pk = self.table.primary_column()?;
        if !self.own.contains_key(&pk) {
            self.own.insert(
                pk.clone(),
                Cell {
                    value: id.clone(),
                    alias: pk,
                },
            );
        }
        Ok(id)
    }

    /// 按主键写回修改。
    pub fn update(&mut self) -> Result<(), TableError> {
        let data = self.pending()?;
        let filter = self.primary_filter()?;
        self.table.update(&data, &filter)?;
        self.commit();
        Ok(())
    }

    /// 按主键删除。
    pub fn delete(&self) -> Result<(), TableError> {
        let filter = self.primary_filter()?;
        self.table.delete(&filter)
    }

    fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        if self.own.contains_key(name) {
            return name;
        }
        self.own
            .iter()
            .find(|(_, cell)| cell.alias == name)
            .map(|(column, _)| column.as_str())
            .unwrap_or(name)
    }

    fn pending(&self) -> Result<Assignments, TableError> {
        if self.changes.is_empty() {
            return Err(TableError::EmptyChangeSet);
        }
        Ok(self
            .changes
            .iter()
            .map(|(c, v)| (c.as_str(), v.clone()))
            .collect())
    }

    fn primary_filter(&self) -> Result<Filter, TableError> {
        let pk = self.table.primary_column()?;
        let value = self
            .own
            .get(&pk)
            .map(|c| c.value.clone())
            .ok_or_else(|| TableError::MissingPrimaryKey(self.table.name().to_string()))?;
        Ok(Filter::Where(ConditionTree::new().and(pk, value)))
    }

    fn commit(&mut self) {
        for (column, value) in self.changes.drain(..) {
            match self.own.get_mut(&column) {
                Some(cell) => cell.value = value,
                None => {
                    self.own.insert(
                        column.clone(),
                        Cell {
                            value,
                            alias: column,
                        },
                    );
                }
            }
        }
    }
}

/// 查询结果集，带一个只向前的游标。
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    entries: Vec<Entry>,
    cursor: usize,
}

impl ResultSet {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries, cursor: 0 }
    }

    /// 取下一条；到末尾返回 `None`。
    pub fn fetch(&mut self) -> Option<&mut Entry> {
        let entry = self.entries.get_mut(self.cursor)?;
        self.cursor += 1;
        Some(entry)
    }

    pub fn fetch_all(&self) -> &[Entry] {
        &self.entries
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 对每一条记录应用同一组修改并写回。
    pub fn update(&mut self, changes: &[(&str, SqlValue)]) -> Result<(), TableError> {
        for entry in &mut self.entries {
            for (name, value) in changes {
                entry.set(name, value.clone());
            }
            entry.update()?;
        }
        Ok(())
    }

    pub fn delete(&self) -> Result<(), TableError> {
        for entry in &self.entries {
            entry.delete()?;
        }
        Ok(())
    }
}

impl IntoIterator for ResultSet {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
