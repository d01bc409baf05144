//! 条件树：`and` / `or` 两个保留分组组成的 WHERE 描述，以及它的 SQL 渲染。
//!
//! 语义：
//! - 只有 `and`：所有条件以 AND 连接；同一列上的多个值重复该列并以 AND 连接。
//! - 有 `or`：每个 or 项是一个分支（列表值展开为多个分支，内嵌 AND 组是单个分支），
//!   若同时有 `and`，and 组会追加到**每一个**分支之后，
//!   即 `(分支1 AND and组) OR (分支2 AND and组) ...`。
//!
//! AND 的优先级高于 OR，因此输出不需要括号。

use crate::binder::Bindings;
use crate::error::CompileError;
use crate::expr::Operand;
use crate::string_builder::{Joiner, StringBuilder};

/// 单列上的条件：一个值，或多个值。
#[derive(Debug, Clone)]
pub enum ColumnCondition {
    Single(Operand),
    List(Vec<Operand>),
}

impl ColumnCondition {
    pub fn operands(&self) -> &[Operand] {
        match self {
            Self::Single(v) => std::slice::from_ref(v),
            Self::List(vs) => vs,
        }
    }
}

impl<T: Into<Operand>> From<T> for ColumnCondition {
    fn from(v: T) -> Self {
        Self::Single(v.into())
    }
}

impl<T: Into<Operand>> From<Vec<T>> for ColumnCondition {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Operand>, const N: usize> From<[T; N]> for ColumnCondition {
    fn from(v: [T; N]) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// 按插入顺序保存的 列 → 条件 集合，成员之间以 AND 连接。
#[derive(Debug, Clone, Default)]
pub struct AndSet {
    entries: Vec<(String, ColumnCondition)>,
}

impl AndSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, cond: impl Into<ColumnCondition>) -> Self {
        self.push(column, cond);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, cond: impl Into<ColumnCondition>) {
        self.entries.push((column.into(), cond.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnCondition)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<ColumnCondition>> FromIterator<(K, V)> for AndSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.push(k, v);
        }
        set
    }
}

/// `or` 分组中的一项。
#[derive(Debug, Clone)]
pub enum OrEntry {
    /// 单列条件；列表值展开为多个 OR 分支。
    Column(String, ColumnCondition),
    /// 内嵌的 AND 组，整体作为一个 OR 分支。
    Group(AndSet),
}

/// WHERE 条件树。
#[derive(Debug, Clone, Default)]
pub struct ConditionTree {
    and: AndSet,
    or: Vec<OrEntry>,
}

impl From<AndSet> for ConditionTree {
    fn from(and: AndSet) -> Self {
        Self::from_and(and)
    }
}

impl ConditionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// 不带保留键的扁平映射：本身就是 and 组。
    pub fn from_and(and: AndSet) -> Self {
        Self {
            and,
            or: Vec::new(),
        }
    }

    pub fn and(mut self, column: impl Into<String>, cond: impl Into<ColumnCondition>) -> Self {
        self.and.push(column, cond);
        self
    }

    pub fn or(mut self, column: impl Into<String>, cond: impl Into<ColumnCondition>) -> Self {
        self.or.push(OrEntry::Column(column.into(), cond.into()));
        self
    }

    pub fn or_group(mut self, group: AndSet) -> Self {
        self.or.push(OrEntry::Group(group));
        self
    }

    pub fn and_set(&self) -> &AndSet {
        &self.and
    }

    pub fn or_entries(&self) -> &[OrEntry] {
        &self.or
    }

    pub fn is_empty(&self) -> bool {
        self.and.is_empty() && self.or.is_empty()
    }

    /// Render：渲染为 WHERE 之后的条件文本（不含 `WHERE` 关键字）。
    ///
    /// 空树返回 `InvalidArgument`；是否省略 WHERE 由调用方决定。
    pub fn render(&self, mut bindings: Option<&mut Bindings>) -> Result<String, CompileError> {
        if self.is_empty() {
            return Err(CompileError::invalid("condition tree is empty"));
        }

        let mut buf = StringBuilder::new();
        if self.or.is_empty() {
            write_and_set(&mut buf, &self.and, &mut bindings)?;
            return Ok(buf.into_string());
        }

        let mut branches = Joiner::new(" OR ");
        for entry in &self.or {
            match entry {
                OrEntry::Column(column, cond) => {
                    check_column(column, cond)?;
                    for operand in cond.operands() {
                        branches.next(&mut buf);
                        write_condition(&mut buf, column, operand, &mut bindings)?;
                        self.append_and(&mut buf, &mut bindings)?;
                    }
                }
                OrEntry::Group(group) => {
                    if group.is_empty() {
                        return Err(CompileError::invalid("empty AND group inside `or`"));
                    }
                    branches.next(&mut buf);
                    write_and_set(&mut buf, group, &mut bindings)?;
                    self.append_and(&mut buf, &mut bindings)?;
                }
            }
        }

        Ok(buf.into_string())
    }

    fn append_and(
        &self,
        buf: &mut StringBuilder,
        bindings: &mut Option<&mut Bindings>,
    ) -> Result<(), CompileError> {
        if self.and.is_empty() {
            return Ok(());
        }
        buf.write_str(" AND ");
        write_and_set(buf, &self.and, bindings)
    }
}

fn check_column(column: &str, cond: &ColumnCondition) -> Result<(), CompileError> {
    if column.is_empty() {
        return Err(CompileError::invalid("condition column name is empty"));
    }
    if cond.operands().is_empty() {
        return Err(CompileError::invalid(format!(
            "empty value list for column `{column}`"
        )));
    }
    Ok(())
}

fn write_and_set(
    buf: &mut StringBuilder,
    set: &AndSet,
    bindings: &mut Option<&mut Bindings>,
) -> Result<(), CompileError> {
    let mut joiner = Joiner::new(" AND ");
    for (column, cond) in set.iter() {
        check_column(column, cond)?;
        for operand in cond.operands() {
            joiner.next(buf);
            write_condition(buf, column, operand, bindings)?;
        }
    }
    Ok(())
}

fn write_condition(
    buf: &mut StringBuilder,
    column: &str,
    operand: &Operand,
    bindings: &mut Option<&mut Bindings>,
) -> Result<(), CompileError> {
    buf.write_str(column);
    buf.write_str(&operand.render(bindings.as_deref_mut())?);
    Ok(())
}
