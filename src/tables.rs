//! 表选择器与 FROM 子句渲染（含 JOIN）。

use crate::config::FullJoinKeyword;
use crate::error::CompileError;
use crate::string_builder::{Joiner, StringBuilder};

/// 五种 JOIN。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub const ALL: [JoinKind; 5] = [
        JoinKind::Inner,
        JoinKind::Left,
        JoinKind::Right,
        JoinKind::Full,
        JoinKind::Cross,
    ];

    /// 数字编码：1=INNER，2=LEFT，3=RIGHT，4=FULL，5=CROSS。
    pub fn from_code(code: i64) -> Result<Self, CompileError> {
        Self::ALL
            .into_iter()
            .find(|k| k.code() == code)
            .ok_or_else(|| CompileError::invalid(format!("unknown join type code {code}")))
    }

    pub fn from_name(name: &str) -> Result<Self, CompileError> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| CompileError::invalid(format!("unknown join type `{name}`")))
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Inner => 1,
            Self::Left => 2,
            Self::Right => 3,
            Self::Full => 4,
            Self::Cross => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Full => "FULL",
            Self::Cross => "CROSS",
        }
    }

    pub fn keyword(self, full: FullJoinKeyword) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => full.as_str(),
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// 一个 JOIN：目标表与 `目标列 = 源表列` 的映射。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub target: String,
    pub on: Vec<(String, String)>,
}

impl Join {
    pub fn new(kind: JoinKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            on: Vec::new(),
        }
    }

    pub fn inner(target: impl Into<String>) -> Self {
        Self::new(JoinKind::Inner, target)
    }

    pub fn left(target: impl Into<String>) -> Self {
        Self::new(JoinKind::Left, target)
    }

    pub fn right(target: impl Into<String>) -> Self {
        Self::new(JoinKind::Right, target)
    }

    pub fn full(target: impl Into<String>) -> Self {
        Self::new(JoinKind::Full, target)
    }

    pub fn cross(target: impl Into<String>) -> Self {
        Self::new(JoinKind::Cross, target)
    }

    /// 追加 `target.target_col = source.source_col`。
    pub fn on(mut self, target_col: impl Into<String>, source_col: impl Into<String>) -> Self {
        self.on.push((target_col.into(), source_col.into()));
        self
    }

    fn write(
        &self,
        buf: &mut StringBuilder,
        source: &str,
        full: FullJoinKeyword,
    ) -> Result<(), CompileError> {
        if self.target.is_empty() {
            return Err(CompileError::invalid(format!(
                "join on `{source}` has an empty target table"
            )));
        }
        if self.on.is_empty() && self.kind != JoinKind::Cross {
            return Err(CompileError::invalid(format!(
                "{} `{}` needs at least one ON column pair",
                self.kind.keyword(full),
                self.target
            )));
        }

        buf.write_char(' ');
        buf.write_str(self.kind.keyword(full));
        buf.write_char(' ');
        buf.write_str(&self.target);
        if self.on.is_empty() {
            return Ok(());
        }

        buf.write_str(" ON ");
        let mut joiner = Joiner::new(" AND ");
        for (target_col, source_col) in &self.on {
            if target_col.is_empty() || source_col.is_empty() {
                return Err(CompileError::invalid(format!(
                    "invalid ON pair for join `{}`",
                    self.target
                )));
            }
            joiner.next(buf);
            buf.write_str(&format!(
                "{}.{target_col} = {source}.{source_col}",
                self.target
            ));
        }
        Ok(())
    }
}

/// 多表选择中的一项。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEntry {
    Plain(String),
    Joined { table: String, joins: Vec<Join> },
}

impl TableEntry {
    pub fn table(&self) -> &str {
        match self {
            Self::Plain(t) => t,
            Self::Joined { table, .. } => table,
        }
    }
}

/// 表选择器：单表名，或按顺序排列的多表（可带 JOIN）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSelector {
    Single(String),
    List(Vec<TableEntry>),
}

impl Default for TableSelector {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl TableSelector {
    pub fn single(name: impl Into<String>) -> Self {
        Self::Single(name.into())
    }

    pub fn list() -> Self {
        Self::List(Vec::new())
    }

    /// 追加一张普通表（单表选择器会先转换成列表）。
    pub fn table(self, name: impl Into<String>) -> Self {
        self.push(TableEntry::Plain(name.into()))
    }

    pub fn joined(self, name: impl Into<String>, joins: impl IntoIterator<Item = Join>) -> Self {
        self.push(TableEntry::Joined {
            table: name.into(),
            joins: joins.into_iter().collect(),
        })
    }

    fn push(self, entry: TableEntry) -> Self {
        let mut entries = match self {
            Self::Single(t) => vec![TableEntry::Plain(t)],
            Self::List(v) => v,
        };
        entries.push(entry);
        Self::List(entries)
    }

    /// 第一张表：对象层以它作为"自身"表。
    pub fn primary_table(&self) -> Option<&str> {
        match self {
            Self::Single(t) => Some(t.as_str()),
            Self::List(v) => v.first().map(TableEntry::table),
        }
    }

    /// Render：渲染 FROM 之后的文本（不含 `FROM` 关键字）。
    pub fn render(&self, full: FullJoinKeyword) -> Result<String, CompileError> {
        match self {
            Self::Single(t) => {
                if t.is_empty() {
                    return Err(CompileError::invalid("empty tables selector"));
                }
                Ok(t.clone())
            }
            Self::List(entries) => {
                if entries.is_empty() {
                    return Err(CompileError::invalid("empty tables selector"));
                }
                let mut buf = StringBuilder::new();
                let mut joiner = Joiner::new(", ");
                for entry in entries {
                    let table = entry.table();
                    if table.is_empty() {
                        return Err(CompileError::invalid("empty table name in tables selector"));
                    }
                    joiner.next(&mut buf);
                    buf.write_str(table);
                    if let TableEntry::Joined { joins, .. } = entry {
                        for join in joins {
                            join.write(&mut buf, table, full)?;
                        }
                    }
                }
                Ok(buf.into_string())
            }
        }
    }
}

impl From<&str> for TableSelector {
    fn from(v: &str) -> Self {
        Self::single(v)
    }
}

impl From<String> for TableSelector {
    fn from(v: String) -> Self {
        Self::Single(v)
    }
}

impl<S: Into<String>> FromIterator<S> for TableSelector {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::List(iter.into_iter().map(|s| TableEntry::Plain(s.into())).collect())
    }
}
