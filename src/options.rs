//! GROUP BY / ORDER BY / LIMIT 选项。

use crate::error::CompileError;
use crate::string_builder::{Joiner, StringBuilder};
use std::fmt;

/// 排序方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// 大小写无关地匹配 `desc`，其他任何文本都视为升序。
    pub fn parse(text: &str) -> Self {
        if text.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LIMIT 的几种写法。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Limit {
    Count(u64),
    /// `LIMIT offset, count`
    Range { offset: u64, count: u64 },
    /// 原样输出，例如 `"1, 23"`。
    Raw(String),
}

impl From<u64> for Limit {
    fn from(v: u64) -> Self {
        Self::Count(v)
    }
}

impl From<&str> for Limit {
    fn from(v: &str) -> Self {
        Self::Raw(v.to_string())
    }
}

impl From<String> for Limit {
    fn from(v: String) -> Self {
        Self::Raw(v)
    }
}

/// 查询选项。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsSpec {
    pub group: Vec<String>,
    pub order: Vec<(String, Direction)>,
    pub limit: Option<Limit>,
}

impl OptionsSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group.push(column.into());
        self
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order.push((column.into(), Direction::Asc));
        self
    }

    pub fn order_by_desc(mut self, column: impl Into<String>) -> Self {
        self.order.push((column.into(), Direction::Desc));
        self
    }

    pub fn order_with(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order.push((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    pub fn limit_range(mut self, offset: u64, count: u64) -> Self {
        self.limit = Some(Limit::Range { offset, count });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty() && self.order.is_empty() && self.limit.is_none()
    }

    /// Render：按 GROUP BY、ORDER BY、LIMIT 的顺序输出，每段带前导空格；没有选项时为空串。
    pub fn render(&self) -> Result<String, CompileError> {
        let mut buf = StringBuilder::new();

        if !self.group.is_empty() {
            buf.write_str(" GROUP BY ");
            let mut joiner = Joiner::new(", ");
            for column in &self.group {
                if column.is_empty() {
                    return Err(CompileError::invalid("empty GROUP BY column"));
                }
                joiner.next(&mut buf);
                buf.write_str(column);
            }
        }

        if !self.order.is_empty() {
            buf.write_str(" ORDER BY ");
            let mut joiner = Joiner::new(", ");
            for (column, direction) in &self.order {
                if column.is_empty() {
                    return Err(CompileError::invalid("empty ORDER BY column"));
                }
                joiner.next(&mut buf);
                buf.write_str(column);
                buf.write_char(' ');
                buf.write_str(direction.as_str());
            }
        }

        match &self.limit {
            None => {}
            Some(Limit::Count(n)) => buf.write_str(&format!(" LIMIT {n}")),
            Some(Limit::Range { offset, count }) => {
                buf.write_str(&format!(" LIMIT {offset}, {count}"))
            }
            Some(Limit::Raw(raw)) => {
                if raw.trim().is_empty() {
                    return Err(CompileError::invalid("empty LIMIT"));
                }
                buf.write_str(" LIMIT ");
                buf.write_str(raw);
            }
        }

        Ok(buf.into_string())
    }
}
