//! 列选择器与 SELECT 列表渲染。
//!
//! 每一列都会输出为 `table.column AS table__msqp__column__as__label`。
//! 联表查询的结果会被数据库压平到同一个命名空间，行映射依靠这个复合别名
//! 把一行拆回 表 → 列 → (值, 用户别名)，不需要额外查询。

use crate::config::EmptyColumns;
use crate::error::CompileError;
use crate::string_builder::{Joiner, StringBuilder};

/// 别名中分隔表名与列名。
pub const COLUMN_SEPARATOR: &str = "__msqp__";
/// 别名中分隔列名与用户别名。
pub const ALIAS_SEPARATOR: &str = "__as__";

/// 拆分后的列标识：`table.column`，没有点号时表名为空。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn parse(selector: &str) -> Result<Self, CompileError> {
        let (table, column) = match selector.split_once('.') {
            Some((t, c)) => (t, c),
            None => ("", selector),
        };
        if column.is_empty() || column.contains('.') || (selector.contains('.') && table.is_empty())
        {
            return Err(CompileError::invalid(format!(
                "invalid column selector `{selector}`"
            )));
        }
        // 表名后面紧跟列分隔符，列名后面紧跟别名分隔符；
        // 结尾是分隔符前缀的名字会让分隔符提前匹配，解码时无法还原。
        if clashes_with(table, COLUMN_SEPARATOR)
            || clashes_with(column, ALIAS_SEPARATOR)
            || [table, column]
                .iter()
                .any(|p| p.contains(COLUMN_SEPARATOR) || p.contains(ALIAS_SEPARATOR))
        {
            return Err(CompileError::invalid(format!(
                "column selector `{selector}` contains a reserved separator"
            )));
        }
        Ok(Self {
            table: table.to_string(),
            column: column.to_string(),
        })
    }

    /// 带表名的 SQL 写法。
    pub fn qualified(&self) -> String {
        if self.table.is_empty() {
            self.column.clone()
        } else {
            format!("{}.{}", self.table, self.column)
        }
    }
}

fn clashes_with(part: &str, separator: &str) -> bool {
    (1..separator.len()).any(|n| part.ends_with(&separator[..n]))
}

/// 别名不加引号输出，只接受 ASCII 标识符。
fn is_identifier(label: &str) -> bool {
    let mut bytes = label.bytes();
    matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// 组装复合别名。
pub fn encode_alias(table: &str, column: &str, label: &str) -> String {
    format!("{table}{COLUMN_SEPARATOR}{column}{ALIAS_SEPARATOR}{label}")
}

/// 拆解复合别名为 (表, 列, 用户别名)；不符合编码格式时返回 `None`。
pub fn decode_alias(alias: &str) -> Option<(&str, &str, &str)> {
    let (table, rest) = alias.split_once(COLUMN_SEPARATOR)?;
    let (column, label) = rest.split_once(ALIAS_SEPARATOR)?;
    if column.is_empty() {
        return None;
    }
    Some((table, column, label))
}

/// 列选择器：按插入顺序保存 列标识 → 输出别名（`None` 表示别名等于列名）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelector {
    entries: Vec<(String, Option<String>)>,
}

impl ColumnSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, selector: impl Into<String>) -> Self {
        self.push(selector, None::<String>);
        self
    }

    pub fn aliased(mut self, selector: impl Into<String>, label: impl Into<String>) -> Self {
        self.push(selector, Some(label));
        self
    }

    pub fn push(&mut self, selector: impl Into<String>, label: Option<impl Into<String>>) {
        self.entries
            .push((selector.into(), label.map(Into::into)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(c, l)| (c.as_str(), l.as_deref()))
    }

    /// Render：渲染 SELECT 列表（不含 `SELECT` 关键字）。
    pub fn render(&self, policy: EmptyColumns) -> Result<String, CompileError> {
        if self.entries.is_empty() {
            return match policy {
                EmptyColumns::Wildcard => Ok("*".to_string()),
                EmptyColumns::Reject => Err(CompileError::UnsupportedFeature(
                    "empty column selector: column provenance cannot be tracked for `*`"
                        .to_string(),
                )),
            };
        }

        let mut buf = StringBuilder::new();
        let mut joiner = Joiner::new(", ");
        for (selector, label) in self.iter() {
            let col = ColumnRef::parse(selector)?;
            let label = label.unwrap_or(&col.column);
            if !is_identifier(label) || label.contains(ALIAS_SEPARATOR) {
                return Err(CompileError::invalid(format!(
                    "invalid alias `{label}` for column `{selector}`"
                )));
            }

            joiner.next(&mut buf);
            buf.write_str(&col.qualified());
            buf.write_str(" AS ");
            buf.write_str(&encode_alias(&col.table, &col.column, label));
        }
        Ok(buf.into_string())
    }
}

impl<S: Into<String>> FromIterator<S> for ColumnSelector {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut sel = Self::new();
        for s in iter {
            sel.push(s, None::<String>);
        }
        sel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_composite_aliases() {
        let sel = ColumnSelector::new().column("t1.a").aliased("t1.b", "bee").column("c");
        assert_eq!(
            sel.render(EmptyColumns::Wildcard).unwrap(),
            "t1.a AS t1__msqp__a__as__a, t1.b AS t1__msqp__b__as__bee, c AS __msqp__c__as__c"
        );
    }

    #[test]
    fn empty_selector_policy() {
        let sel = ColumnSelector::new();
        assert_eq!(sel.render(EmptyColumns::Wildcard).unwrap(), "*");
        assert!(matches!(
            sel.render(EmptyColumns::Reject),
            Err(CompileError::UnsupportedFeature(_))
        ));
    }

    #[test]
    fn alias_encoding_decodes_back() {
        let alias = encode_alias("users", "id", "user_id");
        assert_eq!(decode_alias(&alias), Some(("users", "id", "user_id")));
        assert_eq!(decode_alias("__msqp__id__as__id"), Some(("", "id", "id")));
        assert_eq!(decode_alias("plain_column"), None);
        assert_eq!(decode_alias("t__msqp__col"), None);
    }

    #[test]
    fn bad_selectors_are_rejected() {
        for bad in ["", "t1.", ".a", "db.t1.a", "t__msqp__x.a", "t.a__as__b"] {
            assert!(ColumnRef::parse(bad).is_err(), "{bad}");
        }
        let sel = ColumnSelector::new().aliased("t.a", "x__as__y");
        assert!(sel.render(EmptyColumns::Wildcard).is_err());
    }

    #[test]
    fn names_ending_in_a_separator_prefix_are_rejected() {
        for bad in ["t.x__as", "t.x_", "t.x__a", "t.x__as_", "t_.a", "t__msqp.a", "t__m.a"] {
            assert!(ColumnRef::parse(bad).is_err(), "{bad}");
        }
        for good in ["t.x_as", "t._a", "user_data.as__x", "t.msqp__a"] {
            let col = ColumnRef::parse(good).unwrap();
            let alias = encode_alias(&col.table, &col.column, "lbl");
            assert_eq!(
                decode_alias(&alias),
                Some((col.table.as_str(), col.column.as_str(), "lbl")),
                "{good}"
            );
        }
    }

    #[test]
    fn labels_must_be_identifiers() {
        for bad in ["my label", "a-b", "1st", "x;drop", "名字"] {
            let sel = ColumnSelector::new().aliased("t.a", bad);
            assert!(
                matches!(sel.render(EmptyColumns::Wildcard), Err(CompileError::InvalidArgument(_))),
                "{bad}"
            );
        }
        assert!(
            ColumnSelector::new()
                .column("t.count(*)")
                .render(EmptyColumns::Wildcard)
                .is_err()
        );
        assert_eq!(
            ColumnSelector::new()
                .aliased("t.a", "_Label_2")
                .render(EmptyColumns::Wildcard)
                .unwrap(),
            "t.a AS t__msqp__a__as___Label_2"
        );
    }
}
