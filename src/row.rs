//! 行映射：借助复合别名把一行扁平结果拆回 表 → 列 → (值, 别名)。

use crate::columns::decode_alias;
use crate::connection::Row;
use crate::value::SqlValue;
use std::collections::BTreeMap;

/// 行映射错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("result column `{0}` does not carry a composite alias")]
    MalformedLabel(String),
    #[error("result column `{table}.{column}` appears twice in one row")]
    DuplicateColumn { table: String, column: String },
}

/// 单元格：值以及查询时指定的别名。
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: SqlValue,
    pub alias: String,
}

/// 一行结果按来源表分组后的形式。无表名的列归入空字符串表。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRow {
    tables: BTreeMap<String, BTreeMap<String, Cell>>,
}

impl DecodedRow {
    pub fn table(&self, name: &str) -> Option<&BTreeMap<String, Cell>> {
        self.tables.get(name)
    }

    pub fn get(&self, table: &str, column: &str) -> Option<&Cell> {
        self.tables.get(table)?.get(column)
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn into_tables(self) -> BTreeMap<String, BTreeMap<String, Cell>> {
        self.tables
    }
}

/// 拆分一行。每个列标签都必须符合 `table__msqp__column__as__alias`。
pub fn decode_row(cells: &[(String, SqlValue)]) -> Result<DecodedRow, DecodeError> {
    let mut row = DecodedRow::default();
    for (label, value) in cells {
        let (table, column, alias) =
            decode_alias(label).ok_or_else(|| DecodeError::MalformedLabel(label.clone()))?;
        let columns = row.tables.entry(table.to_string()).or_default();
        if columns.contains_key(column) {
            return Err(DecodeError::DuplicateColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        columns.insert(
            column.to_string(),
            Cell {
                value: value.clone(),
                alias: alias.to_string(),
            },
        );
    }
    Ok(row)
}

pub fn decode_rows(rows: &[Row]) -> Result<Vec<DecodedRow>, DecodeError> {
    rows.iter().map(|r| decode_row(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::encode_alias;
    use pretty_assertions::assert_eq;

    fn cell(table: &str, column: &str, alias: &str, v: impl Into<SqlValue>) -> (String, SqlValue) {
        (encode_alias(table, column, alias), v.into())
    }

    #[test]
    fn splits_joined_row_by_table() {
        let raw = vec![
            cell("users", "id", "id", 7_i64),
            cell("users", "name", "user_name", "ann"),
            cell("posts", "id", "post_id", 11_i64),
            cell("", "total", "total", 3_i64),
        ];
        let row = decode_row(&raw).unwrap();

        assert_eq!(row.tables().collect::<Vec<_>>(), vec!["", "posts", "users"]);
        assert_eq!(
            row.get("users", "name"),
            Some(&Cell {
                value: SqlValue::from("ann"),
                alias: "user_name".to_string(),
            })
        );
        assert_eq!(row.get("posts", "id").map(|c| c.alias.as_str()), Some("post_id"));
        assert_eq!(row.table("").map(|t| t.len()), Some(1));
    }

    #[test]
    fn rejects_plain_labels_and_duplicates() {
        let plain = vec![("id".to_string(), SqlValue::I64(1))];
        assert_eq!(
            decode_row(&plain),
            Err(DecodeError::MalformedLabel("id".to_string()))
        );

        let dup = vec![cell("t", "a", "x", 1_i64), cell("t", "a", "y", 2_i64)];
        assert!(matches!(
            decode_row(&dup),
            Err(DecodeError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn decodes_many_rows() {
        let rows = vec![
            vec![cell("t", "a", "a", 1_i64)],
            vec![cell("t", "a", "a", 2_i64)],
        ];
        let decoded = decode_rows(&rows).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[1].get("t", "a").map(|c| &c.value), Some(&SqlValue::I64(2)));
    }
}
