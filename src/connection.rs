//! Connection：执行编译结果的外部协作方。
//!
//! 本 crate 不带任何驱动；调用方为自己的数据库实现该 trait。

use crate::binder::Bindings;
use crate::value::SqlValue;
use std::cell::RefCell;
use std::rc::Rc;

/// 一行结果：按列顺序排列的 (列标签, 值)。
pub type Row = Vec<(String, SqlValue)>;

/// 可共享的连接句柄。
pub type SharedConnection = Rc<RefCell<dyn Connection>>;

/// describe 返回的列元数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub primary: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary: false,
        }
    }

    pub fn primary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary: true,
        }
    }
}

/// 驱动层错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("query failed: {0}")]
    Query(String),
    #[error("table `{0}` does not exist")]
    UnknownTable(String),
    #[error("no row was inserted")]
    NoInsertId,
}

/// 数据库连接。
pub trait Connection {
    /// 执行语句；`bindings` 为占位符到值的映射，由驱动负责参数绑定。
    fn execute(&mut self, sql: &str, bindings: &Bindings) -> Result<Vec<Row>, ConnectionError>;

    /// 列出表的列，顺序即表定义顺序。
    fn describe(&mut self, table: &str) -> Result<Vec<ColumnInfo>, ConnectionError>;

    /// 最近一次 INSERT 生成的主键。
    fn last_insert_id(&self) -> Result<SqlValue, ConnectionError>;
}
