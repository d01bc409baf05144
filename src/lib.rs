//! halo-compiler：把结构化的表、列、条件与选项描述编译成带占位符的 SQL，
//! 并提供一层把结果行映射回可修改记录的对象接口。

pub mod binder;
pub mod columns;
pub mod compiler;
pub mod conditions;
pub mod config;
pub mod connection;
pub mod entry;
pub mod error;
pub mod expr;
pub mod json;
#[cfg(test)]
mod json_tests;
pub mod macros;
pub mod options;
pub mod row;
mod string_builder;
pub mod table;
#[cfg(test)]
mod table_tests;
pub mod tables;
pub mod value;
pub mod valuer;

pub use crate::binder::Bindings;
pub use crate::columns::{
    ALIAS_SEPARATOR, COLUMN_SEPARATOR, ColumnRef, ColumnSelector, decode_alias, encode_alias,
};
pub use crate::compiler::{
    Assignments, Compiled, Compiler, Filter, compile_delete, compile_insert, compile_select,
    compile_update,
};
pub use crate::conditions::{AndSet, ColumnCondition, ConditionTree, OrEntry};
pub use crate::config::{
    Config, DEFAULT_PLACEHOLDER_TEMPLATE, DefaultConfigGuard, EmptyColumns, FullJoinKeyword,
    default_config, set_default_config, set_default_config_scoped,
};
pub use crate::connection::{ColumnInfo, Connection, ConnectionError, Row, SharedConnection};
pub use crate::entry::{Entry, ResultSet};
pub use crate::error::CompileError;
pub use crate::expr::{Literal, Operand, Operator};
pub use crate::options::{Direction, Limit, OptionsSpec};
pub use crate::row::{Cell, DecodeError, DecodedRow, decode_row, decode_rows};
pub use crate::table::{Table, TableError};
pub use crate::tables::{Join, JoinKind, TableEntry, TableSelector};
pub use crate::value::{SqlValue, parse_literal};
pub use crate::valuer::{SqlValuer, ValuerError};
