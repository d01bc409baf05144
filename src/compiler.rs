//! Compiler：select / insert / update / delete 四个入口。
//!
//! 每次调用都会创建新的 `Bindings`，编译结果与绑定值一起返回，编译器本身不保存语句状态。

use crate::binder::Bindings;
use crate::columns::ColumnSelector;
use crate::conditions::ConditionTree;
use crate::config::{Config, default_config};
use crate::error::CompileError;
use crate::expr::Literal;
use crate::options::OptionsSpec;
use crate::string_builder::{Joiner, StringBuilder};
use crate::tables::TableSelector;
use crate::valuer::SqlValuer;

/// 编译结果：SQL 文本与占位符映射。
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub sql: String,
    pub bindings: Bindings,
}

impl Compiled {
    pub fn into_parts(self) -> (String, Bindings) {
        (self.sql, self.bindings)
    }

    /// 把绑定值代回 SQL，便于日志输出。
    pub fn interpolated(&self) -> Result<String, CompileError> {
        self.bindings.interpolate(&self.sql)
    }
}

/// UPDATE / DELETE 的过滤条件；不带条件的写操作必须显式使用 `AllRows`。
#[derive(Debug, Clone)]
pub enum Filter {
    Where(ConditionTree),
    AllRows,
}

impl From<ConditionTree> for Filter {
    fn from(tree: ConditionTree) -> Self {
        Self::Where(tree)
    }
}

/// INSERT / UPDATE 的 列 → 值 列表，按插入顺序输出。
#[derive(Debug, Clone, Default)]
pub struct Assignments {
    entries: Vec<(String, Literal)>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.push(column, value);
        self
    }

    pub fn set_valuer(mut self, column: impl Into<String>, valuer: impl SqlValuer + 'static) -> Self {
        self.entries
            .push((column.into(), Literal::Valuer(Box::new(valuer))));
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Literal>) {
        self.entries.push((column.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Literal)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    fn validate(&self) -> Result<(), CompileError> {
        if self.entries.is_empty() {
            return Err(CompileError::invalid("no columns to write"));
        }
        for (i, (column, _)) in self.entries.iter().enumerate() {
            if column.is_empty() {
                return Err(CompileError::invalid("empty column name in write data"));
            }
            if self.entries[..i].iter().any(|(c, _)| c == column) {
                return Err(CompileError::invalid(format!(
                    "column `{column}` is assigned twice"
                )));
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<Literal>> FromIterator<(K, V)> for Assignments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (k, v) in iter {
            data.push(k, v);
        }
        data
    }
}

/// 语句编译器，只持有配置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    config: Config,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// 使用当前进程级默认配置。
    pub fn new() -> Self {
        Self::with_config(default_config())
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn bindings(&self) -> Bindings {
        Bindings::with_template(self.config.placeholder_template.clone())
    }

    /// Select：`SELECT <columns> FROM <tables>[ WHERE <conditions>]<options>;`
    ///
    /// 空条件树表示不输出 WHERE。
    pub fn select(
        &self,
        tables: &TableSelector,
        columns: &ColumnSelector,
        conditions: &ConditionTree,
        options: &OptionsSpec,
        use_placeholders: bool,
    ) -> Result<Compiled, CompileError> {
        let mut bindings = self.bindings();
        let mut buf = StringBuilder::new();

        buf.write_leading("SELECT");
        buf.write_leading(&columns.render(self.config.empty_columns)?);
        buf.write_leading("FROM");
        buf.write_leading(&tables.render(self.config.full_join)?);
        if !conditions.is_empty() {
            let cond = conditions.render(use_placeholders.then_some(&mut bindings))?;
            buf.write_leading("WHERE");
            buf.write_leading(&cond);
        }
        buf.write_str(&options.render()?);
        buf.write_char(';');

        Ok(self.finish("select", buf, bindings))
    }

    /// Insert：`INSERT INTO t (a, b) VALUES (v1, v2);`
    pub fn insert(
        &self,
        table: &str,
        data: &Assignments,
        use_placeholders: bool,
    ) -> Result<Compiled, CompileError> {
        check_table(table)?;
        data.validate()?;

        let mut bindings = self.bindings();
        let mut buf = StringBuilder::new();
        buf.write_str("INSERT INTO ");
        buf.write_str(table);
        buf.write_str(" (");
        let mut joiner = Joiner::new(", ");
        for (column, _) in data.iter() {
            joiner.next(&mut buf);
            buf.write_str(column);
        }
        buf.write_str(") VALUES (");
        let mut joiner = Joiner::new(", ");
        for (_, value) in data.iter() {
            joiner.next(&mut buf);
            write_value(&mut buf, value, use_placeholders.then_some(&mut bindings))?;
        }
        buf.write_str(");");

        Ok(self.finish("insert", buf, bindings))
    }

    /// Update：`UPDATE t SET a = v1, b = v2 WHERE ...;`
    pub fn update(
        &self,
        table: &str,
        data: &Assignments,
        filter: &Filter,
        use_placeholders: bool,
    ) -> Result<Compiled, CompileError> {
        check_table(table)?;
        data.validate()?;

        let mut bindings = self.bindings();
        let mut buf = StringBuilder::new();
        buf.write_str("UPDATE ");
        buf.write_str(table);
        buf.write_str(" SET ");
        let mut joiner = Joiner::new(", ");
        for (column, value) in data.iter() {
            joiner.next(&mut buf);
            buf.write_str(column);
            buf.write_str(" = ");
            write_value(&mut buf, value, use_placeholders.then_some(&mut bindings))?;
        }
        write_filter(&mut buf, filter, use_placeholders.then_some(&mut bindings))?;
        buf.write_char(';');

        Ok(self.finish("update", buf, bindings))
    }

    /// Delete：`DELETE FROM t WHERE ...;`，`Filter::AllRows` 输出 `DELETE FROM t;`
    pub fn delete(
        &self,
        table: &str,
        filter: &Filter,
        use_placeholders: bool,
    ) -> Result<Compiled, CompileError> {
        check_table(table)?;

        let mut bindings = self.bindings();
        let mut buf = StringBuilder::new();
        buf.write_str("DELETE FROM ");
        buf.write_str(table);
        write_filter(&mut buf, filter, use_placeholders.then_some(&mut bindings))?;
        buf.write_char(';');

        Ok(self.finish("delete", buf, bindings))
    }

    fn finish(&self, kind: &'static str, buf: StringBuilder, bindings: Bindings) -> Compiled {
        let sql = buf.into_string();
        tracing::debug!(kind, sql = %sql, bindings = bindings.len(), "compiled statement");
        Compiled { sql, bindings }
    }
}

fn check_table(table: &str) -> Result<(), CompileError> {
    if table.trim().is_empty() {
        return Err(CompileError::invalid("table name is empty"));
    }
    Ok(())
}

fn write_value(
    buf: &mut StringBuilder,
    value: &Literal,
    bindings: Option<&mut Bindings>,
) -> Result<(), CompileError> {
    let value = value.resolve()?;
    match bindings {
        Some(b) if value.needs_binding() => buf.write_str(&b.bind(value)),
        _ => buf.write_str(&value.to_inline()?),
    }
    Ok(())
}

fn write_filter(
    buf: &mut StringBuilder,
    filter: &Filter,
    bindings: Option<&mut Bindings>,
) -> Result<(), CompileError> {
    match filter {
        Filter::AllRows => Ok(()),
        Filter::Where(tree) => {
            if tree.is_empty() {
                return Err(CompileError::invalid(
                    "empty condition tree; use Filter::AllRows to touch every row",
                ));
            }
            buf.write_str(" WHERE ");
            buf.write_str(&tree.render(bindings)?);
            Ok(())
        }
    }
}

/// 使用默认配置编译 SELECT。
pub fn compile_select(
    tables: &TableSelector,
    columns: &ColumnSelector,
    conditions: &ConditionTree,
    options: &OptionsSpec,
    use_placeholders: bool,
) -> Result<Compiled, CompileError> {
    Compiler::new().select(tables, columns, conditions, options, use_placeholders)
}

/// 使用默认配置编译 INSERT。
pub fn compile_insert(
    table: &str,
    data: &Assignments,
    use_placeholders: bool,
) -> Result<Compiled, CompileError> {
    Compiler::new().insert(table, data, use_placeholders)
}

/// 使用默认配置编译 UPDATE。
pub fn compile_update(
    table: &str,
    data: &Assignments,
    filter: &Filter,
    use_placeholders: bool,
) -> Result<Compiled, CompileError> {
    Compiler::new().update(table, data, filter, use_placeholders)
}

/// 使用默认配置编译 DELETE。
pub fn compile_delete(
    table: &str,
    filter: &Filter,
    use_placeholders: bool,
) -> Result<Compiled, CompileError> {
    Compiler::new().delete(table, filter, use_placeholders)
}
