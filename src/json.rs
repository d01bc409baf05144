//! 从松散的 JSON 嵌套结构构造选择器、条件树、选项与写入数据。
//!
//! 形状检查只在这里做一次；任何不符合约定的结构都会返回 `InvalidArgument`，
//! 之后的渲染只面对强类型的数据。对象的键顺序即输出顺序。

use crate::columns::ColumnSelector;
use crate::compiler::Assignments;
use crate::conditions::{AndSet, ColumnCondition, ConditionTree, OrEntry};
use crate::error::CompileError;
use crate::expr::Operand;
use crate::options::{Direction, Limit, OptionsSpec};
use crate::tables::{Join, JoinKind, TableEntry, TableSelector};
use crate::value::SqlValue;
use serde_json::{Map, Number, Value};

impl ConditionTree {
    /// 接受 `{"and": {...}, "or": {...}}`，或不含保留键的扁平对象（隐式 AND）。
    ///
    /// `or` 可以是对象，也可以是数组；数组元素为 `{"列": 值}` 或 `{"and": {...}}`。
    /// 对象形式的 `or` 中，整数键对应的对象值是内嵌 AND 组。
    pub fn from_json(value: &Value) -> Result<Self, CompileError> {
        let obj = expect_object(value, "condition tree")?;
        let has_and = obj.contains_key("and");
        let has_or = obj.contains_key("or");
        if !has_and && !has_or {
            return Ok(Self::from_and(and_set(obj)?));
        }
        if let Some(key) = obj.keys().find(|k| *k != "and" && *k != "or") {
            return Err(CompileError::invalid(format!(
                "column `{key}` mixed with reserved keys `and`/`or`"
            )));
        }

        let mut tree = match obj.get("and") {
            Some(v) => Self::from_and(and_set(expect_object(v, "`and` group")?)?),
            None => Self::new(),
        };
        match obj.get("or") {
            None => {}
            Some(Value::Object(or)) => {
                for (key, v) in or {
                    if let Value::Object(group) = v {
                        if key.parse::<i64>().is_err() {
                            return Err(CompileError::invalid(format!(
                                "nested AND group under `or` needs an integer key, got `{key}`"
                            )));
                        }
                        tree = tree.or_group(and_set(group)?);
                    } else {
                        tree = tree.or(key.as_str(), column_condition(key, v)?);
                    }
                }
            }
            Some(Value::Array(items)) => {
                for item in items {
                    tree = match or_item(item)? {
                        OrEntry::Column(column, cond) => tree.or(column, cond),
                        OrEntry::Group(group) => tree.or_group(group),
                    };
                }
            }
            Some(other) => {
                return Err(CompileError::invalid(format!(
                    "`or` must be an object or an array, got {}",
                    kind(other)
                )));
            }
        }
        Ok(tree)
    }
}

fn or_item(item: &Value) -> Result<OrEntry, CompileError> {
    let obj = expect_object(item, "`or` element")?;
    if obj.len() != 1 {
        return Err(CompileError::invalid(
            "`or` element must hold exactly one column or one `and` group",
        ));
    }
    let Some((key, v)) = obj.iter().next() else {
        return Err(CompileError::invalid("empty `or` element"));
    };
    if key == "and" {
        return Ok(OrEntry::Group(and_set(expect_object(v, "`and` group")?)?));
    }
    Ok(OrEntry::Column(key.clone(), column_condition(key, v)?))
}

fn and_set(obj: &Map<String, Value>) -> Result<AndSet, CompileError> {
    let mut set = AndSet::new();
    for (column, v) in obj {
        if column == "and" || column == "or" {
            return Err(CompileError::invalid(format!(
                "reserved key `{column}` cannot be nested inside an AND group"
            )));
        }
        set.push(column.as_str(), column_condition(column, v)?);
    }
    Ok(set)
}

fn column_condition(column: &str, v: &Value) -> Result<ColumnCondition, CompileError> {
    match v {
        Value::Array(items) => items
            .iter()
            .map(|item| operand(column, item))
            .collect::<Result<Vec<_>, _>>()
            .map(ColumnCondition::List),
        other => operand(column, other).map(ColumnCondition::Single),
    }
}

fn operand(column: &str, v: &Value) -> Result<Operand, CompileError> {
    match v {
        Value::String(s) => Ok(Operand::parse(s)),
        Value::Array(_) | Value::Object(_) => Err(CompileError::invalid(format!(
            "condition value for `{column}` must be a scalar, got {}",
            kind(v)
        ))),
        other => scalar(other).map(Operand::from),
    }
}

/// JSON 标量转换为 `SqlValue`；字符串保持原样，不做运算符解析。
fn scalar(v: &Value) -> Result<SqlValue, CompileError> {
    match v {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Bool(*b)),
        Value::Number(n) => number(n),
        Value::String(s) => Ok(SqlValue::from(s.clone())),
        other => Err(CompileError::invalid(format!(
            "expected a scalar, got {}",
            kind(other)
        ))),
    }
}

fn number(n: &Number) -> Result<SqlValue, CompileError> {
    if let Some(i) = n.as_i64() {
        Ok(SqlValue::I64(i))
    } else if let Some(u) = n.as_u64() {
        Ok(SqlValue::U64(u))
    } else if let Some(f) = n.as_f64() {
        Ok(SqlValue::F64(f))
    } else {
        Err(CompileError::invalid(format!("unrepresentable number {n}")))
    }
}

impl ColumnSelector {
    /// 接受 `{"t.col": "别名"}`（`null` 或整数键表示不设别名），
    /// 或数组：元素为列名字符串或单项对象 `{"t.col": "别名"}`。
    pub fn from_json(value: &Value) -> Result<Self, CompileError> {
        let mut sel = Self::new();
        match value {
            Value::Object(obj) => {
                for (key, v) in obj {
                    match v {
                        Value::String(s) if key.parse::<i64>().is_ok() => {
                            sel.push(s.as_str(), None::<String>)
                        }
                        Value::String(label) => sel.push(key.as_str(), Some(label.as_str())),
                        Value::Null => sel.push(key.as_str(), None::<String>),
                        other => {
                            return Err(CompileError::invalid(format!(
                                "alias for column `{key}` must be a string, got {}",
                                kind(other)
                            )));
                        }
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(s) => sel.push(s.as_str(), None::<String>),
                        Value::Object(obj) if obj.len() == 1 => {
                            for (key, v) in obj {
                                let Value::String(label) = v else {
                                    return Err(CompileError::invalid(format!(
                                        "alias for column `{key}` must be a string"
                                    )));
                                };
                                sel.push(key.as_str(), Some(label.as_str()));
                            }
                        }
                        other => {
                            return Err(CompileError::invalid(format!(
                                "invalid column entry {}",
                                kind(other)
                            )));
                        }
                    }
                }
            }
            other => {
                return Err(CompileError::invalid(format!(
                    "columns must be an object or an array, got {}",
                    kind(other)
                )));
            }
        }
        Ok(sel)
    }
}

impl TableSelector {
    /// 接受表名字符串，或数组：元素为表名，或 `{"t1": {"INNER": {"t2": {"ref": "id"}}}}`。
    ///
    /// JOIN 键可以是编码 `"1"`..`"5"`，也可以是名称（大小写无关）。
    pub fn from_json(value: &Value) -> Result<Self, CompileError> {
        match value {
            Value::String(s) => Ok(Self::single(s.as_str())),
            Value::Array(items) => {
                let mut entries = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => entries.push(TableEntry::Plain(s.clone())),
                        Value::Object(obj) => {
                            for (table, spec) in obj {
                                entries.push(TableEntry::Joined {
                                    table: table.clone(),
                                    joins: joins(table, spec)?,
                                });
                            }
                        }
                        other => {
                            return Err(CompileError::invalid(format!(
                                "invalid table entry {}",
                                kind(other)
                            )));
                        }
                    }
                }
                Ok(Self::List(entries))
            }
            other => Err(CompileError::invalid(format!(
                "tables must be a string or an array, got {}",
                kind(other)
            ))),
        }
    }
}

fn joins(table: &str, spec: &Value) -> Result<Vec<Join>, CompileError> {
    let spec = expect_object(spec, "join specification")?;
    let mut out = Vec::new();
    for (kind_key, targets) in spec {
        let join_kind = match kind_key.parse::<i64>() {
            Ok(code) => JoinKind::from_code(code)?,
            Err(_) => JoinKind::from_name(kind_key)?,
        };
        let targets = expect_object(targets, "join targets")?;
        for (target, on) in targets {
            let mut join = Join::new(join_kind, target.as_str());
            match on {
                Value::Null => {}
                Value::Object(pairs) => {
                    for (target_col, source_col) in pairs {
                        let Value::String(source_col) = source_col else {
                            return Err(CompileError::invalid(format!(
                                "ON column for `{target}.{target_col}` on `{table}` must be a string"
                            )));
                        };
                        join = join.on(target_col.as_str(), source_col.as_str());
                    }
                }
                other => {
                    return Err(CompileError::invalid(format!(
                        "ON mapping for join `{target}` must be an object, got {}",
                        kind(other)
                    )));
                }
            }
            out.push(join);
        }
    }
    Ok(out)
}

impl OptionsSpec {
    /// 接受 `group` / `order` / `limit` 三个键，其余键忽略。
    pub fn from_json(value: &Value) -> Result<Self, CompileError> {
        let obj = expect_object(value, "options")?;
        let mut opts = Self::new();

        match obj.get("group") {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) => opts = opts.group_by(s.as_str()),
            Some(Value::Array(items)) => {
                for item in items {
                    let Value::String(s) = item else {
                        return Err(CompileError::invalid("GROUP BY columns must be strings"));
                    };
                    opts = opts.group_by(s.as_str());
                }
            }
            Some(other) => {
                return Err(CompileError::invalid(format!(
                    "`group` must be a string or an array, got {}",
                    kind(other)
                )));
            }
        }

        match obj.get("order") {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) => opts = opts.order_by(s.as_str()),
            Some(Value::Object(map)) => {
                for (key, v) in map {
                    opts = order_entry(opts, key, v)?;
                }
            }
            Some(Value::Array(items)) => {
                for item in items {
                    match item {
                        Value::String(s) => opts = opts.order_by(s.as_str()),
                        Value::Object(map) => {
                            for (key, v) in map {
                                opts = order_entry(opts, key, v)?;
                            }
                        }
                        other => {
                            return Err(CompileError::invalid(format!(
                                "invalid ORDER BY entry {}",
                                kind(other)
                            )));
                        }
                    }
                }
            }
            Some(other) => {
                return Err(CompileError::invalid(format!(
                    "`order` must be a string, an object or an array, got {}",
                    kind(other)
                )));
            }
        }

        match obj.get("limit") {
            None | Some(Value::Null) => {}
            Some(Value::Number(n)) => match n.as_u64() {
                Some(n) => opts = opts.limit(n),
                None => {
                    return Err(CompileError::invalid(format!(
                        "LIMIT must be a non-negative integer, got {n}"
                    )));
                }
            },
            Some(Value::String(s)) => opts = opts.limit(Limit::Raw(s.clone())),
            Some(other) => {
                return Err(CompileError::invalid(format!(
                    "`limit` must be an integer or a string, got {}",
                    kind(other)
                )));
            }
        }

        Ok(opts)
    }
}

/// `{"col": "desc"}`；整数键表示值本身是列名、升序。
fn order_entry(opts: OptionsSpec, key: &str, v: &Value) -> Result<OptionsSpec, CompileError> {
    match v {
        Value::String(s) if key.parse::<i64>().is_ok() => Ok(opts.order_by(s.as_str())),
        Value::String(dir) => Ok(opts.order_with(key, Direction::parse(dir))),
        Value::Null => Ok(opts.order_by(key)),
        other => Err(CompileError::invalid(format!(
            "direction for `{key}` must be a string, got {}",
            kind(other)
        ))),
    }
}

impl Assignments {
    /// 接受 `{"列": 标量}`；字符串按原样写入。
    pub fn from_json(value: &Value) -> Result<Self, CompileError> {
        let obj = expect_object(value, "write data")?;
        let mut data = Self::new();
        for (column, v) in obj {
            let v = scalar(v).map_err(|_| {
                CompileError::invalid(format!("value for column `{column}` must be a scalar"))
            })?;
            data.push(column.as_str(), v);
        }
        Ok(data)
    }
}

fn expect_object<'a>(v: &'a Value, what: &str) -> Result<&'a Map<String, Value>, CompileError> {
    match v {
        Value::Object(obj) => Ok(obj),
        other => Err(CompileError::invalid(format!(
            "{what} must be an object, got {}",
            kind(other)
        ))),
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
