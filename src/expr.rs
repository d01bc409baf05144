//! 条件值解析：把 `"> 5"`、`">{{5}}"` 这类字符串拆成结构化的 (运算符, 字面量)。
//!
//! 解析只在构造 `Operand` 时发生一次，之后的渲染只面对结构化数据。

use crate::binder::Bindings;
use crate::error::CompileError;
use crate::value::SqlValue;
use crate::valuer::SqlValuer;
use std::fmt;

/// 条件运算符。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterEqualThan,
    LessThan,
    LessEqualThan,
    Like,
    NotLike,
    /// `!`：只对 NULL 有意义，总是渲染为 `IS NOT NULL`。
    IsNot,
}

impl Operator {
    /// 运算符查找表；无法识别返回 `None`。
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "=" => Self::Equal,
            "!=" => Self::NotEqual,
            ">" => Self::GreaterThan,
            ">=" => Self::GreaterEqualThan,
            "<" => Self::LessThan,
            "<=" => Self::LessEqualThan,
            "~" => Self::Like,
            "!~" => Self::NotLike,
            "!" => Self::IsNot,
            _ => return None,
        };
        Some(op)
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::GreaterEqualThan => ">=",
            Self::LessThan => "<",
            Self::LessEqualThan => "<=",
            Self::Like => "~",
            Self::NotLike => "!~",
            Self::IsNot => "!",
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::GreaterEqualThan => ">=",
            Self::LessThan => "<",
            Self::LessEqualThan => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::IsNot => "IS NOT",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// 字面量：普通值，或在编译时才求值的 valuer。
#[derive(Debug, Clone)]
pub enum Literal {
    Value(SqlValue),
    Valuer(Box<dyn SqlValuer>),
}

impl Literal {
    pub fn resolve(&self) -> Result<SqlValue, CompileError> {
        match self {
            Self::Value(v) => Ok(v.clone()),
            Self::Valuer(v) => Ok(v.value()?),
        }
    }
}

impl<T: Into<SqlValue>> From<T> for Literal {
    fn from(v: T) -> Self {
        Self::Value(v.into())
    }
}

/// 单个条件值：运算符加字面量。
#[derive(Debug, Clone)]
pub struct Operand {
    pub operator: Operator,
    pub literal: Literal,
}

impl Operand {
    pub fn new(operator: Operator, value: impl Into<SqlValue>) -> Self {
        Self {
            operator,
            literal: Literal::Value(value.into()),
        }
    }

    pub fn valuer(operator: Operator, valuer: impl SqlValuer + 'static) -> Self {
        Self {
            operator,
            literal: Literal::Valuer(Box::new(valuer)),
        }
    }

    /// Parse：识别花括号语法、简单语法，否则整串作为等值字面量。
    pub fn parse(raw: &str) -> Self {
        if let Some((head, tail)) = raw.split_once("{{")
            && let Some(op) = Operator::from_token(head.trim())
        {
            let inner = tail.strip_suffix("}}").unwrap_or(tail);
            return Self::new(op, SqlValue::normalize(inner));
        }

        if let Some((head, tail)) = raw.split_once(' ')
            && let Some(op) = Operator::from_token(head)
        {
            return Self::new(op, SqlValue::normalize(tail));
        }

        Self::new(Operator::Equal, SqlValue::normalize(raw))
    }

    /// Render：返回运算符与值的 SQL 片段（带前导空格），如 `" = 5"`、`" IS NULL"`。
    ///
    /// 传入 `bindings` 时，非 NULL 的字符串类值会被绑定为占位符。
    pub fn render(&self, bindings: Option<&mut Bindings>) -> Result<String, CompileError> {
        if self.operator == Operator::IsNot {
            return Ok(" IS NOT NULL".to_string());
        }

        let value = self.literal.resolve()?;
        if value.is_null() {
            return match self.operator {
                Operator::Equal => Ok(" IS NULL".to_string()),
                Operator::NotEqual => Ok(" IS NOT NULL".to_string()),
                op => Err(CompileError::invalid(format!(
                    "operator `{}` cannot compare against NULL",
                    op.token()
                ))),
            };
        }

        let mut out = String::from(" ");
        out.push_str(self.operator.as_sql());
        out.push(' ');
        match bindings {
            Some(b) if value.needs_binding() => out.push_str(&b.bind(value)),
            _ => value.write_inline(&mut out)?,
        }
        Ok(out)
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Self::parse(v)
    }
}

impl From<String> for Operand {
    fn from(v: String) -> Self {
        Self::parse(&v)
    }
}

impl From<&String> for Operand {
    fn from(v: &String) -> Self {
        Self::parse(v)
    }
}

impl From<SqlValue> for Operand {
    fn from(v: SqlValue) -> Self {
        Self::new(Operator::Equal, v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        Self::new(Operator::Equal, SqlValue::from_option(v))
    }
}

macro_rules! operand_from_typed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Self::new(Operator::Equal, v)
                }
            }
        )*
    };
}

operand_from_typed!(
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    time::OffsetDateTime,
);
