//! SQL 字面量类型：内联渲染、数字/NULL 归一化与字面量回读。

use crate::error::CompileError;
use std::borrow::Cow;
use time::macros::format_description;

/// SQL 字面量。
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(Cow<'static, str>),
    Bytes(Vec<u8>),
    DateTime(time::OffsetDateTime),
}

impl SqlValue {
    /// 将 `Option<T>` 映射为 `SqlValue`：`None => Null`，`Some(v) => v.into()`。
    pub fn from_option<T: Into<SqlValue>>(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// 数字、布尔与 NULL 永远内联，其余类型在占位符模式下需要绑定。
    pub fn needs_binding(&self) -> bool {
        matches!(self, Self::String(_) | Self::Bytes(_) | Self::DateTime(_))
    }

    /// 文本归一化：数字串变成数字，大小写无关的 `null` 变成 NULL，其余保持字符串。
    pub fn normalize(text: &str) -> Self {
        if text.eq_ignore_ascii_case("null") {
            return Self::Null;
        }
        if let Some(n) = parse_number(text) {
            return n;
        }
        Self::String(Cow::Owned(text.to_string()))
    }

    /// 内联渲染：字符串使用双引号，数字保持裸值。
    pub fn to_inline(&self) -> Result<String, CompileError> {
        let mut out = String::new();
        self.write_inline(&mut out)?;
        Ok(out)
    }

    pub(crate) fn write_inline(&self, out: &mut String) -> Result<(), CompileError> {
        match self {
            Self::Null => out.push_str("NULL"),
            Self::Bool(b) => out.push_str(if *b { "TRUE" } else { "FALSE" }),
            Self::I64(n) => out.push_str(&n.to_string()),
            Self::U64(n) => out.push_str(&n.to_string()),
            Self::F64(n) => {
                if !n.is_finite() {
                    return Err(CompileError::InvalidArgument(format!(
                        "non-finite number {n} has no SQL literal"
                    )));
                }
                let text = n.to_string();
                out.push_str(&text);
                // 整数值的浮点数要保留小数部分，否则读回时会变成整数。
                if !text.contains('.') {
                    out.push_str(".0");
                }
            }
            Self::String(s) => quote_string(out, s),
            Self::Bytes(b) => {
                out.push_str("X'");
                push_hex(out, b);
                out.push('\'');
            }
            Self::DateTime(dt) => {
                let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
                let s = dt.format(&fmt).map_err(|e| {
                    CompileError::InvalidArgument(format!("datetime is not printable: {e}"))
                })?;
                quote_string(out, &s);
            }
        }
        Ok(())
    }
}

fn parse_number(text: &str) -> Option<SqlValue> {
    let body = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (mantissa, exponent) = match body.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (body, None),
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (mantissa, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || fraction.is_some_and(|f| !all_digits(f)) {
        return None;
    }
    if let Some(exp) = exponent {
        if !all_digits(exp.strip_prefix(['-', '+']).unwrap_or(exp)) {
            return None;
        }
    } else if fraction.is_none() {
        if let Ok(n) = text.parse::<i64>() {
            return Some(SqlValue::I64(n));
        }
        if let Ok(n) = text.parse::<u64>() {
            return Some(SqlValue::U64(n));
        }
    }
    text.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(SqlValue::F64)
}

fn quote_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0000}' => out.push_str("\\0"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

fn push_hex(out: &mut String, data: &[u8]) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    for &b in data {
        out.push(HEX[((b >> 4) & 0xF) as usize] as char);
        out.push(HEX[(b & 0xF) as usize] as char);
    }
}

/// 把内联渲染出的字面量文本读回 `SqlValue`（去引号、数字归一化）。
///
/// datetime 会以字符串形式读回。
pub fn parse_literal(text: &str) -> Result<SqlValue, CompileError> {
    let t = text.trim();
    if t.eq_ignore_ascii_case("null") {
        return Ok(SqlValue::Null);
    }
    if t.eq_ignore_ascii_case("true") {
        return Ok(SqlValue::Bool(true));
    }
    if t.eq_ignore_ascii_case("false") {
        return Ok(SqlValue::Bool(false));
    }
    if let Some(inner) = t.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return unquote(inner).map(|s| SqlValue::String(Cow::Owned(s)));
    }
    if let Some(hex) = t.strip_prefix("X'").and_then(|s| s.strip_suffix('\'')) {
        return decode_hex(hex).map(SqlValue::Bytes);
    }
    parse_number(t)
        .ok_or_else(|| CompileError::InvalidArgument(format!("`{text}` is not a SQL literal")))
}

fn unquote(inner: &str) -> Result<String, CompileError> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '"' {
            return Err(CompileError::InvalidArgument(
                "unescaped quote inside string literal".to_string(),
            ));
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\u{0000}'),
            Some(other) => out.push(other),
            None => {
                return Err(CompileError::InvalidArgument(
                    "dangling escape in string literal".to_string(),
                ));
            }
        }
    }
    Ok(out)
}

fn decode_hex(hex: &str) -> Result<Vec<u8>, CompileError> {
    if !hex.is_ascii() {
        return Err(CompileError::InvalidArgument(format!(
            "invalid hex literal X'{hex}'"
        )));
    }
    if hex.len() % 2 != 0 {
        return Err(CompileError::InvalidArgument(format!(
            "odd-length hex literal X'{hex}'"
        )));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| {
                CompileError::InvalidArgument(format!("invalid hex literal X'{hex}'"))
            })
        })
        .collect()
}

impl From<()> for SqlValue {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for SqlValue {
    fn from(v: i8) -> Self {
        Self::I64(v as i64)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        Self::I64(v as i64)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::I64(v as i64)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<u8> for SqlValue {
    fn from(v: u8) -> Self {
        Self::U64(v as u64)
    }
}

impl From<u16> for SqlValue {
    fn from(v: u16) -> Self {
        Self::U64(v as u64)
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        Self::U64(v as u64)
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        Self::F64(v as f64)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::String(Cow::Owned(v))
    }
}

impl From<&'static str> for SqlValue {
    fn from(v: &'static str) -> Self {
        Self::String(Cow::Borrowed(v))
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<time::OffsetDateTime> for SqlValue {
    fn from(v: time::OffsetDateTime) -> Self {
        Self::DateTime(v)
    }
}
