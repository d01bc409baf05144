//! Bindings：占位符分配与绑定值收集。
//!
//! 每次编译使用一个新的 `Bindings`，不在语句之间共享计数器。

use crate::config::DEFAULT_PLACEHOLDER_TEMPLATE;
use crate::error::CompileError;
use crate::value::SqlValue;
use std::borrow::Cow;

/// 占位符到值的有序映射。
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings {
    template: Cow<'static, str>,
    next_index: usize,
    values: Vec<(String, SqlValue)>,
}

impl Default for Bindings {
    fn default() -> Self {
        Self::new()
    }
}

impl Bindings {
    pub fn new() -> Self {
        Self::with_template(DEFAULT_PLACEHOLDER_TEMPLATE)
    }

    pub fn with_template(template: impl Into<Cow<'static, str>>) -> Self {
        Self {
            template: template.into(),
            next_index: 0,
            values: Vec::new(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Bind：绑定一个值并返回占位符；同一个值（严格相等）重复绑定时复用已有占位符。
    pub fn bind(&mut self, value: SqlValue) -> String {
        if let Some((ph, _)) = self.values.iter().find(|(_, v)| *v == value) {
            tracing::trace!(placeholder = %ph, "reusing placeholder");
            return ph.clone();
        }

        let ph = format!("{}{}", self.template, self.next_index);
        self.next_index += 1;
        tracing::trace!(placeholder = %ph, "minted placeholder");
        self.values.push((ph.clone(), value));
        ph
    }

    pub fn value_of(&self, placeholder: &str) -> Option<&SqlValue> {
        self.values
            .iter()
            .find(|(ph, _)| ph == placeholder)
            .map(|(_, v)| v)
    }

    /// 按分配顺序返回全部绑定。
    pub fn all(&self) -> &[(String, SqlValue)] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.values.iter().map(|(ph, v)| (ph.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reset：清空绑定并把序号归零。
    pub fn reset(&mut self) {
        self.next_index = 0;
        self.values.clear();
    }

    pub fn into_vec(self) -> Vec<(String, SqlValue)> {
        self.values
    }

    /// Interpolate：把 `sql` 中的占位符替换成内联字面量，得到可直接阅读的语句。
    ///
    /// 引号内的内容原样保留；占位符总是按最长的数字后缀匹配。
    /// 插值结果只用于日志与调试，执行时应当使用绑定参数。
    pub fn interpolate(&self, sql: &str) -> Result<String, CompileError> {
        let template = self.template.as_ref();
        let mut out = String::with_capacity(sql.len() + self.values.len() * 16);
        let mut quote: Option<char> = None;
        let mut escaping = false;
        let mut i = 0usize;

        while i < sql.len() {
            let rest = &sql[i..];
            let Some(c) = rest.chars().next() else {
                break;
            };

            if escaping {
                out.push(c);
                escaping = false;
                i += c.len_utf8();
                continue;
            }

            match c {
                '\\' if quote.is_some() => {
                    out.push(c);
                    escaping = true;
                }
                '\'' | '"' | '`' => {
                    if quote == Some(c) {
                        quote = None;
                    } else if quote.is_none() {
                        quote = Some(c);
                    }
                    out.push(c);
                }
                _ if quote.is_none() && !template.is_empty() && rest.starts_with(template) => {
                    let digits = rest[template.len()..]
                        .bytes()
                        .take_while(u8::is_ascii_digit)
                        .count();
                    if digits == 0 {
                        out.push(c);
                    } else {
                        let ph = &rest[..template.len() + digits];
                        let value = self
                            .value_of(ph)
                            .ok_or_else(|| CompileError::UnboundPlaceholder(ph.to_string()))?;
                        value.write_inline(&mut out)?;
                        i += ph.len();
                        continue;
                    }
                }
                _ => out.push(c),
            }
            i += c.len_utf8();
        }

        Ok(out)
    }
}
