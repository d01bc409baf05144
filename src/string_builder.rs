//! 拼接 SQL 文本用的缓冲区，以及"首项不加连接符"的计数器。

#[derive(Debug, Default, Clone)]
pub(crate) struct StringBuilder {
    buf: String,
}

impl StringBuilder {
    pub(crate) fn new() -> Self {
        Self { buf: String::new() }
    }

    /// 写入 `s`；如果不是首次写入，会先写入一个空格。
    pub(crate) fn write_leading(&mut self, s: &str) {
        if !self.buf.is_empty() {
            self.buf.push(' ');
        }
        self.buf.push_str(s);
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    pub(crate) fn write_char(&mut self, c: char) {
        self.buf.push(c);
    }

    pub(crate) fn into_string(self) -> String {
        self.buf
    }
}

/// 连接符计数器：第一次调用 `next` 什么都不写，之后每次先写入分隔符。
#[derive(Debug, Clone, Copy)]
pub(crate) struct Joiner {
    sep: &'static str,
    count: usize,
}

impl Joiner {
    pub(crate) fn new(sep: &'static str) -> Self {
        Self { sep, count: 0 }
    }

    pub(crate) fn next(&mut self, buf: &mut StringBuilder) {
        if self.count > 0 {
            buf.write_str(self.sep);
        }
        self.count += 1;
    }
}
