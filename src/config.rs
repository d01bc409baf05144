//! 编译器配置：占位符模板、FULL JOIN 关键字、空列选择器策略。
//!
//! 进程级默认值可以被替换；`Compiler` 在构造时复制一份，之后不再读取全局状态。

use std::borrow::Cow;
use std::fmt;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// 默认占位符模板，生成 `:param0`、`:param1` ...
pub const DEFAULT_PLACEHOLDER_TEMPLATE: &str = ":param";

/// FULL JOIN 在不同目标方言中的写法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FullJoinKeyword {
    #[default]
    Full,
    FullOuter,
}

impl FullJoinKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "FULL JOIN",
            Self::FullOuter => "FULL OUTER JOIN",
        }
    }
}

/// 列选择器为空时的策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EmptyColumns {
    /// 输出 `*`。
    #[default]
    Wildcard,
    /// 返回 `UnsupportedFeature`：行映射需要知道每一列的来源表。
    Reject,
}

/// 编译器配置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub placeholder_template: Cow<'static, str>,
    pub full_join: FullJoinKeyword,
    pub empty_columns: EmptyColumns,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            placeholder_template: Cow::Borrowed(DEFAULT_PLACEHOLDER_TEMPLATE),
            full_join: FullJoinKeyword::default(),
            empty_columns: EmptyColumns::default(),
        }
    }
}

impl Config {
    pub fn placeholder_template(mut self, template: impl Into<Cow<'static, str>>) -> Self {
        self.placeholder_template = template.into();
        self
    }

    pub fn full_join(mut self, keyword: FullJoinKeyword) -> Self {
        self.full_join = keyword;
        self
    }

    pub fn empty_columns(mut self, policy: EmptyColumns) -> Self {
        self.empty_columns = policy;
        self
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "placeholder={}N full_join={} empty_columns={:?}",
            self.placeholder_template,
            self.full_join.as_str(),
            self.empty_columns
        )
    }
}

static DEFAULT_CONFIG: OnceLock<Mutex<Config>> = OnceLock::new();
static DEFAULT_CONFIG_LOCK: Mutex<()> = Mutex::new(());

fn config_cell() -> &'static Mutex<Config> {
    DEFAULT_CONFIG.get_or_init(|| Mutex::new(Config::default()))
}

/// 获取当前进程级默认配置。
pub fn default_config() -> Config {
    config_cell()
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// 设置进程级默认配置，返回旧值。
pub fn set_default_config(config: Config) -> Config {
    let mut g = config_cell().lock().unwrap_or_else(|e| e.into_inner());
    std::mem::replace(&mut *g, config)
}

/// 修改默认配置的 RAII guard（会持有一个全局锁，避免并行测试互相干扰）。
pub struct DefaultConfigGuard {
    _lock: MutexGuard<'static, ()>,
    old: Config,
}

impl Drop for DefaultConfigGuard {
    fn drop(&mut self) {
        let _ = set_default_config(self.old.clone());
    }
}

/// 在一个作用域内临时设置默认配置，并保证退出作用域后自动恢复。
pub fn set_default_config_scoped(config: Config) -> DefaultConfigGuard {
    let lock = DEFAULT_CONFIG_LOCK
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    let old = set_default_config(config);
    DefaultConfigGuard { _lock: lock, old }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scoped_default_is_visible_inside_scope() {
        let _g = set_default_config_scoped(
            Config::default()
                .placeholder_template(":p")
                .full_join(FullJoinKeyword::FullOuter),
        );
        let cfg = default_config();
        assert_eq!(cfg.placeholder_template, ":p");
        assert_eq!(cfg.full_join, FullJoinKeyword::FullOuter);
        assert_eq!(cfg.empty_columns, EmptyColumns::Wildcard);
    }

    #[test]
    fn display_mentions_every_setting() {
        let cfg = Config::default().empty_columns(EmptyColumns::Reject);
        assert_eq!(
            cfg.to_string(),
            "placeholder=:paramN full_join=FULL JOIN empty_columns=Reject"
        );
    }
}
