//! 编译错误分类。

use crate::valuer::ValuerError;

/// 编译阶段的错误：全部是调用方输入的问题，立即返回，不会产生半截 SQL。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// 选择器、条件或选项的形状不合法（类型不对、无法识别的 join/运算符、必填输入为空）。
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// 可以识别但未实现/被配置拒绝的形状。
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error(transparent)]
    Valuer(#[from] ValuerError),
    #[error("placeholder {0} is not bound")]
    UnboundPlaceholder(String),
}

impl CompileError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
