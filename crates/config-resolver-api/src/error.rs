//! 配置解析统一错误类型
//!
//! 解析过程中任一环节的失败都收敛为一个错误类型，使用 thiserror
//! 携带底层原因。所有失败对该次调用都是终态，不做重试，也不返回
//! 部分结果。

use thiserror::Error;

/// 配置解析错误
#[derive(Debug, Error)]
pub enum ConfigResolverError {
    /// 输入不是合法 JSON，或顶层结构不符合约定
    #[error("配置解析失败: {0}")]
    MalformedInput(#[source] serde_json::Error),

    /// 自定义表达式解析或求值失败
    #[error("自定义表达式求值失败: {0}")]
    Expression(#[from] ExpressionError),

    /// 解析结果无法绑定到目标类型
    #[error("目标类型绑定失败: {0}")]
    Binding(#[source] serde_json::Error),

    /// 有状态调用未设置待解析配置
    #[error("待解析配置未设置，请先调用 set_config_to_resolve() 设置配置")]
    MissingInput,
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, ConfigResolverError>;

impl ConfigResolverError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "MALFORMED_INPUT",
            Self::Expression(_) => "EXPRESSION_ERROR",
            Self::Binding(_) => "BINDING_ERROR",
            Self::MissingInput => "MISSING_INPUT",
        }
    }
}

/// 自定义表达式错误
///
/// 表达式的词法或语法不在支持的子集内时产生，子集的定义见
/// config-resolver-json 的 expression 模块。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    /// 无法识别的记号
    #[error("表达式位置 {pos} 处存在无法识别的记号: '{fragment}'")]
    UnrecognizedToken { pos: usize, fragment: String },

    /// 记号不符合语法
    #[error("表达式位置 {pos} 处遇到非预期的 '{token}'")]
    UnexpectedToken { pos: usize, token: String },

    /// 表达式在需要操作数或右括号处提前结束
    #[error("表达式不完整，缺少操作数或右括号")]
    UnexpectedEnd,

    /// 完整表达式之后仍有剩余内容
    #[error("表达式位置 {pos} 处之后存在多余内容")]
    TrailingInput { pos: usize },
}
