//! 配置解析器公共契约
//!
//! 定义按用户组解析配置的接口与统一错误类型，
//! 具体的 JSON 实现见 config-resolver-json。

pub mod error;
pub mod resolver;

pub use error::{ConfigResolverError, ExpressionError, Result};
pub use resolver::ConfigResolver;
