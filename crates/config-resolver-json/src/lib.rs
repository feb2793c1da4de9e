//! JSON 配置解析器
//!
//! 把基础 JSON 配置按用户组匹配的覆盖规则解析为用户专属变体，支持：
//! - 组谓词与自定义布尔表达式两类规则匹配
//! - 点号路径的嵌套属性整值覆盖
//! - 紧凑 JSON 文本或强类型对象两种输出形态

pub mod evaluator;
pub mod expression;
pub mod models;
pub mod patcher;
pub mod service;

pub use config_resolver_api::{ConfigResolver, ConfigResolverError, ExpressionError, Result};
pub use models::{Config, OverrideRule};
pub use service::JsonConfigResolverService;
