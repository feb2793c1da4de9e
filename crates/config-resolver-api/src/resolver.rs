//! 配置解析接口定义

use std::collections::HashSet;

use serde::de::DeserializeOwned;

use crate::error::Result;

/// 配置解析器
///
/// 四个解析入口两两成对：是否显式传入配置文本、输出紧凑 JSON 文本
/// 还是绑定到目标类型。无显式输入的调用复用 set_config_to_resolve()
/// 记住的配置。每次解析都是独立的纯计算，互不影响。
pub trait ConfigResolver {
    /// 设置待解析的配置文本，供后续无显式输入的调用复用
    ///
    /// 记住的配置实例级有效、无过期，后写覆盖先写。
    fn set_config_to_resolve(&self, config: impl Into<String>);

    /// 使用已设置的配置解析，输出紧凑 JSON 文本
    fn resolve_config(&self, user_groups: &HashSet<String>) -> Result<String>;

    /// 使用已设置的配置解析，绑定到目标类型
    fn resolve_config_as<T: DeserializeOwned>(&self, user_groups: &HashSet<String>) -> Result<T>;

    /// 解析给定的配置文本，输出紧凑 JSON 文本
    fn resolve_config_from(&self, config: &str, user_groups: &HashSet<String>) -> Result<String>;

    /// 解析给定的配置文本，绑定到目标类型
    fn resolve_config_from_as<T: DeserializeOwned>(
        &self,
        config: &str,
        user_groups: &HashSet<String>,
    ) -> Result<T>;
}
