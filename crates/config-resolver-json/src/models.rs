//! 配置文档数据模型
//!
//! 定义覆盖规则与配置文档的线上格式（kebab-case 键名）。解析完成后
//! 规则列表只读，default-properties 作为所有补丁的作用目标可变。

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// 配置文档：覆盖规则列表 + 默认属性树
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 覆盖规则，按声明顺序依次评估；缺失或为 null 视为空列表
    #[serde(
        rename = "override-rules",
        default,
        deserialize_with = "null_as_empty_rules"
    )]
    pub override_rules: Vec<OverrideRule>,

    /// 默认属性树，缺失该字段视为文档结构不合法
    #[serde(rename = "default-properties")]
    pub default_properties: Value,
}

/// 覆盖规则：组谓词 + 点号路径补丁
///
/// 谓词字段缺失与显式空集合语义不同：空的 user-is-in-all-groups
/// 对任意用户都成立（空集是任何集合的子集），而四个字段全部缺失的
/// 规则永不适用。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideRule {
    /// 用户须同时属于全部给定组
    #[serde(
        rename = "user-is-in-all-groups",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub user_is_in_all_groups: Option<HashSet<String>>,

    /// 用户属于任一给定组即可
    #[serde(
        rename = "user-is-in-any-group",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub user_is_in_any_group: Option<HashSet<String>>,

    /// 用户不属于任何给定组
    #[serde(
        rename = "user-is-none-of-the-groups",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub user_is_in_none_of_the_groups: Option<HashSet<String>>,

    /// 自定义布尔表达式，求值时变量 user 绑定为用户组集合
    #[serde(
        rename = "custom-expression",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_expression: Option<String>,

    /// 点号路径 -> 覆盖值，按文档声明顺序应用
    #[serde(rename = "override", default)]
    pub overrides: Map<String, Value>,
}

/// override-rules 显式为 null 时按空列表处理
fn null_as_empty_rules<'de, D>(deserializer: D) -> Result<Vec<OverrideRule>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<OverrideRule>>::deserialize(deserializer)?.unwrap_or_default())
}
