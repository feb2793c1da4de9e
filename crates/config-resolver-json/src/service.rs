//! JSON 配置解析服务
//!
//! 解析引擎与对外门面：解析输入文档，按声明顺序对每条适用规则应用
//! 补丁，再把结果树转换为调用方要求的输出形态。同时维护可复用的
//! "待解析配置"状态，供无显式输入的调用使用。

use std::collections::HashSet;

use config_resolver_api::{ConfigResolver, ConfigResolverError, Result};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::evaluator::RuleEvaluator;
use crate::models::Config;
use crate::patcher;

/// JSON 配置解析服务
///
/// 唯一的实例状态是记住的待解析配置文本，由互斥锁保护，后写覆盖
/// 先写；并发的 set 与 resolve 交错时按最后一次写入为准。单次解析
/// 之间不共享任何可变状态。
pub struct JsonConfigResolverService {
    /// set_config_to_resolve() 记住的配置文本
    config_to_resolve: Mutex<Option<String>>,
}

impl JsonConfigResolverService {
    /// 创建新的解析服务
    pub fn new() -> Self {
        Self {
            config_to_resolve: Mutex::new(None),
        }
    }

    /// 取出记住的配置文本，未设置时报 MissingInput
    fn remembered_config(&self) -> Result<String> {
        self.config_to_resolve
            .lock()
            .clone()
            .ok_or(ConfigResolverError::MissingInput)
    }

    /// 核心流水线：解析文档 -> 逐条应用适用规则 -> 返回结果树
    ///
    /// 补丁原地修改 default-properties，不做回滚：后续规则失败时结果
    /// 树随错误一起被丢弃，部分应用的补丁对外不可见。
    #[instrument(skip(self, config), fields(groups = user_groups.len()))]
    fn resolve_tree(&self, config: &str, user_groups: &HashSet<String>) -> Result<Value> {
        let document: Config =
            serde_json::from_str(config).map_err(ConfigResolverError::MalformedInput)?;

        let Config {
            override_rules,
            mut default_properties,
        } = document;

        for (index, rule) in override_rules.iter().enumerate() {
            if RuleEvaluator::applies(rule, user_groups)? {
                debug!(
                    rule = index,
                    patches = rule.overrides.len(),
                    "覆盖规则匹配，应用补丁"
                );
                patcher::apply_override(&mut default_properties, &rule.overrides);
            }
        }

        Ok(default_properties)
    }
}

impl ConfigResolver for JsonConfigResolverService {
    fn set_config_to_resolve(&self, config: impl Into<String>) {
        *self.config_to_resolve.lock() = Some(config.into());
    }

    fn resolve_config(&self, user_groups: &HashSet<String>) -> Result<String> {
        self.resolve_config_from(&self.remembered_config()?, user_groups)
    }

    fn resolve_config_as<T: DeserializeOwned>(&self, user_groups: &HashSet<String>) -> Result<T> {
        self.resolve_config_from_as(&self.remembered_config()?, user_groups)
    }

    fn resolve_config_from(&self, config: &str, user_groups: &HashSet<String>) -> Result<String> {
        let resolved = self.resolve_tree(config, user_groups)?;
        serde_json::to_string(&resolved).map_err(ConfigResolverError::Binding)
    }

    fn resolve_config_from_as<T: DeserializeOwned>(
        &self,
        config: &str,
        user_groups: &HashSet<String>,
    ) -> Result<T> {
        let resolved = self.resolve_tree(config, user_groups)?;
        serde_json::from_value(resolved).map_err(ConfigResolverError::Binding)
    }
}

impl Default for JsonConfigResolverService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    const SIMPLE_CONFIG: &str = r#"
    {
        "override-rules": [
            {
                "user-is-in-all-groups": ["group-a", "group-b"],
                "override": {"x": true}
            }
        ],
        "default-properties": {"x": false, "y": 1}
    }
    "#;

    #[test]
    fn test_rule_applies_when_user_in_all_groups() {
        let service = JsonConfigResolverService::new();
        let resolved = service
            .resolve_config_from(SIMPLE_CONFIG, &groups(&["group-a", "group-b"]))
            .unwrap();
        assert_eq!(resolved, r#"{"x":true,"y":1}"#);
    }

    #[test]
    fn test_rule_skipped_when_group_missing() {
        let service = JsonConfigResolverService::new();
        let resolved = service
            .resolve_config_from(SIMPLE_CONFIG, &groups(&["group-a"]))
            .unwrap();
        assert_eq!(resolved, r#"{"x":false,"y":1}"#);
    }

    #[test]
    fn test_missing_input_on_fresh_service() {
        let service = JsonConfigResolverService::new();
        let err = service.resolve_config(&groups(&["group-a"])).unwrap_err();
        assert!(matches!(err, ConfigResolverError::MissingInput));
        assert_eq!(err.code(), "MISSING_INPUT");
    }

    #[test]
    fn test_remembered_config_is_reused() {
        let service = JsonConfigResolverService::new();
        service.set_config_to_resolve(SIMPLE_CONFIG);

        let first = service.resolve_config(&groups(&["group-a", "group-b"])).unwrap();
        let second = service.resolve_config(&groups(&["group-a", "group-b"])).unwrap();
        assert_eq!(first, r#"{"x":true,"y":1}"#);
        assert_eq!(first, second);
    }

    #[test]
    fn test_set_config_overwrites_previous() {
        let service = JsonConfigResolverService::new();
        service.set_config_to_resolve(r#"{"default-properties": {"v": 1}}"#);
        service.set_config_to_resolve(r#"{"default-properties": {"v": 2}}"#);

        let resolved = service.resolve_config(&groups(&[])).unwrap();
        assert_eq!(resolved, r#"{"v":2}"#);
    }

    #[test]
    fn test_malformed_input_is_wrapped() {
        let service = JsonConfigResolverService::new();
        let err = service
            .resolve_config_from("not json at all", &groups(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigResolverError::MalformedInput(_)));
        assert_eq!(err.code(), "MALFORMED_INPUT");
    }
}
