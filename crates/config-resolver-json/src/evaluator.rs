//! 覆盖规则谓词评估
//!
//! 四项谓词按固定顺序做短路逻辑或。顺序只影响求值成本，不影响结果：
//! 仅自定义表达式一项有副作用（调用表达式求值器），前三项命中即可
//! 跳过它。

use std::collections::HashSet;

use config_resolver_api::Result;

use crate::expression;
use crate::models::OverrideRule;

/// 规则谓词评估器
pub struct RuleEvaluator;

impl RuleEvaluator {
    /// 判断规则是否适用于给定用户组
    ///
    /// 评估顺序固定：all-groups、any-group、none-of-the-groups、
    /// custom-expression，先命中者胜。四个字段全部缺失时恒为 false，
    /// 且不会触发表达式求值；表达式求值失败则让整次解析失败。
    pub fn applies(rule: &OverrideRule, user_groups: &HashSet<String>) -> Result<bool> {
        if Self::user_in_all_groups(rule, user_groups) {
            return Ok(true);
        }
        if Self::user_in_any_group(rule, user_groups) {
            return Ok(true);
        }
        if Self::user_in_none_of_the_groups(rule, user_groups) {
            return Ok(true);
        }
        Self::custom_expression_matches(rule, user_groups)
    }

    /// 检查 1: 字段存在且是用户组的子集
    ///
    /// 显式空集合是任何集合的子集，恒命中。
    fn user_in_all_groups(rule: &OverrideRule, user_groups: &HashSet<String>) -> bool {
        rule.user_is_in_all_groups
            .as_ref()
            .is_some_and(|required| required.is_subset(user_groups))
    }

    /// 检查 2: 字段存在且与用户组有交集
    fn user_in_any_group(rule: &OverrideRule, user_groups: &HashSet<String>) -> bool {
        rule.user_is_in_any_group
            .as_ref()
            .is_some_and(|any| !any.is_disjoint(user_groups))
    }

    /// 检查 3: 字段存在且与用户组无交集
    fn user_in_none_of_the_groups(rule: &OverrideRule, user_groups: &HashSet<String>) -> bool {
        rule.user_is_in_none_of_the_groups
            .as_ref()
            .is_some_and(|none| none.is_disjoint(user_groups))
    }

    /// 检查 4: 表达式存在时其布尔结果即检查结果
    fn custom_expression_matches(
        rule: &OverrideRule,
        user_groups: &HashSet<String>,
    ) -> Result<bool> {
        match &rule.custom_expression {
            Some(expr) => Ok(expression::evaluate(expr, user_groups)?),
            None => Ok(false),
        }
    }
}
