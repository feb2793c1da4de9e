//! 配置树补丁
//!
//! 按点号路径把覆盖值写入 default-properties 树：整值替换，按需创建
//! 中间对象节点。目标不是对象节点时静默跳过，这是刻意的宽容策略，
//! 不作为错误上报。

use serde_json::{Map, Value};

/// 应用一条规则的全部补丁，按补丁映射的声明顺序逐条写入
pub fn apply_override(tree: &mut Value, overrides: &Map<String, Value>) {
    for (path, value) in overrides {
        replace_at_path(tree, path, value.clone());
    }
}

/// 按点号路径替换节点值
///
/// 单段路径对字段做插入或整值覆盖，不做结构合并；多段路径取首段
/// 子节点（缺失则先挂一个空对象）后递归处理剩余路径。中间节点已是
/// 标量或数组时，该路径不产生任何修改。
pub fn replace_at_path(node: &mut Value, path: &str, value: Value) {
    let Value::Object(fields) = node else {
        return;
    };

    match path.split_once('.') {
        None => {
            fields.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = fields
                .entry(head)
                .or_insert_with(|| Value::Object(Map::new()));
            replace_at_path(child, rest, value);
        }
    }
}
