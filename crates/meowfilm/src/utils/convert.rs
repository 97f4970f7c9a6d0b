//! 宽松的 JSON 解析工具。
//!
//! 数据库里保存的 JSON 文本可能来自旧版本或被手工修改过，这里的函数从不返回错误，
//! 解析失败时退化为空结构并记录警告。

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

/// 解析 JSON 对象，空文本或格式错误时返回空对象
pub fn parse_json_object(text: &str) -> Map<String, Value> {
    if text.trim().is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(Value::Null) => Map::new(),
        Ok(other) => {
            warn!("期望 JSON 对象，实际为 {}，按空对象处理", json_kind(&other));
            Map::new()
        }
        Err(e) => {
            warn!("解析 JSON 对象失败: {}，按空对象处理", e);
            Map::new()
        }
    }
}

/// 解析 JSON 数组，空文本或格式错误时返回空数组
pub fn parse_json_array(text: &str) -> Vec<Value> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(list)) => list,
        Ok(Value::Null) => Vec::new(),
        Ok(other) => {
            warn!("期望 JSON 数组，实际为 {}，按空数组处理", json_kind(&other));
            Vec::new()
        }
        Err(e) => {
            warn!("解析 JSON 数组失败: {}，按空数组处理", e);
            Vec::new()
        }
    }
}

/// 解析 `{key: bool}` 映射。
///
/// 值可以是布尔、字符串 `"1"`/`"true"`（不区分大小写）或非零数字，其它类型一律视为 `false`。
pub fn bool_map_from_json(text: &str) -> BTreeMap<String, bool> {
    parse_json_object(text)
        .into_iter()
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| {
            let flag = match &v {
                Value::Bool(b) => *b,
                Value::String(s) => {
                    let s = s.trim();
                    s == "1" || s.eq_ignore_ascii_case("true")
                }
                Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
                _ => false,
            };
            (k, flag)
        })
        .collect()
}

/// 解析字符串数组：只保留非空字符串，去除首尾空白并按首次出现去重
pub fn string_array_from_json(text: &str) -> Vec<String> {
    dedup_strings(parse_json_array(text).iter().filter_map(Value::as_str))
}

/// 解析 `{key: string}` 映射，丢弃空键与空值
pub fn string_map_from_json(text: &str) -> BTreeMap<String, String> {
    parse_json_object(text)
        .into_iter()
        .filter_map(|(k, v)| {
            let key = k.trim();
            let value = v.as_str()?.trim();
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// 去除空白、丢弃空串并按首次出现去重
pub fn dedup_strings<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.trim();
        if item.is_empty() || !seen.insert(item) {
            continue;
        }
        out.push(item.to_string());
    }
    out
}

/// 宽松布尔：布尔、数字（非零为真）、常见的真假字符串，其余返回 `None`
pub fn loose_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// 宽松整数：数字与数字字符串向下取整，布尔转为 0/1
pub fn int_from_value_floor(value: &Value) -> Option<i64> {
    let f = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            n.as_f64()?
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        Value::Bool(b) => return Some(i64::from(*b)),
        _ => return None,
    };
    if !f.is_finite() {
        return None;
    }
    Some(f.floor() as i64)
}

/// 数组或 JSON 字符串形式的字符串列表
pub fn string_array_from_value(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(list) => Some(
            list.iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Value::String(s) => Some(string_array_from_json(s)),
        _ => None,
    }
}

/// 标量转字符串，对象与数组返回空串
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// 用于请求体字段的宽松布尔反序列化，无法识别的值视为缺失
pub fn deserialize_loose_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(loose_bool))
}

/// 用于请求体字段的宽松字符串反序列化：去除首尾空白，非字符串视为空串
pub fn deserialize_loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    })
}

/// 将任意可序列化值转为紧凑 JSON 文本
pub fn to_json_string<T: serde::Serialize + ?Sized>(value: &T) -> String {
    // 只用于 BTreeMap / Vec 等不会失败的结构
    serde_json::to_string(value).unwrap_or_default()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "布尔",
        Value::Number(_) => "数字",
        Value::String(_) => "字符串",
        Value::Array(_) => "数组",
        Value::Object(_) => "对象",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_bool_map_accepts_loose_values() {
        let map = bool_map_from_json(r#"{"a":true,"b":"1","c":"TRUE","d":0,"e":2,"f":null,"g":"no","":true}"#);
        assert_eq!(map.get("a"), Some(&true));
        assert_eq!(map.get("b"), Some(&true));
        assert_eq!(map.get("c"), Some(&true));
        assert_eq!(map.get("d"), Some(&false));
        assert_eq!(map.get("e"), Some(&true));
        assert_eq!(map.get("f"), Some(&false));
        assert_eq!(map.get("g"), Some(&false));
        // 空键被丢弃
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn test_malformed_json_degrades_to_empty() {
        assert!(bool_map_from_json("{not json").is_empty());
        assert!(bool_map_from_json("[1,2]").is_empty());
        assert!(string_array_from_json("{}").is_empty());
        assert!(string_map_from_json("").is_empty());
    }

    #[test]
    fn test_string_array_trims_and_dedups() {
        let list = string_array_from_json(r#"[" a ", "b", 3, "", "a", null, "c"]"#);
        assert_eq!(list, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dedup_strings_large_input() {
        let items: Vec<String> = (0..20_000).map(|i| format!("k{}", i % 5_000)).collect();
        let out = dedup_strings(items.iter().map(String::as_str));
        assert_eq!(out.len(), 5_000);
        assert_eq!(out[0], "k0");
        assert_eq!(out[4_999], "k4999");
    }

    #[test]
    fn test_loose_string_fields() {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default, deserialize_with = "deserialize_loose_string")]
            name: String,
        }
        let body: Body = serde_json::from_value(json!({ "name": "  喵  " })).unwrap();
        assert_eq!(body.name, "喵");
        for value in [json!(1), json!(null), json!(["a"]), json!({ "a": 1 })] {
            let body: Body = serde_json::from_value(json!({ "name": value })).unwrap();
            assert_eq!(body.name, "");
        }
        let body: Body = serde_json::from_value(json!({})).unwrap();
        assert_eq!(body.name, "");
    }

    #[test]
    fn test_string_map_drops_empty_values() {
        let map = string_map_from_json(r#"{" a ":" 超时 ","b":"","c":1}"#);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a").map(String::as_str), Some("超时"));
    }

    #[test]
    fn test_int_from_value_floor() {
        assert_eq!(int_from_value_floor(&json!(3)), Some(3));
        assert_eq!(int_from_value_floor(&json!(3.9)), Some(3));
        assert_eq!(int_from_value_floor(&json!(-1.5)), Some(-2));
        assert_eq!(int_from_value_floor(&json!(" 12 ")), Some(12));
        assert_eq!(int_from_value_floor(&json!(true)), Some(1));
        assert_eq!(int_from_value_floor(&json!("abc")), None);
        assert_eq!(int_from_value_floor(&json!(null)), None);
    }

    #[test]
    fn test_loose_bool() {
        assert_eq!(loose_bool(&json!(true)), Some(true));
        assert_eq!(loose_bool(&json!("off")), Some(false));
        assert_eq!(loose_bool(&json!(0)), Some(false));
        assert_eq!(loose_bool(&json!("maybe")), None);
        assert_eq!(loose_bool(&json!([])), None);
    }

    #[test]
    fn test_string_array_from_value_accepts_json_text() {
        assert_eq!(
            string_array_from_value(&json!(r#"["x","y","x"]"#)),
            Some(vec!["x".to_string(), "y".to_string()])
        );
        assert_eq!(
            string_array_from_value(&json!([" x ", 1, "y"])),
            Some(vec!["x".to_string(), "y".to_string()])
        );
        assert_eq!(string_array_from_value(&json!(5)), None);
    }
}
