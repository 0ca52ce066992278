use serde_json::Value;

use crate::request::HttpMethod;

/// 一次 API 调用的描述（相对路径 + 查询参数 + 请求体）
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub method: HttpMethod,
    pub path: String,
    pub params: Option<Value>,
    pub data: Option<Value>,
}

impl ApiCall {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        Self {
            method,
            path,
            params: None,
            data: None,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params).filter(|p| !p.is_null());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// 把参数对象编码为查询字符串（含前导 `?`，无参数时为空）
    ///
    /// - `null` 字段跳过
    /// - 数组展开为 `key[]=a&key[]=b`
    /// - 嵌套对象以 JSON 文本传递
    pub fn query_string(&self) -> String {
        let Some(Value::Object(params)) = &self.params else {
            return String::new();
        };

        let mut pairs = Vec::new();
        for (key, value) in params {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    let key = format!("{}[]", key);
                    for item in items.iter().filter(|v| !v.is_null()) {
                        pairs.push(encode_pair(&key, item));
                    }
                }
                other => pairs.push(encode_pair(key, other)),
            }
        }

        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

fn encode_pair(key: &str, value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!(
        "{}={}",
        urlencoding::encode(key),
        urlencoding::encode(&text)
    )
}
