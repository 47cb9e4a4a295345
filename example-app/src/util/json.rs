use anyhow::{Context, Result};
use component_macros::Component;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// JSON 编解码工具
#[derive(Debug, Default, Component)]
pub struct JsonParser;

impl JsonParser {
    pub fn parse<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        serde_json::from_str(text).context("无法解析请求 JSON")
    }

    pub fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        serde_json::to_string(value).context("无法序列化响应")
    }
}
