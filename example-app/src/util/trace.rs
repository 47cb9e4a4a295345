use component_macros::Component;
use std::fmt;
use uuid::Uuid;

/// 请求追踪标识，每次创建都生成新的 id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl Default for TraceId {
    fn default() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// 每次解析都得到新实例
#[derive(Debug, Default, Component)]
#[component(prototype)]
pub struct RequestTrace {
    id: TraceId,
}

impl RequestTrace {
    pub fn id(&self) -> TraceId {
        self.id
    }
}
