//! 约定规范定义
//!
//! 根据类型名称识别组件并推断生命周期

use crate::lifecycle::Lifetime;
use crate::metadata::TypeInfo;

/// 约定规则
#[derive(Debug, Clone)]
pub struct ConventionRule {
    /// 名称模式，支持一个 `*` 通配符
    pub pattern: String,
    /// 默认生命周期
    pub lifetime: Lifetime,
    /// 匹配的类型是否作为组件候选
    pub discovers: bool,
    /// 优先级
    pub priority: i32,
}

impl ConventionRule {
    /// 创建新的约定规则
    pub fn new(pattern: impl Into<String>, lifetime: Lifetime) -> Self {
        Self {
            pattern: pattern.into(),
            lifetime,
            discovers: true,
            priority: 0,
        }
    }

    /// 仅用于推断生命周期，不把匹配的类型当作组件
    pub fn lifetime_only(mut self) -> Self {
        self.discovers = false;
        self
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 检查类型是否匹配此规则
    pub fn matches(&self, type_info: &TypeInfo) -> bool {
        self.pattern_matches(type_info.short_name())
    }

    /// 检查模式是否匹配
    fn pattern_matches(&self, name: &str) -> bool {
        match self.pattern.split_once('*') {
            Some((prefix, suffix)) => {
                name.len() >= prefix.len() + suffix.len()
                    && name.starts_with(prefix)
                    && name.ends_with(suffix)
            }
            None => name == self.pattern,
        }
    }
}

/// 组件约定规范
#[derive(Debug, Clone)]
pub struct ComponentConventions {
    rules: Vec<ConventionRule>,
}

impl ComponentConventions {
    /// 创建包含默认约定的规范
    pub fn new() -> Self {
        let mut conventions = Self::empty();
        conventions.register_default_conventions();
        conventions
    }

    /// 创建不含任何规则的规范
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// 注册默认约定
    fn register_default_conventions(&mut self) {
        for pattern in ["*Controller", "*Service", "*Repository", "*Dao"] {
            self.add_convention(ConventionRule::new(pattern, Lifetime::Singleton).with_priority(90));
        }

        for pattern in ["*Mapper", "*Parser"] {
            self.add_convention(ConventionRule::new(pattern, Lifetime::Singleton).with_priority(80));
        }

        // 命令和请求对象每次都重新创建
        for pattern in ["*Command", "*Request"] {
            self.add_convention(
                ConventionRule::new(pattern, Lifetime::Prototype)
                    .lifetime_only()
                    .with_priority(70),
            );
        }
    }

    /// 添加约定规则
    pub fn add_convention(&mut self, rule: ConventionRule) {
        self.rules.push(rule);
        // 按优先级排序
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// 获取所有约定规则
    pub fn get_convention_rules(&self) -> &[ConventionRule] {
        &self.rules
    }

    /// 根据类型查找匹配的规则
    pub fn find_rule_by_type(&self, type_info: &TypeInfo) -> Option<&ConventionRule> {
        self.rules.iter().find(|rule| rule.matches(type_info))
    }

    /// 按命名约定判断类型是否为组件候选
    pub fn is_candidate(&self, type_info: &TypeInfo) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.discovers && rule.matches(type_info))
    }

    /// 推断类型的生命周期
    pub fn infer_lifetime(&self, type_info: &TypeInfo) -> Option<Lifetime> {
        self.find_rule_by_type(type_info).map(|rule| rule.lifetime)
    }
}

impl Default for ComponentConventions {
    fn default() -> Self {
        Self::new()
    }
}
