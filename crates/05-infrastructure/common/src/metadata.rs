//! 元数据定义
//!
//! 提供组件和依赖类型的元数据信息

use std::any::TypeId;
use std::fmt;

/// 类型信息
///
/// 同时适用于具体类型和 `dyn Trait` 接口类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型ID
    pub id: TypeId,
    /// 完整类型名称（包含模块路径）
    pub full_name: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            full_name: std::any::type_name::<T>(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径和泛型参数）
    pub fn short_name(&self) -> &'static str {
        let name = self.full_name.trim_start_matches("dyn ");
        let name = name.split('<').next().unwrap_or(name);
        name.rsplit("::").next().unwrap_or(name)
    }

    /// 类型所在的模块路径
    ///
    /// 接口类型 (`dyn Trait`) 同样返回 trait 所在的模块。
    pub fn module_path(&self) -> &'static str {
        let name = self.full_name.trim_start_matches("dyn ");
        let name = name.split('<').next().unwrap_or(name);
        name.rsplit_once("::").map_or("", |(module, _)| module)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name)
    }
}

/// 判断模块路径是否位于扫描根路径之下
pub fn is_within_module(module_path: &str, root: &str) -> bool {
    module_path == root
        || module_path
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with("::"))
}

/// 验证模块路径是否由合法的标识符组成
pub fn is_valid_module_path(path: &str) -> bool {
    !path.is_empty() && path.split("::").all(is_valid_identifier)
}

fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first_char) = chars.next() else {
        return false;
    };

    // 第一个字符必须是字母或下划线
    if !first_char.is_alphabetic() && first_char != '_' {
        return false;
    }

    chars.all(|ch| ch.is_alphanumeric() || ch == '_')
}
