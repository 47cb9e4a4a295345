//! 组件派生宏实现

use crate::utils::{extract_generic_type, is_option_type, last_segment_is, to_snake_case};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    spanned::Spanned, Attribute, Data, DeriveInput, Error, Fields, Ident, LitStr, Result, Type,
};

/// 组件级参数，来自 `#[component(...)]`
#[derive(Default)]
struct ComponentArgs {
    name: Option<String>,
    lifetime: Option<ComponentLifetime>,
    disabled: bool,
    provides: Vec<Type>,
    setters: Vec<SetterPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComponentLifetime {
    Singleton,
    Prototype,
}

impl ComponentLifetime {
    fn parse(lit: &LitStr) -> Result<Self> {
        match lit.value().to_ascii_lowercase().as_str() {
            "singleton" => Ok(Self::Singleton),
            "prototype" | "transient" => Ok(Self::Prototype),
            other => Err(Error::new(
                lit.span(),
                format!("未知的生命周期 `{other}`，可选值: singleton, prototype"),
            )),
        }
    }

    fn tokens(self) -> TokenStream2 {
        match self {
            Self::Singleton => quote! { ::infrastructure_common::Lifetime::Singleton },
            Self::Prototype => quote! { ::infrastructure_common::Lifetime::Prototype },
        }
    }
}

/// `optional` 与 `qualifier = "..."` 选项
#[derive(Default)]
struct InjectOptions {
    optional: bool,
    qualifier: Option<String>,
}

impl InjectOptions {
    fn expr(&self, member: &str) -> TokenStream2 {
        let mut expr = quote! { ::infrastructure_common::Inject::new(#member) };
        if self.optional {
            expr = quote! { #expr.optional() };
        }
        if let Some(qualifier) = &self.qualifier {
            expr = quote! { #expr.qualifier(#qualifier) };
        }
        expr
    }
}

struct SetterPoint {
    method: Ident,
    ty: Type,
    options: InjectOptions,
}

enum FieldRole {
    /// `#[inject]` 字段，由构造器参数填充
    Constructor {
        ty: Type,
        optional: bool,
        options: InjectOptions,
    },
    /// `#[autowired]` 字段，实例创建后注入
    Autowired { ty: Type, options: InjectOptions },
    /// 普通字段，使用 `Default`
    Plain,
}

struct ComponentField {
    ident: Ident,
    role: FieldRole,
}

/// 实现 `#[derive(Component)]`
pub fn derive_component_impl(input: DeriveInput) -> TokenStream {
    expand(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> Result<TokenStream2> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "组件不能带有泛型参数",
        ));
    }

    let args = parse_component_args(&input.attrs)?;
    let fields = parse_fields(input)?;

    let name = args.name.as_ref().map(|name| quote! { .name(#name) });
    let lifetime = args.lifetime.map(|lifetime| {
        let lifetime = lifetime.tokens();
        quote! { .lifetime(#lifetime) }
    });
    let disabled = args.disabled.then(|| quote! { .disabled() });

    let mut constructor_points = Vec::new();
    let mut field_points = Vec::new();
    for field in fields.iter().flatten() {
        let member = field.ident.to_string();
        let ident = &field.ident;
        match &field.role {
            FieldRole::Constructor { ty, options, .. } => {
                let inject = options.expr(&member);
                constructor_points.push(quote! { .constructor_arg::<#ty>(#inject) });
            }
            FieldRole::Autowired { ty, options } => {
                let inject = options.expr(&member);
                field_points.push(quote! {
                    .field::<#ty, _>(#inject, |component| &component.#ident)
                });
            }
            FieldRole::Plain => {}
        }
    }

    let setter_points = args.setters.iter().map(|setter| {
        let SetterPoint {
            method,
            ty,
            options,
        } = setter;
        let inject = options.expr(&method.to_string());
        quote! {
            .setter::<#ty, _>(#inject, |component, dependency| component.#method(dependency))
        }
    });

    let provides = args.provides.iter().map(|ty| {
        quote! {
            .provides::<#ty, _>(|component| -> ::std::sync::Arc<#ty> { component })
        }
    });

    let construct = constructor_body(fields.as_deref());
    let args_ident = if constructor_points.is_empty() {
        format_ident!("_args")
    } else {
        format_ident!("args")
    };

    let register_fn = format_ident!(
        "__autowire_register_{}",
        to_snake_case(&struct_name.to_string())
    );

    Ok(quote! {
        impl ::infrastructure_common::Component for #struct_name {
            fn descriptor() -> ::infrastructure_common::ComponentDescriptor {
                ::infrastructure_common::ComponentDescriptor::builder::<Self>()
                    #name
                    .module_path(::core::module_path!())
                    .marked()
                    #lifetime
                    #disabled
                    #(#constructor_points)*
                    #(#field_points)*
                    #(#setter_points)*
                    #(#provides)*
                    .build(|#args_ident| ::core::result::Result::Ok(#construct))
            }
        }

        // 程序启动时登记到全局组件目录
        #[::ctor::ctor]
        fn #register_fn() {
            ::infrastructure_common::register_component::<#struct_name>();
        }
    })
}

fn constructor_body(fields: Option<&[ComponentField]>) -> TokenStream2 {
    let Some(fields) = fields else {
        return quote! { Self };
    };

    let initializers = fields.iter().map(|field| {
        let ident = &field.ident;
        match &field.role {
            FieldRole::Constructor {
                ty, optional: true, ..
            } => quote! { #ident: args.next_optional::<#ty>()? },
            FieldRole::Constructor { ty, .. } => quote! { #ident: args.next::<#ty>()? },
            FieldRole::Autowired { .. } | FieldRole::Plain => {
                quote! { #ident: ::core::default::Default::default() }
            }
        }
    });

    quote! { Self { #(#initializers),* } }
}

fn parse_component_args(attrs: &[Attribute]) -> Result<ComponentArgs> {
    let mut args = ComponentArgs::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("component")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let name: LitStr = meta.value()?.parse()?;
                if name.value().trim().is_empty() {
                    return Err(Error::new(name.span(), "组件名称不能为空"));
                }
                args.name = Some(name.value());
            } else if meta.path.is_ident("lifetime") {
                args.lifetime = Some(ComponentLifetime::parse(&meta.value()?.parse()?)?);
            } else if meta.path.is_ident("singleton") {
                args.lifetime = Some(ComponentLifetime::Singleton);
            } else if meta.path.is_ident("prototype") {
                args.lifetime = Some(ComponentLifetime::Prototype);
            } else if meta.path.is_ident("disabled") {
                args.disabled = true;
            } else if meta.path.is_ident("provides") {
                let ty: LitStr = meta.value()?.parse()?;
                args.provides.push(ty.parse()?);
            } else if meta.path.is_ident("setter") {
                args.setters.push(parse_setter(&meta)?);
            } else {
                return Err(meta.error("不支持的 component 参数"));
            }
            Ok(())
        })?;
    }

    Ok(args)
}

/// 解析 `setter(set_xxx = "Type", optional, qualifier = "name")`
fn parse_setter(meta: &syn::meta::ParseNestedMeta<'_>) -> Result<SetterPoint> {
    let mut target: Option<(Ident, Type)> = None;
    let mut options = InjectOptions::default();

    meta.parse_nested_meta(|nested| {
        if nested.path.is_ident("optional") {
            options.optional = true;
        } else if nested.path.is_ident("qualifier") {
            let qualifier: LitStr = nested.value()?.parse()?;
            options.qualifier = Some(qualifier.value());
        } else if let Some(method) = nested.path.get_ident() {
            if target.is_some() {
                return Err(nested.error("每个 setter 只能声明一个方法"));
            }
            let ty: LitStr = nested.value()?.parse()?;
            target = Some((method.clone(), ty.parse()?));
        } else {
            return Err(nested.error("setter 方法名必须是标识符"));
        }
        Ok(())
    })?;

    let (method, ty) =
        target.ok_or_else(|| meta.error("setter 缺少方法声明，例如 setter(set_repo = \"Repo\")"))?;
    Ok(SetterPoint {
        method,
        ty,
        options,
    })
}

/// 解析字段；单元结构体返回 `None`
fn parse_fields(input: &DeriveInput) -> Result<Option<Vec<ComponentField>>> {
    let Data::Struct(data) = &input.data else {
        return Err(Error::new(input.ident.span(), "只能为结构体派生 Component"));
    };

    let named = match &data.fields {
        Fields::Named(named) => named,
        Fields::Unit => return Ok(None),
        Fields::Unnamed(unnamed) => {
            return Err(Error::new(
                unnamed.span(),
                "不支持元组结构体，请使用具名字段",
            ))
        }
    };

    let mut fields = Vec::with_capacity(named.named.len());
    for field in &named.named {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        fields.push(ComponentField {
            role: field_role(field)?,
            ident,
        });
    }
    Ok(Some(fields))
}

fn field_role(field: &syn::Field) -> Result<FieldRole> {
    let inject = field.attrs.iter().find(|attr| attr.path().is_ident("inject"));
    let autowired = field
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("autowired"));

    match (inject, autowired) {
        (Some(attr), Some(_)) => Err(Error::new(
            attr.span(),
            "#[inject] 与 #[autowired] 不能同时使用",
        )),
        (Some(attr), None) => {
            let mut options = parse_inject_options(attr)?;
            let (ty, optional) = constructor_type(&field.ty)?;
            if options.optional && !optional {
                return Err(Error::new(
                    field.ty.span(),
                    "可选的构造器依赖必须声明为 Option<Arc<T>>",
                ));
            }
            options.optional = optional;
            Ok(FieldRole::Constructor {
                ty,
                optional,
                options,
            })
        }
        (None, Some(attr)) => {
            let options = parse_inject_options(attr)?;
            let ty = generic_of(&field.ty, "Autowired").ok_or_else(|| {
                Error::new(field.ty.span(), "#[autowired] 字段必须是 Autowired<T>")
            })?;
            Ok(FieldRole::Autowired { ty, options })
        }
        (None, None) => Ok(FieldRole::Plain),
    }
}

fn parse_inject_options(attr: &Attribute) -> Result<InjectOptions> {
    let mut options = InjectOptions::default();
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(options);
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("optional") {
            options.optional = true;
        } else if meta.path.is_ident("qualifier") {
            let qualifier: LitStr = meta.value()?.parse()?;
            options.qualifier = Some(qualifier.value());
        } else {
            return Err(meta.error("不支持的注入参数，可选: optional, qualifier"));
        }
        Ok(())
    })?;
    Ok(options)
}

/// `Arc<T>` 返回 `(T, false)`，`Option<Arc<T>>` 返回 `(T, true)`
fn constructor_type(ty: &Type) -> Result<(Type, bool)> {
    let (arc, optional) = if is_option_type(ty) {
        let inner = extract_generic_type(ty)
            .ok_or_else(|| Error::new(ty.span(), "无法识别 Option 的类型参数"))?;
        (inner, true)
    } else {
        (ty, false)
    };

    let inner = generic_of(arc, "Arc")
        .ok_or_else(|| Error::new(ty.span(), "#[inject] 字段必须是 Arc<T> 或 Option<Arc<T>>"))?;
    Ok((inner, optional))
}

fn generic_of(ty: &Type, wrapper: &str) -> Option<Type> {
    if !last_segment_is(ty, wrapper) {
        return None;
    }
    extract_generic_type(ty).cloned()
}
