//! # 示例应用程序
//!
//! 一个问答应用：仓储、映射器、服务、控制器全部由容器装配。

mod questions;
mod util;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use infrastructure_composition::ApplicationContext;
use questions::{AnswerService, QuestionController, QuestionService};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::info;
use util::RequestTrace;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Autowire 问答示例应用")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 扫描根模块路径，覆盖配置文件
    #[arg(short, long)]
    root: Option<String>,

    /// 并发读取的任务数
    #[arg(long, default_value_t = 8)]
    readers: usize,

    /// 使用生产环境配置
    #[arg(long)]
    production: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let context = build_context(&args)?;

    info!("启动 Autowire 问答示例应用");

    demonstrate_questions(&context)?;
    demonstrate_concurrent_reads(&context, args.readers).await?;
    demonstrate_prototype(&context)?;

    let stats = context.stats();
    info!(
        "组件: {}, 单例: {}, 装配耗时: {}ms",
        stats.registered_components, stats.singleton_instances, stats.build_duration_ms
    );

    context.shutdown();
    Ok(())
}

fn build_context(args: &Args) -> Result<ApplicationContext> {
    let mut builder = if args.production {
        ApplicationContext::builder().auto_configure_production()
    } else {
        ApplicationContext::builder().auto_configure_development()
    };

    if let Some(path) = &args.config {
        builder = builder.add_config_toml(path)?;
    }

    match (&args.root, &args.config) {
        (Some(root), _) => builder = builder.root_package(root.as_str()),
        (None, None) => builder = builder.root_package(module_path!()),
        (None, Some(_)) => {}
    }

    builder.eager(true).build().context("应用上下文构建失败")
}

#[derive(Debug, Deserialize)]
struct AskedQuestion {
    id: uuid::Uuid,
}

fn demonstrate_questions(context: &ApplicationContext) -> Result<()> {
    let controller = context.get_instance::<QuestionController>()?;

    let asked = controller.ask(r#"{ "title": "什么是依赖注入?", "body": "容器如何装配组件?" }"#)?;
    info!("提问: {}", asked);

    let question: AskedQuestion = serde_json::from_str(&asked)?;
    let answer = controller.answer(&format!(
        r#"{{ "question_id": "{}", "body": "由容器按依赖图创建并注入组件" }}"#,
        question.id
    ))?;
    info!("回答: {}", answer);

    let answers = context.get_instance::<AnswerService>()?.answers_for(question.id);
    ensure!(answers.len() == 1, "问题 {} 应当有一个回答", question.id);

    info!("问题详情: {}", controller.show(question.id)?);
    info!("问题列表: {}", controller.list()?);
    info!("控制器已处理 {} 个请求", controller.requests());
    Ok(())
}

async fn demonstrate_concurrent_reads(context: &ApplicationContext, readers: usize) -> Result<()> {
    let expected = context.get_instance::<QuestionService>()?;
    let mut tasks = JoinSet::new();

    for reader in 0..readers {
        let container = Arc::clone(context.container());
        tasks.spawn(async move {
            let service = di_abstractions::DiContainer::get_instance::<QuestionService>(
                container.as_ref(),
            )?;
            anyhow::Ok((reader, service))
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (reader, service) = joined??;
        ensure!(
            Arc::ptr_eq(&service, &expected),
            "任务 {reader} 得到了不同的 QuestionService 实例"
        );
    }

    info!("{} 个并发任务读取到同一个单例", readers);
    Ok(())
}

fn demonstrate_prototype(context: &ApplicationContext) -> Result<()> {
    let first = context.get_instance::<RequestTrace>()?;
    let second = context.get_instance::<RequestTrace>()?;
    ensure!(first.id() != second.id(), "原型组件应当每次创建新实例");

    let answers = context.get_instance::<AnswerService>()?;
    let questions = answers
        .question_service()
        .context("AnswerService 未注入 QuestionService")?;
    ensure!(Arc::ptr_eq(&questions, &context.get_instance::<QuestionService>()?));
    let back = questions
        .answer_service()
        .context("QuestionService 未注入 AnswerService")?;
    ensure!(Arc::ptr_eq(&back, &answers));

    info!("原型实例: {} / {}", first.id(), second.id());
    Ok(())
}
