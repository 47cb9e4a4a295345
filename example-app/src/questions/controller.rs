//! 问答控制器，收发 JSON 文本

use super::model::{AnswerRequest, AskRequest};
use super::service::{AnswerService, QuestionService};
use crate::util::json::JsonParser;
use anyhow::{Context, Result};
use component_macros::Component;
use infrastructure_common::Autowired;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Component)]
#[component(setter(set_parser = "JsonParser"))]
pub struct QuestionController {
    #[autowired]
    questions: Autowired<QuestionService>,
    #[autowired]
    answers: Autowired<AnswerService>,
    parser: RwLock<Option<Arc<JsonParser>>>,
    requests: AtomicU64,
}

impl QuestionController {
    /// setter 注入点
    pub fn set_parser(&self, parser: Arc<JsonParser>) {
        *self.parser.write() = Some(parser);
    }

    pub fn ask(&self, request: &str) -> Result<String> {
        let parser = self.parser()?;
        let request: AskRequest = parser.parse(request)?;
        let question = self.questions()?.ask(&request.title, &request.body)?;
        parser.to_json(&question)
    }

    pub fn answer(&self, request: &str) -> Result<String> {
        let parser = self.parser()?;
        let request: AnswerRequest = parser.parse(request)?;
        let answer = self
            .answers
            .get()
            .context("AnswerService 尚未注入")?
            .answer(request.question_id, &request.body)?;
        parser.to_json(&answer)
    }

    pub fn show(&self, id: Uuid) -> Result<String> {
        let parser = self.parser()?;
        parser.to_json(&self.questions()?.get(id)?)
    }

    pub fn list(&self) -> Result<String> {
        let parser = self.parser()?;
        parser.to_json(&self.questions()?.list()?)
    }

    /// 已处理的请求数
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    fn parser(&self) -> Result<Arc<JsonParser>> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.parser.read().clone().context("JsonParser 尚未注入")
    }

    fn questions(&self) -> Result<Arc<QuestionService>> {
        self.questions.get().context("QuestionService 尚未注入")
    }
}
