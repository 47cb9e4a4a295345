//! 问答服务
//!
//! `QuestionService` 与 `AnswerService` 通过字段注入互相引用。

use super::mapper::QuestionMapper;
use super::model::{Answer, Question, QuestionDto};
use super::repository::{AnswerRepository, QuestionRepository};
use anyhow::{bail, Context, Result};
use component_macros::Component;
use infrastructure_common::Autowired;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Component)]
pub struct QuestionService {
    #[inject]
    repository: Arc<dyn QuestionRepository>,
    #[inject]
    mapper: Arc<QuestionMapper>,
    #[autowired]
    answers: Autowired<AnswerService>,
}

impl QuestionService {
    pub fn ask(&self, title: &str, body: &str) -> Result<QuestionDto> {
        if title.trim().is_empty() {
            bail!("问题标题不能为空");
        }

        let question = self.repository.save(Question::new(title.trim(), body));
        debug!("新问题: {} ({})", question.title, question.id);
        Ok(self.mapper.to_dto(&question, 0))
    }

    pub fn find(&self, id: Uuid) -> Option<Question> {
        self.repository.find(id)
    }

    pub fn get(&self, id: Uuid) -> Result<QuestionDto> {
        let question = self
            .find(id)
            .with_context(|| format!("问题不存在: {id}"))?;
        Ok(self.mapper.to_dto(&question, self.answers()?.count_for(id)))
    }

    pub fn list(&self) -> Result<Vec<QuestionDto>> {
        let answers = self.answers()?;
        Ok(self
            .repository
            .find_all()
            .iter()
            .map(|question| self.mapper.to_dto(question, answers.count_for(question.id)))
            .collect())
    }

    pub fn answer_service(&self) -> Option<Arc<AnswerService>> {
        self.answers.get()
    }

    fn answers(&self) -> Result<Arc<AnswerService>> {
        self.answers.get().context("AnswerService 尚未注入")
    }
}

#[derive(Component)]
pub struct AnswerService {
    #[inject]
    repository: Arc<dyn AnswerRepository>,
    #[autowired]
    questions: Autowired<QuestionService>,
}

impl AnswerService {
    pub fn answer(&self, question_id: Uuid, body: &str) -> Result<Answer> {
        let questions = self
            .questions
            .get()
            .context("QuestionService 尚未注入")?;
        if questions.find(question_id).is_none() {
            bail!("问题不存在: {question_id}");
        }

        Ok(self.repository.save(Answer::new(question_id, body)))
    }

    pub fn answers_for(&self, question_id: Uuid) -> Vec<Answer> {
        self.repository.find_by_question(question_id)
    }

    pub fn count_for(&self, question_id: Uuid) -> usize {
        self.answers_for(question_id).len()
    }

    pub fn question_service(&self) -> Option<Arc<QuestionService>> {
        self.questions.get()
    }
}
