use super::model::{Question, QuestionDto};
use component_macros::Component;

/// 实体到传输对象的转换
#[derive(Debug, Default, Component)]
pub struct QuestionMapper;

impl QuestionMapper {
    pub fn to_dto(&self, question: &Question, answers: usize) -> QuestionDto {
        QuestionDto {
            id: question.id.to_string(),
            title: question.title.clone(),
            body: question.body.clone(),
            answers,
            asked_at: question.asked_at.to_rfc3339(),
        }
    }
}
