//! 内存仓储

use super::model::{Answer, Question};
use component_macros::Component;
use dashmap::DashMap;
use uuid::Uuid;

/// 问题仓储
pub trait QuestionRepository: Send + Sync {
    fn save(&self, question: Question) -> Question;
    fn find(&self, id: Uuid) -> Option<Question>;
    fn find_all(&self) -> Vec<Question>;
}

/// 回答仓储
pub trait AnswerRepository: Send + Sync {
    fn save(&self, answer: Answer) -> Answer;
    fn find_by_question(&self, question_id: Uuid) -> Vec<Answer>;
}

#[derive(Debug, Default, Component)]
#[component(provides = "dyn QuestionRepository")]
pub struct InMemoryQuestionRepository {
    questions: DashMap<Uuid, Question>,
}

impl QuestionRepository for InMemoryQuestionRepository {
    fn save(&self, question: Question) -> Question {
        self.questions.insert(question.id, question.clone());
        question
    }

    fn find(&self, id: Uuid) -> Option<Question> {
        self.questions.get(&id).map(|entry| entry.value().clone())
    }

    fn find_all(&self) -> Vec<Question> {
        let mut questions: Vec<Question> = self
            .questions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        questions.sort_by_key(|question| question.asked_at);
        questions
    }
}

#[derive(Debug, Default, Component)]
#[component(provides = "dyn AnswerRepository")]
pub struct InMemoryAnswerRepository {
    answers: DashMap<Uuid, Vec<Answer>>,
}

impl AnswerRepository for InMemoryAnswerRepository {
    fn save(&self, answer: Answer) -> Answer {
        self.answers
            .entry(answer.question_id)
            .or_default()
            .push(answer.clone());
        answer
    }

    fn find_by_question(&self, question_id: Uuid) -> Vec<Answer> {
        self.answers
            .get(&question_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }
}
