//! 问答实体和传输对象

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub asked_at: DateTime<Utc>,
}

impl Question {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            body: body.into(),
            asked_at: Utc::now(),
        }
    }
}

/// 回答
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: Uuid,
    pub question_id: Uuid,
    pub body: String,
    pub answered_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(question_id: Uuid, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            question_id,
            body: body.into(),
            answered_at: Utc::now(),
        }
    }
}

/// 对外展示的问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDto {
    pub id: String,
    pub title: String,
    pub body: String,
    pub answers: usize,
    pub asked_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRequest {
    pub question_id: Uuid,
    pub body: String,
}
