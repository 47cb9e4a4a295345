//! 问答业务

pub mod controller;
pub mod mapper;
pub mod model;
pub mod repository;
pub mod service;

pub use controller::QuestionController;
pub use service::{AnswerService, QuestionService};
