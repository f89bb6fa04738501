//! `memoir questions`: expansion questions from a saved model reply.

use anyhow::Result;
use memoir_core::questions::{parse_questions, validate_questions};
use std::path::Path;

use crate::edit::read_text;

/// Fallback when a reply yields no usable question.
pub const DEFAULT_QUESTION: &str = "선택하신 부분에 대해 더 자세히 설명해주실 수 있나요?";

pub fn extract_questions(reply: &str) -> Vec<String> {
    let questions = validate_questions(parse_questions(reply));
    if questions.is_empty() {
        vec![DEFAULT_QUESTION.to_string()]
    } else {
        questions
    }
}

pub fn run_questions(reply: &Path, json: bool) -> Result<()> {
    let questions = extract_questions(&read_text(reply)?);
    if json {
        println!("{}", serde_json::to_string_pretty(&questions)?);
    } else {
        for (i, q) in questions.iter().enumerate() {
            println!("{}. {}", i + 1, q);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_referencing_questions_dropped() {
        let reply = "질문 1: AI에게 더 알려주실 수 있나요?\n질문 2: 그날 누구와 함께 계셨나요?";
        assert_eq!(extract_questions(reply), vec!["그날 누구와 함께 계셨나요?"]);
    }

    #[test]
    fn test_default_question_when_none_parse() {
        assert_eq!(extract_questions("좋은 글입니다."), vec![DEFAULT_QUESTION]);
    }
}
