use serde::Serialize;

/// What kind of change an edit request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditIntent {
    Expand,
    Condense,
    Emotional,
    Modify,
    General,
}

const INTENT_KEYWORDS: &[(EditIntent, &[&str])] = &[
    (EditIntent::Expand, &["자세히", "구체적", "확장"]),
    (EditIntent::Condense, &["간단히", "줄여", "축약"]),
    (EditIntent::Emotional, &["감성적", "감동적", "문학적"]),
    (EditIntent::Modify, &["수정", "바꿔", "변경"]),
];

impl EditIntent {
    /// Classify a free-text edit request. The first matching row wins.
    pub fn classify(request: &str) -> Self {
        let request = request.to_lowercase();
        INTENT_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| request.contains(k)))
            .map(|(intent, _)| *intent)
            .unwrap_or(EditIntent::General)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EditIntent::Expand => "expand",
            EditIntent::Condense => "condense",
            EditIntent::Emotional => "emotional",
            EditIntent::Modify => "modify",
            EditIntent::General => "general",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_intent() {
        assert_eq!(EditIntent::classify("좀 더 자세히 써주세요"), EditIntent::Expand);
        assert_eq!(EditIntent::classify("간단히 정리해줘"), EditIntent::Condense);
        assert_eq!(EditIntent::classify("감동적으로 다듬어줘"), EditIntent::Emotional);
        assert_eq!(EditIntent::classify("표현을 바꿔주세요"), EditIntent::Modify);
        assert_eq!(EditIntent::classify("알아서 해줘"), EditIntent::General);
    }

    #[test]
    fn test_classify_priority() {
        // Expansion keywords outrank modification keywords.
        assert_eq!(
            EditIntent::classify("구체적으로 수정해 주세요"),
            EditIntent::Expand
        );
    }
}
