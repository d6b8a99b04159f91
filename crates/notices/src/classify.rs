//! Keyword classification
//!
//! Maps notice text to a topic label and severity. The table is checked
//! top to bottom and the first matching keyword group wins, so its
//! order is part of the contract: 합산과세 outranks the generic 통관
//! even when both words appear.

use crate::notice::NoticeRisk;

/// Classification outcome for one notice
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: String,
    pub risk: NoticeRisk,
    pub tags: Vec<String>,
}

type KeywordRow = (&'static [&'static str], &'static str, NoticeRisk);

const KEYWORD_TABLE: &[KeywordRow] = &[
    (&["합산"], "합산과세", NoticeRisk::Alert),
    (&["파업", "지연"], "지연", NoticeRisk::Alert),
    (&["면세"], "소액면세", NoticeRisk::Watch),
    (&["시스템"], "시스템", NoticeRisk::Watch),
    (&["법령", "개정"], "법령", NoticeRisk::Watch),
    (&["통관"], "통관", NoticeRisk::Info),
    (&["관세"], "관세", NoticeRisk::Info),
];

const DEFAULT_CATEGORY: &str = "일반";

/// Classifies a notice from its title and summary
pub fn classify(title: &str, summary: &str) -> Classification {
    let text = format!("{title} {summary}");
    for (keywords, label, risk) in KEYWORD_TABLE {
        if keywords.iter().any(|keyword| text.contains(keyword)) {
            return Classification {
                category: (*label).to_string(),
                risk: *risk,
                tags: vec![(*label).to_string()],
            };
        }
    }
    Classification {
        category: DEFAULT_CATEGORY.to_string(),
        risk: NoticeRisk::Info,
        tags: Vec::new(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_taxation_is_alert() {
        let c = classify("합산과세 운영기준 안내", "");
        assert_eq!(c.category, "합산과세");
        assert_eq!(c.risk, NoticeRisk::Alert);
        assert_eq!(c.tags, vec!["합산과세".to_string()]);
    }

    #[test]
    fn test_delay_keywords_are_alert() {
        assert_eq!(classify("물류센터 파업 관련 안내", "").category, "지연");
        let c = classify("성수기 통관 지연 안내", "");
        assert_eq!(c.category, "지연");
        assert_eq!(c.risk, NoticeRisk::Alert);
    }

    #[test]
    fn test_watch_keywords() {
        assert_eq!(classify("소액 면세 기준 변경", "").risk, NoticeRisk::Watch);
        assert_eq!(classify("전산 시스템 점검", "").category, "시스템");
        assert_eq!(classify("관세법 시행령 개정", "").category, "법령");
    }

    #[test]
    fn test_generic_keywords_are_info() {
        assert_eq!(classify("통관 절차 안내", "").risk, NoticeRisk::Info);
        let c = classify("", "관세 행정 일반 사항");
        assert_eq!(c.category, "관세");
        assert_eq!(c.risk, NoticeRisk::Info);
    }

    #[test]
    fn test_first_match_wins() {
        // 합산 appears after 면세 in the text but earlier in the table
        let c = classify("면세 한도 및 합산과세 안내", "");
        assert_eq!(c.category, "합산과세");
        assert_eq!(c.risk, NoticeRisk::Alert);
    }

    #[test]
    fn test_summary_participates() {
        let c = classify("안내문", "동일 입항일 합산 대상 물품");
        assert_eq!(c.category, "합산과세");
    }

    #[test]
    fn test_default_classification() {
        let c = classify("기타 공지", "특이사항 없음");
        assert_eq!(c.category, "일반");
        assert_eq!(c.risk, NoticeRisk::Info);
        assert!(c.tags.is_empty());
    }
}
