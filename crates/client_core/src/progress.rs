//! Course completion math and the labels derived from learning units.

use std::collections::HashMap;

use shared::domain::{LearningUnit, TopicId, UnitStatus};

/// Longest course description shown on a dashboard card.
pub const CARD_DESCRIPTION_CHARS: usize = 110;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionStats {
    pub completed: usize,
    pub half_completed: usize,
    pub started: usize,
    pub total: usize,
    pub percentage: u32,
}

/// Counts units per status and averages their contribution over the
/// enrolled topics. A topic listed twice counts once, last write wins.
pub fn completion_stats(units: &[LearningUnit]) -> CompletionStats {
    let by_topic: HashMap<&TopicId, UnitStatus> = units
        .iter()
        .map(|unit| (&unit.topic_id, unit.status))
        .collect();

    let mut stats = CompletionStats {
        total: by_topic.len(),
        ..CompletionStats::default()
    };
    let mut contribution = 0u32;
    for status in by_topic.values() {
        match status {
            UnitStatus::Complete => stats.completed += 1,
            UnitStatus::HalfCompleted => stats.half_completed += 1,
            UnitStatus::Start => stats.started += 1,
            UnitStatus::Locked => {}
        }
        contribution += status.contribution();
    }
    if stats.total > 0 {
        stats.percentage = (f64::from(contribution) / stats.total as f64).round() as u32;
    }
    stats
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicAction {
    Locked,
    Review,
    Continue,
    Start,
}

impl TopicAction {
    pub fn for_unit(status: UnitStatus, locked: bool) -> Self {
        if locked {
            return Self::Locked;
        }
        match status {
            UnitStatus::Complete => Self::Review,
            UnitStatus::HalfCompleted | UnitStatus::Start => Self::Continue,
            UnitStatus::Locked => Self::Start,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Locked => "Locked",
            Self::Review => "Review",
            Self::Continue => "Continue",
            Self::Start => "Start",
        }
    }
}

pub fn enrollment_status_label(status: Option<&str>, percentage: f64) -> String {
    let status = status.filter(|status| !status.is_empty());
    if percentage >= 100.0 && status.map(|s| !s.eq_ignore_ascii_case("FAIL")).unwrap_or(true) {
        return "Completed".to_string();
    }
    status.unwrap_or("IN_PROGRESS").to_string()
}

pub fn clip_description(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub fn initial(title: &str) -> String {
    title
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::LearningUnitId;

    fn unit(topic: &str, status: UnitStatus) -> LearningUnit {
        LearningUnit {
            user_learning_unit_id: LearningUnitId::new(format!("lu-{topic}")),
            topic_id: TopicId::new(topic),
            module_id: None,
            assessment_id: None,
            is_locked: Some(status == UnitStatus::Locked),
            percentage: None,
            status,
        }
    }

    #[test]
    fn completion_is_rounded_average_contribution() {
        let units = [
            unit("t1", UnitStatus::Complete),
            unit("t2", UnitStatus::HalfCompleted),
            unit("t3", UnitStatus::Start),
            unit("t4", UnitStatus::Locked),
            unit("t5", UnitStatus::Locked),
            unit("t6", UnitStatus::Locked),
        ];
        let stats = completion_stats(&units);
        assert_eq!(stats.total, 6);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.half_completed, 1);
        assert_eq!(stats.started, 1);
        // (100 + 50 + 10) / 6 = 26.67
        assert_eq!(stats.percentage, 27);
    }

    #[test]
    fn no_units_means_zero_percent() {
        assert_eq!(completion_stats(&[]), CompletionStats::default());
    }

    #[test]
    fn duplicate_topics_count_once() {
        let units = [unit("t1", UnitStatus::Start), unit("t1", UnitStatus::Complete)];
        let stats = completion_stats(&units);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.percentage, 100);
    }

    #[test]
    fn action_labels_follow_status() {
        assert_eq!(TopicAction::for_unit(UnitStatus::Complete, true).label(), "Locked");
        assert_eq!(TopicAction::for_unit(UnitStatus::Complete, false).label(), "Review");
        assert_eq!(TopicAction::for_unit(UnitStatus::HalfCompleted, false).label(), "Continue");
        assert_eq!(TopicAction::for_unit(UnitStatus::Locked, false).label(), "Start");
    }

    #[test]
    fn enrollment_status_reads_completed_unless_failed() {
        assert_eq!(enrollment_status_label(Some("IN_PROGRESS"), 100.0), "Completed");
        assert_eq!(enrollment_status_label(Some("FAIL"), 100.0), "FAIL");
        assert_eq!(enrollment_status_label(None, 40.0), "IN_PROGRESS");
    }

    #[test]
    fn descriptions_clip_on_char_boundaries() {
        assert_eq!(clip_description("short", 110), "short");
        let long = "é".repeat(120);
        let clipped = clip_description(&long, 110);
        assert_eq!(clipped.chars().count(), 110);
        assert_eq!(initial("  rust basics"), "R");
        assert_eq!(initial(""), "");
    }
}
