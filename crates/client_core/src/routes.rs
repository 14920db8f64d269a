use std::fmt;

use shared::domain::{AssessmentId, AttemptId, CourseId, TopicId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    Dashboard,
    Profile,
    Course {
        course_id: CourseId,
    },
    Topic {
        course_id: CourseId,
        topic_id: TopicId,
    },
    QuizAttempt {
        assessment_id: AssessmentId,
        attempt_id: AttemptId,
    },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Signup => "/signup".to_string(),
            Self::Dashboard => "/".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::Course { course_id } => format!("/course/{course_id}"),
            Self::Topic {
                course_id,
                topic_id,
            } => format!("/course/{course_id}/topic/{topic_id}"),
            Self::QuizAttempt {
                assessment_id,
                attempt_id,
            } => format!("/assessment/{assessment_id}/attempt/{attempt_id}"),
        }
    }

    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Self::Dashboard),
            ["login"] => Some(Self::Login),
            ["signup"] => Some(Self::Signup),
            ["profile"] => Some(Self::Profile),
            ["course", course_id] => Some(Self::Course {
                course_id: CourseId::new(*course_id),
            }),
            ["course", course_id, "topic", topic_id] => Some(Self::Topic {
                course_id: CourseId::new(*course_id),
                topic_id: TopicId::new(*topic_id),
            }),
            ["assessment", assessment_id, "attempt", attempt_id] => Some(Self::QuizAttempt {
                assessment_id: AssessmentId::new(*assessment_id),
                attempt_id: AttemptId::new(*attempt_id),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_page_path() {
        let routes = [
            Route::Login,
            Route::Signup,
            Route::Dashboard,
            Route::Profile,
            Route::Course {
                course_id: CourseId::new("c1"),
            },
            Route::Topic {
                course_id: CourseId::new("c1"),
                topic_id: TopicId::new("t9"),
            },
            Route::QuizAttempt {
                assessment_id: AssessmentId::new("a1"),
                attempt_id: AttemptId::new("at1"),
            },
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }

    #[test]
    fn tolerates_trailing_slash_and_query() {
        assert_eq!(
            Route::parse("/course/c1/?tab=modules"),
            Some(Route::Course {
                course_id: CourseId::new("c1")
            })
        );
        assert_eq!(Route::parse("/course/c1/topic"), None);
        assert_eq!(Route::parse("/admin"), None);
    }
}
