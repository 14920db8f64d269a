use std::collections::{HashMap, HashSet};

use shared::{
    domain::{
        Course, CourseId, CourseModule, LearningPathId, LearningUnit, ModuleId, TopicId,
        TopicSummary, UnitStatus, UserId,
    },
    protocol::{
        CourseTopicsResult, CoursesResult, EnrollResult, EnrollmentsResult, LearningUnitsResult,
        ModulesResult, Outcome,
    },
};
use tracing::{debug, info, warn};

use super::{ActionOutcome, Notice, PageContext};
use crate::{
    operations::{
        CourseIdVars, CourseIdsVars, EnrollUserForCourse, EnrollVars, GetCourses, GetModules,
        GetTopicsForCourse, GetUserEnrollments, GetUserLearningUnits, LearningPathVars,
        Operation, UserIdVars,
    },
    progress::{completion_stats, CompletionStats, TopicAction},
    routes::Route,
    FetchPolicy, LearningClient, TransportError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct TopicRow {
    pub topic_id: TopicId,
    pub title: String,
    pub description: Option<String>,
    pub topic_type: Option<String>,
    pub minutes: i64,
    pub status: UnitStatus,
    pub percentage: f64,
    pub locked: bool,
    pub action: TopicAction,
}

impl TopicRow {
    fn new(topic: &TopicSummary, unit: Option<&LearningUnit>) -> Self {
        let status = unit.map(|unit| unit.status).unwrap_or(UnitStatus::Locked);
        let locked = unit.map(LearningUnit::locked).unwrap_or(true);
        Self {
            topic_id: topic.topic_id.clone(),
            title: topic.topic_title.clone(),
            description: topic.description.clone().filter(|text| !text.is_empty()),
            topic_type: topic.topic_type.clone(),
            minutes: topic.estimated_duration_in_mins.unwrap_or(0),
            status,
            percentage: unit.map(LearningUnit::display_percentage).unwrap_or(0.0),
            locked,
            action: TopicAction::for_unit(status, locked),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSection {
    /// 1-based position after sorting.
    pub display_order: usize,
    pub module_id: ModuleId,
    pub title: String,
    pub description: Option<String>,
    pub topics: Vec<TopicRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseDetailView {
    pub course: Course,
    pub learning_path_id: Option<LearningPathId>,
    pub modules: Vec<ModuleSection>,
    pub stats: CompletionStats,
    pub total_duration_mins: i64,
}

impl CourseDetailView {
    pub fn is_enrolled(&self) -> bool {
        self.learning_path_id.is_some()
    }
}

pub struct CourseDetailPage {
    ctx: PageContext,
    course_id: CourseId,
}

impl CourseDetailPage {
    pub fn new(ctx: PageContext, course_id: CourseId) -> Self {
        Self { ctx, course_id }
    }

    pub async fn load(&self) -> Result<CourseDetailView, ActionOutcome> {
        let client = &self.ctx.client;
        let ids = CourseIdsVars {
            course_ids: vec![self.course_id.clone()],
        };
        let single = CourseIdVars {
            course_id: self.course_id.clone(),
        };
        let (course, modules, topics) = futures::join!(
            client.query::<GetCourses>(&ids, FetchPolicy::CacheFirst),
            client.query::<GetModules>(&ids, FetchPolicy::CacheFirst),
            client.query::<GetTopicsForCourse>(&single, FetchPolicy::CacheFirst),
        );

        let course = match course.map_err(|err| self.load_failed(err))? {
            CoursesResult::Courses { courses } => courses.into_iter().next(),
            other => {
                debug!(course_id = %self.course_id, result = ?other, "course lookup returned no course");
                None
            }
        };
        let Some(course) = course else {
            return Err(ActionOutcome::notice(Notice::error("Course not found")).then(Route::Dashboard));
        };
        let mut modules = match modules.map_err(|err| self.load_failed(err))? {
            ModulesResult::Modules { modules } => modules,
            ModulesResult::Unrecognized => Vec::new(),
        };
        let topics = match topics.map_err(|err| self.load_failed(err))? {
            CourseTopicsResult::Topics { topics } => topics,
            _ => Vec::new(),
        };

        let user_id = self.ctx.session.user_id().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to read session");
            None
        });
        let learning_path_id = match &user_id {
            Some(user_id) => learning_path_for(client, user_id, &self.course_id).await,
            None => None,
        };
        let units = match &learning_path_id {
            Some(path_id) => learning_units(client, path_id, FetchPolicy::CacheFirst).await,
            None => Vec::new(),
        };

        let enrolled = learning_path_id.is_some();
        let units_by_topic: HashMap<&TopicId, &LearningUnit> =
            units.iter().map(|unit| (&unit.topic_id, unit)).collect();
        let enrolled_modules: HashSet<&ModuleId> =
            units.iter().filter_map(|unit| unit.module_id.as_ref()).collect();

        if enrolled {
            modules.retain(|module| enrolled_modules.contains(&module.module_id));
        }
        modules.sort_by_key(|module| module.order.unwrap_or(0));

        let mut topics_by_module: HashMap<&ModuleId, Vec<TopicRow>> = HashMap::new();
        let mut total_duration_mins = 0;
        for topic in &topics {
            let unit = units_by_topic.get(&topic.topic_id).copied();
            if enrolled && unit.is_none() {
                continue;
            }
            if enrolled {
                total_duration_mins += topic.estimated_duration_in_mins.unwrap_or(0);
            }
            if let Some(module_id) = &topic.module_id {
                topics_by_module
                    .entry(module_id)
                    .or_default()
                    .push(TopicRow::new(topic, unit));
            }
        }

        let modules = modules
            .iter()
            .enumerate()
            .map(|(index, module)| section(index, module, &mut topics_by_module))
            .collect();

        Ok(CourseDetailView {
            stats: completion_stats(&units),
            course,
            learning_path_id,
            modules,
            total_duration_mins,
        })
    }

    pub async fn enroll(&self) -> ActionOutcome {
        let user_id = self.ctx.session.user_id().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to read session");
            None
        });
        let Some(user_id) = user_id else {
            return ActionOutcome::notice(Notice::error("Please login first!")).then(Route::Login);
        };

        let variables = EnrollVars {
            user_id,
            course_id: self.course_id.clone(),
        };
        match self.ctx.client.mutate::<EnrollUserForCourse>(&variables).await {
            Ok(EnrollResult::Enrolled(enrollment)) => {
                self.ctx
                    .client
                    .evict_fields(&[GetUserEnrollments::ROOT_FIELD, GetUserLearningUnits::ROOT_FIELD])
                    .await;
                info!(
                    course_id = %self.course_id,
                    enrollment_id = %enrollment.id,
                    "enrolled in course"
                );
                ActionOutcome::notice(Notice::success("Enrolled successfully!")).then(Route::Course {
                    course_id: self.course_id.clone(),
                })
            }
            Ok(other) => {
                let message = other
                    .api_error()
                    .map(|err| err.message)
                    .unwrap_or_else(|| "Enrollment failed".to_string());
                ActionOutcome::notice(Notice::error(message))
            }
            Err(err) => {
                warn!(course_id = %self.course_id, error = %err, "enrollment failed");
                ActionOutcome::notice(Notice::error(format!("Failed: {err}")))
            }
        }
    }

    fn load_failed(&self, err: TransportError) -> ActionOutcome {
        warn!(course_id = %self.course_id, error = %err, "course load failed");
        ActionOutcome::notice(Notice::error(format!("Error: {err}"))).then(Route::Dashboard)
    }
}

fn section(
    index: usize,
    module: &CourseModule,
    topics_by_module: &mut HashMap<&ModuleId, Vec<TopicRow>>,
) -> ModuleSection {
    ModuleSection {
        display_order: index + 1,
        module_id: module.module_id.clone(),
        title: module.module_title.clone(),
        description: module.description.clone(),
        topics: topics_by_module.remove(&module.module_id).unwrap_or_default(),
    }
}

/// Learning path of the user's enrollment in `course_id`, if any.
pub(crate) async fn learning_path_for(
    client: &LearningClient,
    user_id: &UserId,
    course_id: &CourseId,
) -> Option<LearningPathId> {
    let variables = UserIdVars {
        user_id: user_id.clone(),
    };
    match client
        .query::<GetUserEnrollments>(&variables, FetchPolicy::CacheFirst)
        .await
    {
        Ok(EnrollmentsResult::Enrollments { enrollments }) => enrollments
            .into_iter()
            .find(|enrollment| &enrollment.course_id == course_id)
            .and_then(|enrollment| enrollment.user_learning_path_id),
        Ok(_) => None,
        Err(err) => {
            warn!(%user_id, error = %err, "failed to load enrollments");
            None
        }
    }
}

pub(crate) async fn learning_units(
    client: &LearningClient,
    path_id: &LearningPathId,
    policy: FetchPolicy,
) -> Vec<LearningUnit> {
    let variables = LearningPathVars {
        user_learning_path_id: path_id.clone(),
    };
    match client.query::<GetUserLearningUnits>(&variables, policy).await {
        Ok(LearningUnitsResult::Units { units }) => units,
        Ok(_) => Vec::new(),
        Err(err) => {
            warn!(path_id = %path_id, error = %err, "failed to load learning units");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "../tests/course_detail_tests.rs"]
mod tests;
