//! Lecture management: CRUD, enrollment, and week-view assembly.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{EnrollmentError, Result, StorageError};
use crate::store::LectureStore;

use super::types::{Lecture, LectureFilter, LectureUpdate};
use super::week::{TimeWindow, WeekSchedule};

/// Manager for lectures, providing storage and schedule operations.
pub struct LectureManager<S: LectureStore> {
    store: Arc<S>,
}

impl<S: LectureStore> LectureManager<S> {
    /// Create a new manager with the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    // ========================================================================
    // CRUD Operations
    // ========================================================================

    /// Create a new lecture. The interval invariant is checked up front.
    pub async fn create(&self, lecture: Lecture) -> Result<Lecture> {
        lecture.validate()?;
        self.store.insert(lecture.clone()).await?;
        debug!("Created lecture: {} ({})", lecture.title, lecture.id);
        Ok(lecture)
    }

    /// Get a lecture by id.
    pub async fn get(&self, id: &str) -> Result<Option<Lecture>> {
        self.store.get(id).await
    }

    /// Update an existing lecture. The updated times must still form a
    /// valid interval.
    pub async fn update(&self, id: &str, update: LectureUpdate) -> Result<Option<Lecture>> {
        let Some(mut lecture) = self.store.get(id).await? else {
            return Ok(None);
        };
        update.apply_to(&mut lecture);
        lecture.validate()?;
        self.store.replace(lecture.clone()).await?;
        debug!("Updated lecture: {} ({})", lecture.title, lecture.id);
        Ok(Some(lecture))
    }

    /// Delete a lecture by id. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.store.remove(id).await?;
        if removed {
            debug!("Deleted lecture: {}", id);
        }
        Ok(removed)
    }

    /// List lectures matching a filter, ordered by day, start time, id.
    pub async fn list(&self, filter: &LectureFilter) -> Result<Vec<Lecture>> {
        let mut lectures: Vec<Lecture> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|l| filter.matches(l))
            .collect();

        lectures.sort_by(|a, b| {
            a.day_of_week
                .index()
                .cmp(&b.day_of_week.index())
                .then_with(|| a.start_time.cmp(&b.start_time))
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(lectures
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect())
    }

    // ========================================================================
    // Enrollment
    // ========================================================================

    /// Enroll a student, enforcing capacity and duplicate checks.
    pub async fn enroll(&self, lecture_id: &str, student_id: &str) -> Result<Lecture> {
        let mut lecture = self
            .store
            .get(lecture_id)
            .await?
            .ok_or_else(|| StorageError::LectureNotFound(lecture_id.to_string()))?;

        if lecture.has_student(student_id) {
            return Err(EnrollmentError::AlreadyEnrolled {
                student_id: student_id.to_string(),
                lecture_id: lecture_id.to_string(),
            }
            .into());
        }
        if lecture.is_full() {
            return Err(EnrollmentError::LectureFull {
                lecture_id: lecture_id.to_string(),
                capacity: lecture.max_students,
            }
            .into());
        }

        lecture.enrolled_students.push(student_id.to_string());
        self.store.replace(lecture.clone()).await?;
        debug!("Enrolled {} in {}", student_id, lecture_id);
        Ok(lecture)
    }

    /// Remove a student's enrollment.
    pub async fn unenroll(&self, lecture_id: &str, student_id: &str) -> Result<Lecture> {
        let mut lecture = self
            .store
            .get(lecture_id)
            .await?
            .ok_or_else(|| StorageError::LectureNotFound(lecture_id.to_string()))?;

        if !lecture.has_student(student_id) {
            return Err(EnrollmentError::NotEnrolled {
                student_id: student_id.to_string(),
                lecture_id: lecture_id.to_string(),
            }
            .into());
        }

        lecture.enrolled_students.retain(|s| s != student_id);
        self.store.replace(lecture.clone()).await?;
        debug!("Unenrolled {} from {}", student_id, lecture_id);
        Ok(lecture)
    }

    // ========================================================================
    // Week View
    // ========================================================================

    /// Lay out the week containing `reference` from all stored lectures.
    pub async fn week(
        &self,
        reference: NaiveDate,
        window: TimeWindow,
        units_per_hour: f64,
    ) -> Result<WeekSchedule> {
        let lectures = self.store.list().await?;
        WeekSchedule::build(reference, &lectures, window, units_per_hour)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RotaError;
    use crate::schedule::{DayOfWeek, TimeOfDay};
    use crate::store::MemoryLectureStore;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn create_test_manager() -> LectureManager<MemoryLectureStore> {
        LectureManager::new(Arc::new(MemoryLectureStore::new()))
    }

    fn sample(id: &str, day: DayOfWeek, start: &str, end: &str) -> Lecture {
        Lecture::with_id(id, format!("Lecture {}", id), "teacher-1", day, t(start), t(end))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let manager = create_test_manager();
        let created = manager
            .create(sample("a", DayOfWeek::Monday, "09:00", "10:00"))
            .await
            .unwrap();

        let found = manager.get(&created.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Lecture a");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_interval() {
        let manager = create_test_manager();
        let result = manager
            .create(sample("bad", DayOfWeek::Monday, "10:00", "09:00"))
            .await;
        assert!(matches!(result, Err(RotaError::Schedule(_))));
    }

    #[tokio::test]
    async fn test_update_revalidates_interval() {
        let manager = create_test_manager();
        manager
            .create(sample("a", DayOfWeek::Monday, "09:00", "10:00"))
            .await
            .unwrap();

        let update = LectureUpdate {
            end_time: Some(t("08:30")),
            ..Default::default()
        };
        let result = manager.update("a", update).await;
        assert!(matches!(result, Err(RotaError::Schedule(_))));

        // The stored lecture is untouched after the failed update.
        let stored = manager.get("a").await.unwrap().unwrap();
        assert_eq!(stored.end_time, t("10:00"));
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let manager = create_test_manager();
        let updated = manager.update("ghost", LectureUpdate::default()).await.unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let manager = create_test_manager();
        manager
            .create(sample("wed", DayOfWeek::Wednesday, "09:00", "10:00"))
            .await
            .unwrap();
        manager
            .create(sample("mon-late", DayOfWeek::Monday, "11:00", "12:00"))
            .await
            .unwrap();
        manager
            .create(sample("mon-early", DayOfWeek::Monday, "09:00", "10:00"))
            .await
            .unwrap();

        let all = manager.list(&LectureFilter::default()).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["mon-early", "mon-late", "wed"]);

        let mondays = manager
            .list(&LectureFilter::for_day(DayOfWeek::Monday))
            .await
            .unwrap();
        assert_eq!(mondays.len(), 2);
    }

    #[tokio::test]
    async fn test_enrollment_lifecycle() {
        let manager = create_test_manager();
        manager
            .create(sample("a", DayOfWeek::Monday, "09:00", "10:00").with_capacity(2))
            .await
            .unwrap();

        manager.enroll("a", "s1").await.unwrap();
        let lecture = manager.enroll("a", "s2").await.unwrap();
        assert!(lecture.is_full());

        let full = manager.enroll("a", "s3").await;
        assert!(matches!(full, Err(RotaError::Enrollment(EnrollmentError::LectureFull { .. }))));

        let dup = manager.enroll("a", "s1").await;
        assert!(matches!(
            dup,
            Err(RotaError::Enrollment(EnrollmentError::AlreadyEnrolled { .. }))
        ));

        let after = manager.unenroll("a", "s1").await.unwrap();
        assert!(!after.has_student("s1"));
        assert!(after.has_student("s2"));

        let absent = manager.unenroll("a", "s1").await;
        assert!(matches!(
            absent,
            Err(RotaError::Enrollment(EnrollmentError::NotEnrolled { .. }))
        ));
    }

    #[tokio::test]
    async fn test_enroll_unknown_lecture() {
        let manager = create_test_manager();
        let result = manager.enroll("ghost", "s1").await;
        assert!(matches!(result, Err(RotaError::Storage(_))));
    }

    #[tokio::test]
    async fn test_week_assembly() {
        let manager = create_test_manager();
        manager
            .create(sample("a", DayOfWeek::Monday, "09:00", "10:00"))
            .await
            .unwrap();
        manager
            .create(sample("b", DayOfWeek::Monday, "09:30", "10:30"))
            .await
            .unwrap();

        let reference = chrono::NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let week = manager
            .week(reference, TimeWindow::default(), 4.0)
            .await
            .unwrap();

        let monday = &week.days[0];
        assert_eq!(monday.lectures.len(), 2);
        assert!((monday.lectures[0].geometry.width_percent - 45.0).abs() < 1e-9);
    }
}
