//! Schedule integration tests: manager-level flows and the layout
//! characteristics the rendering layer depends on.

use std::sync::Arc;

use chrono::NaiveDate;

use rota::schedule::{
    DayOfWeek, Lecture, LectureFilter, LectureManager, LectureUpdate, TimeOfDay, TimeWindow,
};
use rota::store::MemoryLectureStore;

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

fn manager() -> LectureManager<MemoryLectureStore> {
    LectureManager::new(Arc::new(MemoryLectureStore::new()))
}

fn reference() -> NaiveDate {
    // A Thursday; its week starts Monday 2026-08-03.
    NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
}

fn lecture(id: &str, day: DayOfWeek, start: &str, end: &str) -> Lecture {
    Lecture::with_id(id, format!("Lecture {}", id), "teacher-1", day, t(start), t(end))
}

#[tokio::test]
async fn full_lecture_lifecycle() {
    let manager = manager();

    let created = manager
        .create(lecture("algo", DayOfWeek::Monday, "09:00", "10:30").with_capacity(2))
        .await
        .unwrap();

    manager.enroll(&created.id, "s1").await.unwrap();
    manager.enroll(&created.id, "s2").await.unwrap();
    assert!(manager.enroll(&created.id, "s3").await.is_err());

    let update = LectureUpdate {
        max_students: Some(3),
        ..Default::default()
    };
    manager.update(&created.id, update).await.unwrap();
    manager.enroll(&created.id, "s3").await.unwrap();

    let stored = manager.get(&created.id).await.unwrap().unwrap();
    assert_eq!(stored.enrolled_students.len(), 3);

    let enrolled_filter = LectureFilter {
        enrolled_student: Some("s2".to_string()),
        ..Default::default()
    };
    assert_eq!(manager.list(&enrolled_filter).await.unwrap().len(), 1);

    assert!(manager.delete(&created.id).await.unwrap());
    assert!(manager.get(&created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn week_layout_reports_local_cluster_asymmetry() {
    // The overlap chain p - q - r: q overlaps both ends, p and r do not
    // overlap each other. q is squeezed to a third while p and r keep
    // half-width columns. This mirrors the rendering behavior the week
    // view is expected to reproduce, asymmetry included.
    let manager = manager();
    manager
        .create(lecture("p", DayOfWeek::Monday, "09:00", "11:00"))
        .await
        .unwrap();
    manager
        .create(lecture("q", DayOfWeek::Monday, "10:30", "11:30"))
        .await
        .unwrap();
    manager
        .create(lecture("r", DayOfWeek::Monday, "11:15", "12:00"))
        .await
        .unwrap();

    let week = manager
        .week(reference(), TimeWindow::default(), 4.0)
        .await
        .unwrap();

    let monday = &week.days[0];
    assert_eq!(monday.lectures.len(), 3);

    let geometry_of = |id: &str| {
        monday
            .lectures
            .iter()
            .find(|p| p.lecture.id == id)
            .map(|p| p.geometry)
            .unwrap()
    };

    let p = geometry_of("p");
    let q = geometry_of("q");
    let r = geometry_of("r");

    assert!((p.width_percent - 45.0).abs() < 1e-9);
    assert!((q.width_percent - 30.0).abs() < 1e-9);
    assert!((r.width_percent - 45.0).abs() < 1e-9);
    assert!((q.left_percent - 35.0).abs() < 1e-9);
}

#[tokio::test]
async fn week_layout_is_deterministic_across_calls() {
    let manager = manager();
    for (id, start, end) in [
        ("a", "09:00", "10:00"),
        ("b", "09:30", "10:30"),
        ("c", "10:15", "11:45"),
        ("d", "13:00", "14:00"),
    ] {
        manager
            .create(lecture(id, DayOfWeek::Friday, start, end))
            .await
            .unwrap();
    }

    let first = manager
        .week(reference(), TimeWindow::default(), 4.0)
        .await
        .unwrap();
    let second = manager
        .week(reference(), TimeWindow::default(), 4.0)
        .await
        .unwrap();

    let friday_first = &first.days[4];
    let friday_second = &second.days[4];
    assert_eq!(friday_first.lectures.len(), friday_second.lectures.len());
    for (x, y) in friday_first.lectures.iter().zip(&friday_second.lectures) {
        assert_eq!(x.lecture.id, y.lecture.id);
        assert_eq!(x.geometry, y.geometry);
    }
}

#[tokio::test]
async fn coincident_lectures_split_evenly_by_id() {
    let manager = manager();
    for id in ["z", "x", "y"] {
        manager
            .create(lecture(id, DayOfWeek::Tuesday, "09:00", "10:00"))
            .await
            .unwrap();
    }

    let week = manager
        .week(reference(), TimeWindow::default(), 4.0)
        .await
        .unwrap();

    let tuesday = &week.days[1];
    let ids: Vec<&str> = tuesday
        .lectures
        .iter()
        .map(|p| p.lecture.id.as_str())
        .collect();
    assert_eq!(ids, vec!["x", "y", "z"]);

    let lefts: Vec<f64> = tuesday
        .lectures
        .iter()
        .map(|p| p.geometry.left_percent)
        .collect();
    for (actual, expected) in lefts.iter().zip([5.0, 35.0, 65.0]) {
        assert!((actual - expected).abs() < 1e-9);
    }
}

#[test]
fn lecture_deserializes_upstream_wire_format() {
    // The data source sends HH:MM:SS times and numeric weekdays; seconds
    // are discarded at the boundary.
    let json = r#"{
        "id": "42",
        "title": "Databases",
        "description": "Relational systems",
        "teacher_id": "7",
        "day_of_week": 4,
        "start_time": "13:15:00",
        "end_time": "14:45:00",
        "max_students": 30,
        "enrolled_students": ["11", "12"],
        "created_at": "2026-08-01T08:00:00Z",
        "updated_at": "2026-08-01T08:00:00Z"
    }"#;

    let lecture: Lecture = serde_json::from_str(json).unwrap();
    assert_eq!(lecture.day_of_week, DayOfWeek::Thursday);
    assert_eq!(lecture.start_time.to_string(), "13:15");
    assert_eq!(lecture.end_time.to_string(), "14:45");
    assert_eq!(lecture.enrolled_students.len(), 2);
    assert!(lecture.validate().is_ok());

    let back = serde_json::to_value(&lecture).unwrap();
    assert_eq!(back["start_time"], "13:15");
    assert_eq!(back["day_of_week"], 4);
}
