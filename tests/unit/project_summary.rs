use campus_desk::db::enums::TaskStatus;
use campus_desk::services::projects_service::summarize;
use uuid::Uuid;

#[test]
fn summary_lists_every_status_and_rounds_down() {
    let summary = summarize(
        Uuid::new_v4(),
        &[(TaskStatus::Done, 1), (TaskStatus::Todo, 2)],
        1,
        90,
    );
    assert_eq!(summary.total_tasks, 3);
    assert_eq!(summary.tasks_by_status.len(), TaskStatus::ALL.len());
    assert_eq!(summary.completion_percent, 33);
    assert_eq!(summary.overdue_tasks, 1);
    assert_eq!(summary.logged_minutes, 90);
}

#[test]
fn empty_project_is_zero_percent_complete() {
    let summary = summarize(Uuid::new_v4(), &[], 0, 0);
    assert_eq!(summary.total_tasks, 0);
    assert_eq!(summary.completion_percent, 0);
    assert!(summary.tasks_by_status.iter().all(|c| c.count == 0));
}
