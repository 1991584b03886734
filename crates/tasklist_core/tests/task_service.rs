use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tasklist_core::{
    Category, Classifier, ConnectionPool, GenerationError, Priority, SortKey,
    SqliteTaskRepository, TaskListQuery, TaskRepository, TaskService, TaskServiceError,
    TaskValidationError, TextGenerator,
};

/// Always answers with the same text and counts calls.
struct FixedGenerator {
    reply: String,
    calls: Arc<AtomicUsize>,
}

impl FixedGenerator {
    fn new(reply: &str) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = Self {
            reply: reply.to_string(),
            calls: Arc::clone(&calls),
        };
        (generator, calls)
    }
}

impl TextGenerator for FixedGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Answers `{"priority": ...}` from a queue, one entry per call.
struct PriorityQueueGenerator {
    replies: Mutex<Vec<&'static str>>,
}

impl TextGenerator for PriorityQueueGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        let priority = self.replies.lock().unwrap().remove(0);
        Ok(format!(
            "{{\"category\":\"Work\",\"priority\":\"{priority}\"}}"
        ))
    }
}

fn row_count(pool: &ConnectionPool) -> i64 {
    let conn = pool.acquire().unwrap();
    conn.query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn add_task_stores_classified_values() {
    let pool = ConnectionPool::in_memory().unwrap();
    let (generator, _) = FixedGenerator::new("Sure! {\"category\":\"Work\",\"priority\":\"High\"}");
    let service = TaskService::new(SqliteTaskRepository::new(&pool), Classifier::new(generator));

    let task = service.add_task("Finish tax report by April 15").unwrap();

    assert_eq!(task.category, Category::Work);
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.description, "Finish tax report by April 15");
    assert!(!task.done);

    let stored = SqliteTaskRepository::new(&pool)
        .get_task(task.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored, task);
    assert_eq!(row_count(&pool), 1);
}

#[test]
fn blank_description_is_rejected_without_side_effects() {
    let pool = ConnectionPool::in_memory().unwrap();
    let (generator, calls) = FixedGenerator::new("{\"category\":\"Work\",\"priority\":\"High\"}");
    let service = TaskService::new(SqliteTaskRepository::new(&pool), Classifier::new(generator));

    for blank in ["", "  ", "\t\n"] {
        let err = service.add_task(blank).unwrap_err();
        assert!(matches!(
            err,
            TaskServiceError::Validation(TaskValidationError::BlankDescription)
        ));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(row_count(&pool), 0);
}

#[test]
fn add_task_succeeds_with_fallback_when_generation_is_unusable() {
    let pool = ConnectionPool::in_memory().unwrap();
    let (generator, _) = FixedGenerator::new("I cannot help with that.");
    let service = TaskService::new(SqliteTaskRepository::new(&pool), Classifier::new(generator));

    let task = service.add_task("call the bank").unwrap();
    assert_eq!(task.category, Category::Personal);
    assert_eq!(task.priority, Priority::Medium);

    let offline = TaskService::new(SqliteTaskRepository::new(&pool), Classifier::fallback_only());
    let task = offline.add_task("call the bank again").unwrap();
    assert_eq!(task.category, Category::Personal);
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(row_count(&pool), 2);
}

#[test]
fn every_added_task_has_enumerated_values() {
    let pool = ConnectionPool::in_memory().unwrap();
    let (generator, _) =
        FixedGenerator::new("{\"category\":\"shopping\",\"priority\":\"ASAP\"}");
    let service = TaskService::new(SqliteTaskRepository::new(&pool), Classifier::new(generator));

    for description in ["milk", "eggs", "flour"] {
        service.add_task(description).unwrap();
    }

    let tasks = service.list_all().unwrap();
    assert_eq!(tasks.len(), 3);
    for task in tasks {
        assert!(Category::ALL.contains(&task.category));
        assert!(Priority::ALL.contains(&task.priority));
    }
}

#[test]
fn toggle_twice_restores_original_state() {
    let pool = ConnectionPool::in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&pool), Classifier::fallback_only());

    let task = service.add_task("water plants").unwrap();
    assert!(!task.done);

    let toggled = service.toggle(task.id).unwrap();
    assert!(toggled.done);
    let restored = service.toggle(task.id).unwrap();
    assert!(!restored.done);

    let stored = service.list_all().unwrap();
    assert!(!stored[0].done);
}

#[test]
fn toggle_and_remove_on_missing_task_return_not_found() {
    let pool = ConnectionPool::in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&pool), Classifier::fallback_only());

    assert!(matches!(
        service.toggle(7).unwrap_err(),
        TaskServiceError::TaskNotFound(7)
    ));
    assert!(matches!(
        service.remove(7).unwrap_err(),
        TaskServiceError::TaskNotFound(7)
    ));
    assert!(matches!(
        service.set_done(7, true).unwrap_err(),
        TaskServiceError::TaskNotFound(7)
    ));
}

#[test]
fn removed_task_never_reappears_in_listing() {
    let pool = ConnectionPool::in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&pool), Classifier::fallback_only());

    let first = service.add_task("first").unwrap();
    let second = service.add_task("second").unwrap();
    service.remove(first.id).unwrap();

    let ids: Vec<_> = service.list_all().unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![second.id]);
}

#[test]
fn list_sorts_by_priority_and_hides_completed() {
    let pool = ConnectionPool::in_memory().unwrap();
    let generator = PriorityQueueGenerator {
        replies: Mutex::new(vec!["Low", "High", "Medium", "High"]),
    };
    let service = TaskService::new(SqliteTaskRepository::new(&pool), Classifier::new(generator));

    let low = service.add_task("low").unwrap();
    service.add_task("high one").unwrap();
    service.add_task("medium").unwrap();
    let high_two = service.add_task("high two").unwrap();

    let by_priority = service
        .list(&TaskListQuery {
            show_completed: true,
            sort: SortKey::Priority,
        })
        .unwrap();
    let priorities: Vec<_> = by_priority.iter().map(|t| t.priority).collect();
    assert_eq!(
        priorities,
        vec![Priority::High, Priority::High, Priority::Medium, Priority::Low]
    );

    service.set_done(low.id, true).unwrap();
    service.set_done(high_two.id, true).unwrap();

    let pending = service
        .list(&TaskListQuery {
            show_completed: false,
            sort: SortKey::Newest,
        })
        .unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|t| !t.done));
}

#[test]
fn stats_reflect_all_tasks() {
    let pool = ConnectionPool::in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&pool), Classifier::fallback_only());

    let first = service.add_task("one").unwrap();
    service.add_task("two").unwrap();
    service.toggle(first.id).unwrap();

    let stats = service.stats().unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 1);
    assert!((stats.completion_rate - 50.0).abs() < f64::EPSILON);
    assert!(stats
        .by_category
        .contains(&(Category::Personal, 2)));
}

#[test]
fn service_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TaskService<SqliteTaskRepository<'static>>>();

    let dir = tempfile::tempdir().unwrap();
    let pool = ConnectionPool::new(
        tasklist_core::DbTarget::File(dir.path().join("service.db")),
        2,
    )
    .unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&pool), Classifier::fallback_only());

    std::thread::scope(|scope| {
        for n in 0..3 {
            let service = &service;
            scope.spawn(move || service.add_task(&format!("errand {n}")).unwrap());
        }
    });

    assert_eq!(service.list_all().unwrap().len(), 3);
}
