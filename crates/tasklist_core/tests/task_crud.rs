use tasklist_core::{
    Category, ConnectionPool, DbTarget, NewTask, Priority, RepoError, SqliteTaskRepository,
    TaskRepository,
};

fn new_task(description: &str, category: Category, priority: Priority) -> NewTask {
    NewTask::new(description, category, priority).unwrap()
}

#[test]
fn insert_returns_stored_row_with_defaults() {
    let pool = ConnectionPool::in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&pool);

    let task = repo
        .insert_task(&new_task("buy groceries", Category::Personal, Priority::Low))
        .unwrap();

    assert!(task.id > 0);
    assert_eq!(task.description, "buy groceries");
    assert_eq!(task.category, Category::Personal);
    assert_eq!(task.priority, Priority::Low);
    assert!(!task.done);
    assert!(task.created_at > 0);

    let loaded = repo.get_task(task.id).unwrap().unwrap();
    assert_eq!(loaded, task);
}

#[test]
fn ids_are_unique_across_inserts() {
    let pool = ConnectionPool::in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&pool);

    let first = repo
        .insert_task(&new_task("a", Category::Work, Priority::High))
        .unwrap();
    let second = repo
        .insert_task(&new_task("b", Category::Work, Priority::High))
        .unwrap();
    assert_ne!(first.id, second.id);
}

#[test]
fn list_on_empty_store_is_empty() {
    let pool = ConnectionPool::in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&pool);

    assert!(repo.list_tasks().unwrap().is_empty());
}

#[test]
fn list_orders_newest_first() {
    let pool = ConnectionPool::in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&pool);

    let older = repo
        .insert_task(&new_task("older", Category::Study, Priority::Medium))
        .unwrap();
    let newer = repo
        .insert_task(&new_task("newer", Category::Study, Priority::Medium))
        .unwrap();
    let tied = repo
        .insert_task(&new_task("tied", Category::Study, Priority::Medium))
        .unwrap();

    {
        let conn = pool.acquire().unwrap();
        conn.execute(
            "UPDATE tasks SET created_at = 1000 WHERE id = ?1;",
            [older.id],
        )
        .unwrap();
        conn.execute(
            "UPDATE tasks SET created_at = 2000 WHERE id IN (?1, ?2);",
            [newer.id, tied.id],
        )
        .unwrap();
    }

    let ids: Vec<_> = repo.list_tasks().unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![tied.id, newer.id, older.id]);
}

#[test]
fn set_done_updates_status() {
    let pool = ConnectionPool::in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&pool);

    let task = repo
        .insert_task(&new_task("stretch", Category::Health, Priority::Low))
        .unwrap();
    repo.set_done(task.id, true).unwrap();
    assert!(repo.get_task(task.id).unwrap().unwrap().done);

    repo.set_done(task.id, false).unwrap();
    assert!(!repo.get_task(task.id).unwrap().unwrap().done);
}

#[test]
fn writes_to_missing_id_return_not_found() {
    let pool = ConnectionPool::in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&pool);

    let err = repo.set_done(42, true).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
    assert!(!err.is_storage());

    let err = repo.delete_task(42).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
    assert!(repo.get_task(42).unwrap().is_none());
}

#[test]
fn delete_removes_row_permanently() {
    let pool = ConnectionPool::in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&pool);

    let keep = repo
        .insert_task(&new_task("keep", Category::Work, Priority::High))
        .unwrap();
    let drop_me = repo
        .insert_task(&new_task("drop", Category::Work, Priority::High))
        .unwrap();

    repo.delete_task(drop_me.id).unwrap();

    let remaining = repo.list_tasks().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep.id);
    assert!(repo.get_task(drop_me.id).unwrap().is_none());
}

#[test]
fn invalid_persisted_state_is_rejected_on_read() {
    let pool = ConnectionPool::in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&pool);

    {
        let conn = pool.acquire().unwrap();
        conn.execute_batch(
            "PRAGMA ignore_check_constraints = ON;
             INSERT INTO tasks (description, priority, category) VALUES ('legacy', 'Urgent', 'Work');
             PRAGMA ignore_check_constraints = OFF;",
        )
        .unwrap();
    }

    let err = repo.list_tasks().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("Urgent")));
}

#[test]
fn file_backed_store_persists_across_pools() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");

    let id = {
        let pool = ConnectionPool::new(DbTarget::File(path.clone()), 2).unwrap();
        let repo = SqliteTaskRepository::new(&pool);
        repo.insert_task(&new_task("survive restart", Category::Study, Priority::High))
            .unwrap()
            .id
    };

    let pool = ConnectionPool::new(DbTarget::File(path), 2).unwrap();
    let repo = SqliteTaskRepository::new(&pool);
    let loaded = repo.get_task(id).unwrap().unwrap();
    assert_eq!(loaded.description, "survive restart");
}

#[test]
fn repository_releases_connection_after_each_call() {
    let pool = ConnectionPool::in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&pool);

    repo.insert_task(&new_task("one", Category::Work, Priority::Low))
        .unwrap();
    let _ = repo.set_done(999, true);
    repo.list_tasks().unwrap();

    assert_eq!(pool.idle_count(), 1);
}

#[test]
fn concurrent_inserts_share_one_file_pool() {
    let dir = tempfile::tempdir().unwrap();
    let pool = ConnectionPool::new(DbTarget::File(dir.path().join("shared.db")), 3).unwrap();

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let pool = &pool;
            scope.spawn(move || {
                let repo = SqliteTaskRepository::new(pool);
                for n in 0..5 {
                    repo.insert_task(&new_task(
                        &format!("worker {worker} task {n}"),
                        Category::Work,
                        Priority::Medium,
                    ))
                    .unwrap();
                }
            });
        }
    });

    let tasks = SqliteTaskRepository::new(&pool).list_tasks().unwrap();
    assert_eq!(tasks.len(), 20);
    assert!(pool.idle_count() <= pool.max_size());
}
