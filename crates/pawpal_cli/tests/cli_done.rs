use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("pawpal-{nanos}-{file_name}"))
}

fn write_store(path: &PathBuf, tasks: serde_json::Value) {
    let content = serde_json::json!({
        "schema_version": 1,
        "owners": [
            {
                "name": "Taylor",
                "pets": [
                    {
                        "id": "pet-fido",
                        "name": "Fido",
                        "species": "dog",
                        "tasks": tasks
                    }
                ]
            }
        ]
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn read_tasks(path: &PathBuf) -> Vec<serde_json::Value> {
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    stored["owners"][0]["pets"][0]["tasks"]
        .as_array()
        .cloned()
        .expect("tasks array")
}

fn run(store_path: &PathBuf, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pawpal"))
        .args(args)
        .env("PAWPAL_STORE_PATH", store_path)
        .env("PAWPAL_CONFIG_PATH", temp_path("missing-config.json"))
        .output()
        .expect("failed to run pawpal")
}

#[test]
fn done_on_daily_task_schedules_next_day() {
    let store_path = temp_path("cli-done-daily.json");
    write_store(
        &store_path,
        serde_json::json!([
            {
                "id": "task-1",
                "title": "Feed",
                "due_at": "2024-01-01T08:00:00",
                "priority": 2,
                "status": "pending",
                "recurrence": "daily"
            }
        ]),
    );

    let output = run(&store_path, &["done", "task-1"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Completed task: Feed (task-1)"));
    assert!(stdout.contains("Next occurrence: Feed"));
    assert!(stdout.contains("at 2024-01-02 08:00"));

    let tasks = read_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["status"], "done");
    assert_eq!(tasks[1]["status"], "pending");
    assert_eq!(tasks[1]["due_at"], "2024-01-02T08:00:00");
    assert_eq!(tasks[1]["priority"], 2);
    assert_eq!(tasks[1]["recurrence"], "daily");
    assert_eq!(tasks[1]["pet_id"], "pet-fido");
    assert_ne!(tasks[1]["id"], "task-1");
}

#[test]
fn done_on_weekly_task_reports_next_in_json() {
    let store_path = temp_path("cli-done-weekly.json");
    write_store(
        &store_path,
        serde_json::json!([
            {
                "id": "task-1",
                "title": "Bath",
                "due_at": "2024-01-01T18:30:00",
                "status": "pending",
                "recurrence": "weekly"
            }
        ]),
    );

    let output = run(&store_path, &["done", "task-1", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["completed"]["status"], "done");
    assert_eq!(payload["next"]["due_at"], "2024-01-08T18:30:00");
    assert_eq!(payload["next"]["status"], "pending");
}

#[test]
fn done_on_one_off_task_spawns_nothing() {
    let store_path = temp_path("cli-done-once.json");
    write_store(
        &store_path,
        serde_json::json!([
            {
                "id": "task-1",
                "title": "Vet",
                "due_at": "2024-01-01T10:00:00",
                "status": "pending"
            }
        ]),
    );

    let output = run(&store_path, &["done", "task-1"]);
    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Next occurrence"));

    let tasks = read_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["status"], "done");
}

#[test]
fn done_twice_does_not_spawn_again() {
    let store_path = temp_path("cli-done-twice.json");
    write_store(
        &store_path,
        serde_json::json!([
            {
                "id": "task-1",
                "title": "Feed",
                "due_at": "2024-01-01T08:00:00",
                "status": "pending",
                "recurrence": "daily"
            }
        ]),
    );

    assert!(run(&store_path, &["done", "task-1"]).status.success());
    let second = run(&store_path, &["done", "task-1"]);
    assert!(second.status.success());
    assert!(!String::from_utf8_lossy(&second.stdout).contains("Next occurrence"));

    let tasks = read_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();
    assert_eq!(tasks.len(), 2);
}

#[test]
fn done_unknown_task_is_not_found() {
    let store_path = temp_path("cli-done-missing.json");
    write_store(&store_path, serde_json::json!([]));

    let output = run(&store_path, &["done", "task-404"]);
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: not_found"));
}
