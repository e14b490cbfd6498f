use pawpal_core::care_api::PlanResult;
use pawpal_core::config::Palette;
use pawpal_core::model::{Completion, Owner, Pet, PetId, Priority, Task};
use pawpal_core::scheduler::ConflictGroup;
use pawpal_core::timestamp::{format_date, format_due_at, format_due_at_iso, format_time_of_day};
use std::collections::HashMap;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Task")]
    title: String,
    #[tabled(rename = "Pet")]
    pet: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Repeat")]
    repeat: String,
    #[tabled(rename = "Id")]
    id: String,
}

#[derive(Tabled)]
struct PetRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "Age")]
    age: u32,
    #[tabled(rename = "Tasks")]
    tasks: usize,
    #[tabled(rename = "Notes")]
    notes: String,
}

fn pet_label(labels: &HashMap<PetId, String>, task: &Task) -> String {
    task.pet_id
        .as_ref()
        .and_then(|pet_id| labels.get(pet_id))
        .cloned()
        .unwrap_or_else(|| "-".to_string())
}

fn priority_label(priority: Priority) -> String {
    if priority == Priority::HIGHEST {
        format!("{priority} (urgent)")
    } else {
        priority.to_string()
    }
}

pub fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "title": task.title,
        "due_at": format_due_at_iso(task.due_at),
        "priority": task.priority,
        "status": task.status,
        "recurrence": task.recurrence,
        "pet_id": task.pet_id,
    })
}

pub fn print_task_json(task: &Task) {
    println!("{}", task_json(task));
}

pub fn print_task_plain(task: &Task) {
    println!("id:         {}", task.id);
    println!("title:      {}", task.title);
    println!("due:        {}", format_due_at(task.due_at));
    println!("priority:   {}", priority_label(task.priority));
    println!("status:     {}", task.status.as_str());
    println!("repeat:     {}", task.recurrence);
}

pub fn print_completion(completion: &Completion, json: bool) {
    if json {
        let payload = serde_json::json!({
            "completed": task_json(&completion.completed),
            "next": completion.next.as_ref().map(task_json),
        });
        println!("{payload}");
        return;
    }

    println!(
        "Completed task: {} ({})",
        completion.completed.title, completion.completed.id
    );
    if let Some(next) = completion.next.as_ref() {
        println!(
            "Next occurrence: {} ({}) at {}",
            next.title,
            next.id,
            format_due_at(next.due_at)
        );
    }
}

pub fn print_owners(owners: &[Owner], json: bool) {
    if json {
        let payload: Vec<_> = owners
            .iter()
            .map(|owner| {
                serde_json::json!({
                    "name": owner.name,
                    "pets": owner.pets.iter().map(|pet| pet.name.as_str()).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(payload));
        return;
    }

    if owners.is_empty() {
        println!("No owners registered.");
        return;
    }
    for owner in owners {
        let pets: Vec<_> = owner.pets.iter().map(|pet| pet.name.as_str()).collect();
        if pets.is_empty() {
            println!("{} (no pets)", owner.name);
        } else {
            println!("{} ({})", owner.name, pets.join(", "));
        }
    }
}

pub fn pet_json(pet: &Pet) -> serde_json::Value {
    serde_json::json!({
        "id": pet.id,
        "name": pet.name,
        "species": pet.species,
        "age": pet.age,
        "notes": pet.notes,
        "tasks": pet.tasks.len(),
    })
}

pub fn print_pets(pets: &[Pet], json: bool) {
    if json {
        let payload: Vec<_> = pets.iter().map(pet_json).collect();
        println!("{}", serde_json::Value::Array(payload));
        return;
    }

    if pets.is_empty() {
        println!("No pets registered.");
        return;
    }
    let rows = pets.iter().map(|pet| PetRow {
        name: pet.name.clone(),
        species: pet.species.clone(),
        age: pet.age,
        tasks: pet.tasks.len(),
        notes: pet.notes.clone(),
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!("{table}");
}

fn conflict_line(group: &ConflictGroup, labels: &HashMap<PetId, String>) -> String {
    let parts: Vec<_> = group
        .tasks
        .iter()
        .map(|task| format!("{}:{} ({})", pet_label(labels, task), task.title, task.id))
        .collect();
    format!(
        "Conflict at {}: {}",
        format_due_at(group.due_at),
        parts.join(", ")
    )
}

fn conflicts_json(conflicts: &[ConflictGroup]) -> serde_json::Value {
    conflicts
        .iter()
        .map(|group| {
            serde_json::json!({
                "due_at": format_due_at_iso(group.due_at),
                "task_ids": group.tasks.iter().map(|task| task.id.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect()
}

pub fn print_conflicts(result: &PlanResult, palette: &Palette, json: bool) {
    let plan = &result.plan;
    if json {
        println!("{}", conflicts_json(&plan.conflicts));
        return;
    }

    if plan.conflicts.is_empty() {
        println!("No conflicts on {}.", format_date(plan.date));
        return;
    }
    for group in &plan.conflicts {
        println!("{}", palette.accentize(&conflict_line(group, &result.pet_labels)));
    }
}

pub fn print_plan(result: &PlanResult, palette: &Palette, json: bool) {
    let plan = &result.plan;
    if json {
        let tasks: Vec<_> = plan
            .tasks
            .iter()
            .map(|task| {
                let mut value = task_json(task);
                value["pet"] = serde_json::Value::String(pet_label(&result.pet_labels, task));
                value
            })
            .collect();
        let payload = serde_json::json!({
            "date": format_date(plan.date),
            "tasks": tasks,
            "conflicts": conflicts_json(&plan.conflicts),
        });
        println!("{payload}");
        return;
    }

    if plan.tasks.is_empty() {
        println!("No tasks scheduled for {}.", format_date(plan.date));
        return;
    }

    println!("{}", palette.mutedize(&format!("Plan for {}", format_date(plan.date))));
    let rows = plan.tasks.iter().map(|task| PlanRow {
        time: format_time_of_day(task.due_at),
        title: task.title.clone(),
        pet: pet_label(&result.pet_labels, task),
        priority: priority_label(task.priority),
        status: task.status.as_str().to_string(),
        repeat: task.recurrence.to_string(),
        id: task.id.to_string(),
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!("{table}");

    for group in &plan.conflicts {
        println!(
            "{}",
            palette.accentize(&format!("WARNING: {}", conflict_line(group, &result.pet_labels)))
        );
    }
}
