use crate::error::AppError;
use crate::model::{Completion, Owner, Pet, PetId, Task, TaskId, TaskStatus};
use crate::recurrence::Recurrence;
use crate::scheduler::{DailyPlan, TaskFilter, build_daily_plan};
use crate::storage::json_store;
use std::collections::HashMap;
use std::path::Path;
use time::{Date, PrimitiveDateTime};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct NewPet {
    pub name: String,
    pub species: String,
    pub age: u32,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub due_at: PrimitiveDateTime,
    pub priority: u8,
    pub recurrence: Recurrence,
}

#[derive(Debug, Clone, Default)]
pub struct PlanQuery {
    pub date: Option<Date>,
    pub status: Option<TaskStatus>,
    /// `(owner, pet)` names of the only pet to include.
    pub pet: Option<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct PlanResult {
    pub plan: DailyPlan,
    pub pet_labels: HashMap<PetId, String>,
}

pub fn add_owner(name: &str) -> Result<Owner, AppError> {
    let path = json_store::store_path()?;
    add_owner_with_path(&path, name)
}

pub fn remove_owner(name: &str) -> Result<Owner, AppError> {
    let path = json_store::store_path()?;
    remove_owner_with_path(&path, name)
}

pub fn list_owners() -> Result<Vec<Owner>, AppError> {
    let path = json_store::store_path()?;
    list_owners_with_path(&path)
}

pub fn add_pet(owner: &str, pet: &NewPet) -> Result<Pet, AppError> {
    let path = json_store::store_path()?;
    add_pet_with_path(&path, owner, pet)
}

pub fn remove_pet(owner: &str, pet: &str) -> Result<Pet, AppError> {
    let path = json_store::store_path()?;
    remove_pet_with_path(&path, owner, pet)
}

pub fn list_pets(owner: &str) -> Result<Vec<Pet>, AppError> {
    let path = json_store::store_path()?;
    list_pets_with_path(&path, owner)
}

pub fn add_task(owner: &str, pet: &str, task: &NewTask) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    add_task_with_path(&path, owner, pet, task)
}

pub fn remove_task(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    remove_task_with_path(&path, id)
}

pub fn get_task(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    get_task_with_path(&path, id)
}

pub fn complete_task(id: &str) -> Result<Completion, AppError> {
    let path = json_store::store_path()?;
    complete_task_with_path(&path, id)
}

pub fn daily_plan(query: &PlanQuery) -> Result<PlanResult, AppError> {
    let path = json_store::store_path()?;
    daily_plan_with_path(&path, query)
}

fn add_owner_with_path(path: &Path, name: &str) -> Result<Owner, AppError> {
    let mut registry = json_store::load_registry(path)?;
    let owner = registry.add_owner(name)?.clone();
    json_store::save_registry(path, &registry)?;
    info!(owner = %owner.name, "owner added");

    Ok(owner)
}

fn remove_owner_with_path(path: &Path, name: &str) -> Result<Owner, AppError> {
    let mut registry = json_store::load_registry(path)?;
    let removed = registry.remove_owner(name)?;
    json_store::save_registry(path, &registry)?;
    info!(owner = %removed.name, "owner removed");

    Ok(removed)
}

fn list_owners_with_path(path: &Path) -> Result<Vec<Owner>, AppError> {
    Ok(json_store::load_registry(path)?.owners().to_vec())
}

fn add_pet_with_path(path: &Path, owner: &str, pet: &NewPet) -> Result<Pet, AppError> {
    let new_pet = Pet::new(&pet.name, &pet.species, pet.age)?.with_notes(&pet.notes);

    let mut registry = json_store::load_registry(path)?;
    let added = registry.add_pet(owner, new_pet)?.clone();
    json_store::save_registry(path, &registry)?;
    info!(owner = owner.trim(), pet = %added.name, "pet added");

    Ok(added)
}

fn remove_pet_with_path(path: &Path, owner: &str, pet: &str) -> Result<Pet, AppError> {
    let mut registry = json_store::load_registry(path)?;
    let removed = registry.remove_pet(owner, pet)?;
    json_store::save_registry(path, &registry)?;
    info!(owner = owner.trim(), pet = %removed.name, "pet removed");

    Ok(removed)
}

fn list_pets_with_path(path: &Path, owner: &str) -> Result<Vec<Pet>, AppError> {
    let registry = json_store::load_registry(path)?;
    Ok(registry.owner(owner)?.pets.clone())
}

fn add_task_with_path(
    path: &Path,
    owner: &str,
    pet: &str,
    task: &NewTask,
) -> Result<Task, AppError> {
    let new_task = Task::new(&task.title, task.due_at, task.priority, task.recurrence)?;

    let mut registry = json_store::load_registry(path)?;
    let scheduled = registry.schedule_task(owner, pet, new_task)?;
    json_store::save_registry(path, &registry)?;
    info!(task_id = %scheduled.id, owner = owner.trim(), pet = pet.trim(), "task scheduled");

    Ok(scheduled)
}

fn remove_task_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    let task_id = parse_task_id(id)?;

    let mut registry = json_store::load_registry(path)?;
    let removed = registry.remove_task(&task_id)?;
    json_store::save_registry(path, &registry)?;
    info!(task_id = %removed.id, "task removed");

    Ok(removed)
}

fn get_task_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    let task_id = parse_task_id(id)?;
    let registry = json_store::load_registry(path)?;
    registry.find_task(&task_id).cloned()
}

fn complete_task_with_path(path: &Path, id: &str) -> Result<Completion, AppError> {
    let task_id = parse_task_id(id)?;

    let mut registry = json_store::load_registry(path)?;
    let was_done = registry.find_task(&task_id)?.is_done();
    let completion = registry.complete_task(&task_id)?;
    if !was_done {
        json_store::save_registry(path, &registry)?;
        info!(
            task_id = %completion.completed.id,
            next = completion.next.as_ref().map(|task| task.id.as_str()),
            "task completed"
        );
    }

    Ok(completion)
}

fn daily_plan_with_path(path: &Path, query: &PlanQuery) -> Result<PlanResult, AppError> {
    let registry = json_store::load_registry(path)?;
    let date = query.date.unwrap_or_else(crate::timestamp::today_local);

    let mut filter = TaskFilter {
        status: query.status,
        pet_id: None,
    };
    if let Some((owner, pet)) = query.pet.as_ref() {
        filter.pet_id = Some(registry.pet(owner, pet)?.id.clone());
    }

    let plan = build_daily_plan(&registry.tasks_on(date), date, &filter);
    let pet_labels = registry.pet_labels();

    Ok(PlanResult { plan, pet_labels })
}

fn parse_task_id(id: &str) -> Result<TaskId, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("id is required"));
    }
    Ok(TaskId::from(trimmed))
}
