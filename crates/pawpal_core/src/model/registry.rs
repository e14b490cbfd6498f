use crate::error::AppError;
use crate::model::{Task, TaskCollection, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use time::Date;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PetId(String);

impl PetId {
    pub fn generate() -> Self {
        Self(format!("pet-{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PetId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tasks: TaskCollection,
}

impl Pet {
    pub fn new(name: &str, species: &str, age: u32) -> Result<Self, AppError> {
        let name = required(name, "pet name")?;
        let species = required(species, "species")?;

        Ok(Self {
            id: PetId::generate(),
            name,
            species,
            age,
            notes: String::new(),
            tasks: TaskCollection::new(),
        })
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.trim().to_string();
        self
    }

    /// Attaches the task to this pet, stamping its `pet_id`. Only the
    /// registry calls this, after checking the id is unused everywhere.
    pub(crate) fn add_task(&mut self, mut task: Task) -> Result<(), AppError> {
        task.pet_id = Some(self.id.clone());
        self.tasks.add(task)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    #[serde(default)]
    pub pets: Vec<Pet>,
}

impl Owner {
    pub fn new(name: &str) -> Result<Self, AppError> {
        Ok(Self {
            name: required(name, "owner name")?,
            pets: Vec::new(),
        })
    }

    pub fn add_pet(&mut self, pet: Pet) -> Result<&Pet, AppError> {
        if self.pets.iter().any(|existing| existing.name == pet.name) {
            return Err(AppError::validation(format!(
                "pet '{}' already exists for owner '{}'",
                pet.name, self.name
            )));
        }

        self.pets.push(pet);
        let index = self.pets.len() - 1;
        Ok(&self.pets[index])
    }

    pub fn remove_pet(&mut self, name: &str) -> Result<Pet, AppError> {
        let index = self
            .pets
            .iter()
            .position(|pet| pet.name == name.trim())
            .ok_or_else(|| self.missing_pet(name))?;
        Ok(self.pets.remove(index))
    }

    pub fn pet(&self, name: &str) -> Result<&Pet, AppError> {
        self.pets
            .iter()
            .find(|pet| pet.name == name.trim())
            .ok_or_else(|| self.missing_pet(name))
    }

    pub fn pet_mut(&mut self, name: &str) -> Result<&mut Pet, AppError> {
        let missing = self.missing_pet(name);
        self.pets
            .iter_mut()
            .find(|pet| pet.name == name.trim())
            .ok_or(missing)
    }

    pub fn all_tasks(&self) -> Vec<Task> {
        self.pets
            .iter()
            .flat_map(|pet| pet.tasks.all().iter().cloned())
            .collect()
    }

    fn missing_pet(&self, name: &str) -> AppError {
        AppError::not_found(format!(
            "pet '{}' not found for owner '{}'",
            name.trim(),
            self.name
        ))
    }
}

/// Result of completing a task through the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub completed: Task,
    pub next: Option<Task>,
}

/// Owners, their pets and every pet's tasks.
///
/// The registry is a plain value; callers own it and pass it where it is
/// needed, so independent registries never interfere.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    owners: Vec<Owner>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owners(&self) -> &[Owner] {
        &self.owners
    }

    pub fn add_owner(&mut self, name: &str) -> Result<&Owner, AppError> {
        let owner = Owner::new(name)?;
        if self.owners.iter().any(|existing| existing.name == owner.name) {
            return Err(AppError::validation(format!(
                "owner '{}' already exists",
                owner.name
            )));
        }

        self.owners.push(owner);
        let index = self.owners.len() - 1;
        Ok(&self.owners[index])
    }

    pub fn remove_owner(&mut self, name: &str) -> Result<Owner, AppError> {
        let index = self
            .owners
            .iter()
            .position(|owner| owner.name == name.trim())
            .ok_or_else(|| missing_owner(name))?;
        Ok(self.owners.remove(index))
    }

    pub fn owner(&self, name: &str) -> Result<&Owner, AppError> {
        self.owners
            .iter()
            .find(|owner| owner.name == name.trim())
            .ok_or_else(|| missing_owner(name))
    }

    pub(crate) fn owner_mut(&mut self, name: &str) -> Result<&mut Owner, AppError> {
        self.owners
            .iter_mut()
            .find(|owner| owner.name == name.trim())
            .ok_or_else(|| missing_owner(name))
    }

    pub fn pet(&self, owner: &str, pet: &str) -> Result<&Pet, AppError> {
        self.owner(owner)?.pet(pet)
    }

    pub(crate) fn pet_mut(&mut self, owner: &str, pet: &str) -> Result<&mut Pet, AppError> {
        self.owner_mut(owner)?.pet_mut(pet)
    }

    /// Registers a pet under an owner. Pet and task ids it carries must be
    /// unused across the whole registry.
    pub fn add_pet(&mut self, owner: &str, mut pet: Pet) -> Result<&Pet, AppError> {
        if self.pets().any(|existing| existing.id == pet.id) {
            return Err(AppError::validation(format!(
                "pet id '{}' already exists",
                pet.id
            )));
        }
        if let Some(task) = pet
            .tasks
            .all()
            .iter()
            .find(|task| self.find_task(&task.id).is_ok())
        {
            return Err(AppError::validation(format!(
                "task '{}' already exists",
                task.id
            )));
        }

        pet.tasks.assign_pet(&pet.id);
        self.owner_mut(owner)?.add_pet(pet)
    }

    pub fn remove_pet(&mut self, owner: &str, pet: &str) -> Result<Pet, AppError> {
        self.owner_mut(owner)?.remove_pet(pet)
    }

    /// Maps every registered pet to its `owner/pet` display label.
    pub fn pet_labels(&self) -> HashMap<PetId, String> {
        self.owners
            .iter()
            .flat_map(|owner| {
                owner
                    .pets
                    .iter()
                    .map(move |pet| (pet.id.clone(), format!("{}/{}", owner.name, pet.name)))
            })
            .collect()
    }

    pub fn schedule_task(&mut self, owner: &str, pet: &str, task: Task) -> Result<Task, AppError> {
        if self.find_task(&task.id).is_ok() {
            return Err(AppError::validation(format!(
                "task '{}' already exists",
                task.id
            )));
        }

        let pet = self.pet_mut(owner, pet)?;
        let id = task.id.clone();
        pet.add_task(task)?;
        pet.tasks
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("task '{id}' not found")))
    }

    pub fn find_task(&self, id: &TaskId) -> Result<&Task, AppError> {
        self.pets()
            .find_map(|pet| pet.tasks.get(id))
            .ok_or_else(|| missing_task(id))
    }

    pub fn remove_task(&mut self, id: &TaskId) -> Result<Task, AppError> {
        let pet = self.pet_holding_mut(id)?;
        pet.tasks.remove(id)
    }

    /// Completes the task wherever it lives; the next occurrence of a
    /// recurring task lands in the same pet's collection.
    pub fn complete_task(&mut self, id: &TaskId) -> Result<Completion, AppError> {
        let pet = self.pet_holding_mut(id)?;
        let next = pet.tasks.mark_done(id)?;
        let completed = pet
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| missing_task(id))?;

        Ok(Completion { completed, next })
    }

    pub fn all_tasks(&self) -> Vec<Task> {
        self.owners.iter().flat_map(Owner::all_tasks).collect()
    }

    pub fn tasks_on(&self, date: Date) -> Vec<Task> {
        self.pets().flat_map(|pet| pet.tasks.due_on(date)).collect()
    }

    /// Checks the invariants a deserialized registry cannot enforce on its
    /// own and re-links every task to the pet holding it.
    pub fn validate(&mut self) -> Result<(), AppError> {
        let mut owner_names = HashSet::new();
        let mut pet_ids = HashSet::new();
        let mut task_ids = HashSet::new();

        for owner in &mut self.owners {
            if owner.name.trim().is_empty() {
                return Err(AppError::invalid_data("owner name is empty"));
            }
            if !owner_names.insert(owner.name.clone()) {
                return Err(AppError::invalid_data(format!(
                    "duplicate owner '{}'",
                    owner.name
                )));
            }

            let mut pet_names = HashSet::new();
            for pet in &mut owner.pets {
                if pet.name.trim().is_empty() {
                    return Err(AppError::invalid_data("pet name is empty"));
                }
                if !pet_names.insert(pet.name.clone()) {
                    return Err(AppError::invalid_data(format!(
                        "duplicate pet '{}' for owner '{}'",
                        pet.name, owner.name
                    )));
                }
                if !pet_ids.insert(pet.id.clone()) {
                    return Err(AppError::invalid_data(format!("duplicate pet id '{}'", pet.id)));
                }

                for task in pet.tasks.all() {
                    if task.title.trim().is_empty() {
                        return Err(AppError::invalid_data(format!(
                            "task '{}' has an empty title",
                            task.id
                        )));
                    }
                    if !task_ids.insert(task.id.clone()) {
                        return Err(AppError::invalid_data(format!(
                            "duplicate task id '{}'",
                            task.id
                        )));
                    }
                }
                pet.tasks.assign_pet(&pet.id);
            }
        }

        Ok(())
    }

    fn pets(&self) -> impl Iterator<Item = &Pet> {
        self.owners.iter().flat_map(|owner| owner.pets.iter())
    }

    fn pet_holding_mut(&mut self, id: &TaskId) -> Result<&mut Pet, AppError> {
        self.owners
            .iter_mut()
            .flat_map(|owner| owner.pets.iter_mut())
            .find(|pet| pet.tasks.contains(id))
            .ok_or_else(|| missing_task(id))
    }
}

fn required(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn missing_owner(name: &str) -> AppError {
    AppError::not_found(format!("owner '{}' not found", name.trim()))
}

fn missing_task(id: &TaskId) -> AppError {
    AppError::not_found(format!("task '{id}' not found"))
}
