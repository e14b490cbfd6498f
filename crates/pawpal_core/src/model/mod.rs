mod collection;
mod registry;
mod task;

pub use collection::TaskCollection;
pub use registry::{Completion, Owner, Pet, PetId, Registry};
pub use task::{Priority, Task, TaskId, TaskStatus};
