// handlers/mod.rs - One module per resource
//
// Each resource exposes list/create/get/update/delete against its own
// collection. There is no layer between a handler and the store.

pub mod classrooms;
pub mod courses;
pub mod notes;
pub mod system;
pub mod users;
pub mod utils;
