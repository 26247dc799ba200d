pub mod stream;
pub mod tasks;
pub mod users;
