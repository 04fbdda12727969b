pub mod agents;
pub mod health;
pub mod settings;
pub mod users;
pub mod verify;
