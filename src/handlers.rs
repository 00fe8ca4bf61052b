pub mod clients;
pub mod dashboard;
pub mod goals;
pub mod health;
pub mod prospecting;
pub mod prospects;
pub mod registry;
pub mod reports;
pub mod service_kinds;
pub mod services;
pub mod tasks;
pub mod users;
