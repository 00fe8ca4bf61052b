//! Root of all SeaORM entity modules: the data model of the commercial CRM.
//! The structure follows the original relational model (users and their
//! role profiles, active clients vs. prospects, rendered services, monthly
//! goals, tasks and the prospecting funnel) adapted for Rust's type system
//! and the SeaORM framework.

pub mod client;
pub mod goal;
pub mod profile;
pub mod prospect;
pub mod prospecting;
pub mod prospecting_action;
pub mod service;
pub mod service_kind;
pub mod task;
pub mod task_action;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::client::Entity as Client;
    pub use super::goal::Entity as Goal;
    pub use super::profile::Entity as Profile;
    pub use super::prospect::Entity as Prospect;
    pub use super::prospecting::Entity as Prospecting;
    pub use super::prospecting_action::Entity as ProspectingAction;
    pub use super::service::Entity as Service;
    pub use super::service_kind::Entity as ServiceKind;
    pub use super::task::Entity as Task;
    pub use super::task_action::Entity as TaskAction;
    pub use super::user::Entity as User;
}
