//! Database entities.

#![allow(missing_docs)]

pub mod answer;
pub mod question;
pub mod reputation_change;
pub mod user;
pub mod vote;

pub use answer::Entity as Answer;
pub use question::Entity as Question;
pub use reputation_change::Entity as ReputationChange;
pub use user::Entity as User;
pub use vote::Entity as Vote;
