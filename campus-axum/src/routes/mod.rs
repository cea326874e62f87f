pub mod bootstrap;
pub mod dashboard;
pub mod login;
pub mod records;
pub mod roster;
pub mod shared;
