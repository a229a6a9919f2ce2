pub mod accounts;
pub mod categories;
pub mod notes;
