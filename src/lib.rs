pub mod checks;
pub mod github;
pub mod reference;
pub mod table;
