pub mod draft;
pub mod experience;
pub mod session;
pub mod slot;
