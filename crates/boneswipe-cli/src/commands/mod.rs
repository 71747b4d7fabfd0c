pub mod check;
pub mod walk;
