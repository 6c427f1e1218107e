pub mod canonical;
pub mod check;
