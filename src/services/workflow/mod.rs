pub mod actions;
pub mod machine;
