pub mod delete;
pub mod evaluate;
pub mod interactive;
pub mod list;
pub mod train;
