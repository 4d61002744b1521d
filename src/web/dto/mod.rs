pub mod catalog;
pub mod contents;
pub mod modules;
