// lib.rs

pub mod addressbook;
pub mod calc;
pub mod completion;
pub mod config;
pub mod convert;
pub mod csv;
pub mod files;
pub mod habits;
pub mod history;
pub mod notes;
pub mod repl;
pub mod screens;
pub mod store;
pub mod table;
pub mod tasks;
pub mod text;
pub mod tictactoe;
pub mod timer;
pub mod util;
