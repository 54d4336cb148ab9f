// Command handlers module
pub mod run;
