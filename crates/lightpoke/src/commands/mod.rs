pub mod check_url;
pub mod config_cmd;
pub mod poke;
pub mod run;
