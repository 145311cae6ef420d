pub mod builder;
pub mod cli;
pub mod config;
pub mod files;
pub mod params;
pub mod run;
pub mod util;
