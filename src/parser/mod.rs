//! Parser module - reads request parameters from the command line and files

mod args;
mod params_file;

pub use args::{parse_param_arg, parse_param_args, parse_value};
pub use params_file::{load_params_file, parse_json_params, parse_yaml_params};
