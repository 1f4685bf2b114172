pub mod args;
pub mod commands;
pub mod context;
pub mod handlers;
pub mod output;
pub mod utils;

pub use context::{RememberMeCliContext, SessionOptions};
pub use output::{
    CliColors, error_code, format_error, format_info, format_success, format_warning,
    output_error, output_error_json, print_json,
};
pub use utils::{find_family_member, find_memory, parse_contact, parse_date, resolve_memory_id};
