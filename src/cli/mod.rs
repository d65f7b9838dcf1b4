pub mod output;

pub use output::{
    print_action, print_collections, print_error, print_info, print_personas, print_success,
    print_sync_report, print_targets, print_warning,
};
