//! Public API exports for the CLI module

pub use crate::app::cli::args::{initial_color_choice, Args, Command};
pub use crate::app::cli::config::{
    default_config_path, default_data_dir, load_config_file, unknown_keys, Settings,
};
pub use crate::app::cli::display::{
    render_analytics, render_history, render_history_in, render_product, render_recent,
    render_session_event, render_suggestions, truncate_name, RANKED_NAME_WIDTH,
};
