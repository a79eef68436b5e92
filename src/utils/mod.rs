pub mod config;
pub mod fd_limit;
pub mod logger;
pub mod stockcount_toml;

pub use config::*;
pub use fd_limit::max_workers_by_fd_limit;
pub use logger::setup_logging;
pub use stockcount_toml::{
    StockcountToml, apply_file_to_opts, load_stockcount_toml, parse_stockcount_toml,
};
