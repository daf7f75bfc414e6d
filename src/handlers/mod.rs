mod redirect;

pub use redirect::{check_redirect_handler, create_handler, redirect_handler, stats_handler};
