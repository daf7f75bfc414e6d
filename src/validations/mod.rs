mod redirect;

pub use redirect::{sanitize_key, validate_target, with_default_scheme};
