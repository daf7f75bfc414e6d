mod redirect;

#[cfg(test)]
pub use redirect::MockRedirectStore;
pub use redirect::{RedirectRepository, RedirectStore};
