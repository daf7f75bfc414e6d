mod redirect;

pub use redirect::{
    AddRedirectForm, CheckRedirectForm, RedirectEntry, SiteInfo, StatsQuery, StatsSnapshot,
};
