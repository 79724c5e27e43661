//! Static classifiers: role accounts and free webmail providers.

mod free;
mod role;

pub use free::is_free_provider;
pub use role::is_role_account;
