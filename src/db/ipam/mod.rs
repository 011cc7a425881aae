mod helpers;
mod ip_addresses;
mod vrfs;

pub(crate) use helpers::resolve_tag_ids;
pub use ip_addresses::*;
pub use vrfs::*;
