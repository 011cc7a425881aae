mod dcim;
mod extras;
mod ipam;
mod jobs;
mod settings;
mod tenant;

pub use dcim::*;
pub use extras::*;
pub use ipam::*;
pub use jobs::*;
pub use settings::*;
pub use tenant::*;
