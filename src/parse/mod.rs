mod deserialize;
mod serialize;

pub use deserialize::{open, Rows};
pub use serialize::ProvisioningRequest;
