//! Credential provisioning: job title, icon and access written onto ID cards.
pub mod credentials;

pub use credentials::{find_credential, job_access, provision_credentials, IdCard, Pda};
