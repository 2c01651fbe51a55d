//! Backend collaborators the kernel talks to.

pub use idm_infra::{AccessApi, DomainsApi};
