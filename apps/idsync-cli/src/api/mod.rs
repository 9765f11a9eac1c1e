//! HTTP implementation of the remote traits
//!
//! One [`ApiClient`] serves every remote capability: IDM configuration and
//! managed objects under `/openidm`, scripts and social providers under the
//! realm's `/json` path, and the log stream under `/monitoring`.

mod client;
mod idm;
mod idp;
mod logs;
pub mod realm;
mod scripts;

pub use client::{check_status, ApiClient, IDP_API_VERSION, SCRIPT_API_VERSION};
pub use realm::{realm_path, tenant_url};
