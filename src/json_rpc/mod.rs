mod json_rpc_params;
pub use json_rpc_params::*;
mod json_rpc_envelope;
pub use json_rpc_envelope::*;
mod event_name;
pub use event_name::*;

pub const JSON_RPC_ENDPOINT: &str = "/jsonrpc";
pub const AUTHENTICATE_ENDPOINT: &str = "/web/session/authenticate";
pub const VERSION_INFO_ENDPOINT: &str = "/web/webclient/version_info";
