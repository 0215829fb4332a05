mod connector;
pub use connector::*;
mod hyper_rpc_transport;
pub use hyper_rpc_transport::*;
mod hyper_rpc_transport_inner;
pub use hyper_rpc_transport_inner::*;
mod tls;
pub use tls::*;
mod wrap_http1_endpoint;

pub type OdooHyperTransport = HyperRpcTransport<Box<dyn RpcStream>, EndpointConnector>;
