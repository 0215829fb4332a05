mod error;
pub use error::*;

mod metric_event;
pub use metric_event::*;
mod metric_event_sink;
pub use metric_event_sink::*;

pub mod json_rpc;
pub use json_rpc::{JsonRpcParams, ServiceCall};

mod rpc_transport;
pub use rpc_transport::*;
mod instrumented_transport;
pub use instrumented_transport::*;

pub mod hyper_transport;

mod connection_params;
pub use connection_params::*;
mod settings;
pub use settings::*;

mod my_odoo_rpc_client;
pub use my_odoo_rpc_client::*;
mod client_factory;
pub use client_factory::*;

pub mod utils;
pub use utils::HyperResponse;
