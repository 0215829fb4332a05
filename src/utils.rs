use bytes::Bytes;
use http::Response;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::Incoming;

pub type HyperResponse = hyper::Response<BoxBody<Bytes, String>>;

pub fn from_incoming_body(response: Response<Incoming>) -> HyperResponse {
    let (parts, body) = response.into_parts();

    let box_body = body.map_err(|e| e.to_string()).boxed();

    Response::from_parts(parts, box_body)
}

pub fn into_full_body_response(response: Response<Bytes>) -> HyperResponse {
    let (parts, body) = response.into_parts();

    let body = Full::new(body).map_err(|e| e.to_string()).boxed();
    Response::from_parts(parts, body)
}
