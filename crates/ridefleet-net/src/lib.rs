//! Hand-rolled HTTP/1.1 transport shared by every region participant and
//! the coordinator. No web framework: this layer parses exactly what the
//! external interfaces need (`GET`/`POST`/`DELETE`, a path, an optional
//! JSON body) and nothing more.

mod client;
mod message;
mod server;

pub use client::{send, NetError, RawResponse};
pub use message::{HttpRequest, HttpResponse, Method};
pub use server::{HttpServer, RequestHandler};
