// lightpoke-api: wire layer for the LightPoke event stream

pub mod endpoint;
pub mod error;
pub mod framing;
pub mod protocol;
pub mod session;
pub mod transport;

pub use endpoint::{
    DEFAULT_SERVER_URL, Scheme, ServerEndpoint, is_valid_server_url, sanitize_server_url,
};
pub use error::Error;
pub use protocol::{PokeEvent, StreamEvent};
pub use reqwest::Method;
pub use session::StreamSession;
