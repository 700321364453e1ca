pub mod http_source;
pub mod ping;
pub mod util;

pub use http_source::HttpTransactionSource;
pub use ping::PingClient;
