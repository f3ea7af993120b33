pub mod signed_url;
pub mod stream;
pub mod videos;
