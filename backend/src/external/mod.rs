//! External API integrations

pub mod media;

pub use media::MediaClient;
