pub mod settings;

pub use settings::{AllowedOrigins, Settings, TtlParseError, parse_ttl};
