mod calls;

use std::path::Path;

use megaplan::{ApiVersion, Config};

pub const ACCESS_TOKEN_PATH: &str = "/api/v3/auth/access_token";

pub fn config(token_file: &Path) -> Config {
    Config::new("example.megaplan.ru")
        .with_api_version(ApiVersion::V3)
        .with_token_file(token_file.to_string_lossy())
}
