//! Connection string parsing.
//!
//! Format: `endpoint=<host:port>;accessKey=<key>;secretKey=<key>;secure=<true|false>`.
//! Segments are separated by `;` and split on the first `=`. Keys are case-insensitive,
//! unknown keys and segments without `=` are ignored, and `secure` defaults to `false`
//! (any value that isn't a boolean also resolves to `false`).

use std::fmt;
use std::str::FromStr;

use homeblog_core::ConfigError;

/// Credentials and transport settings carried by a connection string.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub secure: bool,
}

impl ConnectionParams {
    /// Parse a connection string, failing if `endpoint`, `accessKey` or `secretKey` is
    /// missing or blank.
    pub fn parse(connection_string: &str) -> Result<Self, ConfigError> {
        let mut endpoint = None;
        let mut access_key = None;
        let mut secret_key = None;
        let mut secure = false;

        for segment in connection_string.split(';').filter(|s| !s.is_empty()) {
            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.to_string()),
                "accesskey" => access_key = Some(value.to_string()),
                "secretkey" => secret_key = Some(value.to_string()),
                "secure" => secure = value.to_lowercase().parse().unwrap_or(false),
                _ => {}
            }
        }

        fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingField(name))
        }

        Ok(ConnectionParams {
            endpoint: required(endpoint, "endpoint")?,
            access_key: required(access_key, "accessKey")?,
            secret_key: required(secret_key, "secretKey")?,
            secure,
        })
    }
}

impl FromStr for ConnectionParams {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConnectionParams::parse(s)
    }
}

/// Renders the wire format, secret included.
impl fmt::Display for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "endpoint={};accessKey={};secretKey={};secure={}",
            self.endpoint, self.access_key, self.secret_key, self.secure
        )
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("secure", &self.secure)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_fields_and_defaults_secure() {
        let params = ConnectionParams::parse("endpoint=localhost:9000;accessKey=ak;secretKey=sk")
            .unwrap();

        assert_eq!(params.endpoint, "localhost:9000");
        assert_eq!(params.access_key, "ak");
        assert_eq!(params.secret_key, "sk");
        assert!(!params.secure);
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        let err = ConnectionParams::parse("accessKey=ak;secretKey=sk").unwrap_err();
        assert_eq!(err, ConfigError::MissingField("endpoint"));
    }

    #[test]
    fn blank_keys_are_rejected() {
        assert_eq!(
            ConnectionParams::parse("endpoint=h;accessKey=  ;secretKey=sk").unwrap_err(),
            ConfigError::MissingField("accessKey")
        );
        assert_eq!(
            ConnectionParams::parse("endpoint=h;accessKey=ak").unwrap_err(),
            ConfigError::MissingField("secretKey")
        );
        assert_eq!(
            ConnectionParams::parse("").unwrap_err(),
            ConfigError::MissingField("endpoint")
        );
    }

    #[test]
    fn secure_flag() {
        let params = ConnectionParams::parse("endpoint=h;accessKey=ak;secretKey=sk;secure=true")
            .unwrap();
        assert!(params.secure);

        let params = ConnectionParams::parse("endpoint=h;accessKey=ak;secretKey=sk;secure=TRUE")
            .unwrap();
        assert!(params.secure);

        let params = ConnectionParams::parse("endpoint=h;accessKey=ak;secretKey=sk;secure=maybe")
            .unwrap();
        assert!(!params.secure);
    }

    #[test]
    fn keys_are_case_insensitive_and_whitespace_is_trimmed() {
        let params =
            ConnectionParams::parse(" ENDPOINT = minio:9000 ; AccessKEY=ak;SECRETkey= sk ;")
                .unwrap();

        assert_eq!(params.endpoint, "minio:9000");
        assert_eq!(params.access_key, "ak");
        assert_eq!(params.secret_key, "sk");
    }

    #[test]
    fn tolerates_empty_segments_malformed_pairs_and_unknown_keys() {
        let params = ConnectionParams::parse(
            ";;endpoint=h;garbage;region=eu-west-1;accessKey=ak;;secretKey=sk;",
        )
        .unwrap();

        assert_eq!(params.endpoint, "h");
        assert_eq!(params.access_key, "ak");
        assert_eq!(params.secret_key, "sk");
    }

    #[test]
    fn value_is_split_on_first_equals_only() {
        let params = ConnectionParams::parse("endpoint=h;accessKey=ak;secretKey=abc==").unwrap();
        assert_eq!(params.secret_key, "abc==");
    }

    #[test]
    fn last_occurrence_wins() {
        let params =
            ConnectionParams::parse("endpoint=first;endpoint=second;accessKey=ak;secretKey=sk")
                .unwrap();
        assert_eq!(params.endpoint, "second");
    }

    #[test]
    fn display_renders_wire_format() {
        let wire = "endpoint=localhost:9000;accessKey=ak;secretKey=sk;secure=true";
        let params: ConnectionParams = wire.parse().unwrap();

        assert_eq!(params.to_string(), wire);
        assert_eq!(ConnectionParams::parse(&params.to_string()).unwrap(), params);
    }

    #[test]
    fn debug_redacts_secret() {
        let params = ConnectionParams::parse("endpoint=h;accessKey=ak;secretKey=hunter2").unwrap();
        assert!(!format!("{:?}", params).contains("hunter2"));
    }
}
