//! CLI argument definitions using clap

use clap::Parser;
use std::fmt;

/// Credentials that never show up in Debug output
#[derive(Clone, Default)]
pub struct SecretString(pub String);

impl SecretString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "SecretString(\"\")")
        } else {
            write!(f, "SecretString(\"[REDACTED]\")")
        }
    }
}

impl std::str::FromStr for SecretString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SecretString(s.to_string()))
    }
}

/// Send one HTTP request; Ctrl+C cancels it
#[derive(Parser, Debug, Clone)]
#[command(name = "justhttp", version, about, long_about = None, args_override_self = true)]
pub struct Args {
    /// HTTP method, or the URL when the method is omitted
    #[arg(value_name = "METHOD_OR_URL")]
    pub method_or_url: String,

    /// Request items: Header:Value, name==value, key=value, key:=json, field@path
    #[arg(value_name = "URL_AND_ITEMS")]
    pub rest: Vec<String>,

    /// Serialize data fields as a JSON object
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Timeout in seconds for the whole exchange
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Do not follow redirects
    #[arg(long = "no-follow")]
    pub no_follow: bool,

    /// Basic auth credentials as user[:password]
    #[arg(short = 'a', long, env = "JUSTHTTP_AUTH", hide_env_values = true)]
    pub auth: Option<SecretString>,

    /// Exit with an error status for non-2xx responses
    #[arg(long = "check-status")]
    pub check_status: bool,

    /// Print only the response body
    #[arg(short = 'b', long = "body-only")]
    pub body_only: bool,

    /// Log the exchange to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
