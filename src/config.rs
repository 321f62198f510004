// Application configuration, loaded from environment variables and CLI flags.

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database URL (SQLite connection string).
    pub database_url: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// API key for the hosted completion provider.
    pub groq_api_key: String,
    /// Chat-completion endpoint URL.
    pub groq_api_url: String,
    /// Model name sent with every completion request.
    pub llm_model: String,
}

pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` - SQLite connection string (default: `sqlite:gamesage.db?mode=rwc`)
    /// - `PORT` - HTTP server port (default: 5000)
    /// - `GROQ_API_KEY` - completion provider API key (no default; the
    ///   pipeline falls back to template responses without one)
    /// - `GROQ_API_URL` - completion endpoint override
    /// - `LLM_MODEL` - model name override
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:gamesage.db?mode=rwc".to_string());

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(&args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| std::env::var("PORT").ok().and_then(|v| v.parse().ok()))
            .unwrap_or(5000);

        let groq_api_key = std::env::var("GROQ_API_KEY").unwrap_or_default();
        if groq_api_key.is_empty() {
            tracing::warn!("GROQ_API_KEY is not set; chat responses will use the fallback templates");
        }

        let groq_api_url =
            std::env::var("GROQ_API_URL").unwrap_or_else(|_| DEFAULT_GROQ_API_URL.to_string());

        let llm_model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string());

        Config {
            database_url,
            port,
            groq_api_key,
            groq_api_url,
            llm_model,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
