use ibercheck::IbercheckError;
use ibercheck::config::fetch_config;
use ibercheck::request::ApiRequest;

#[tokio::main]
async fn main() -> Result<(), IbercheckError> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt::init();

    let app_config = fetch_config()?;
    let config = &app_config.ibercheck;

    let path = std::env::args().nth(1).unwrap_or_default();
    let token = config.access_token.as_deref().ok_or_else(|| {
        IbercheckError::Config("IBERCHECK_ACCESS_TOKEN is required".to_string())
    })?;

    let client = ApiRequest::with_defaults(config.request_defaults())?;
    let body = client.get(token, &config.endpoint(&path)).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}
