use clap::Parser;
use relay_proxy::relay::{RelayRequest, RelayResponse};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Send one request through a running relay", long_about = None)]
struct Cli {
    /// Relay base URL.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Method the relay should use upstream.
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Header to send upstream, as "Name: value". Repeatable.
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Target URL.
    target: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut request = RelayRequest::new(cli.method, cli.target);
    for raw in &cli.headers {
        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| format!("header {:?} is not in \"Name: value\" form", raw))?;
        request = request.header(name.trim(), value.trim());
    }

    let res = reqwest::Client::new()
        .post(format!("{}/proxy", cli.url.trim_end_matches('/')))
        .json(&request)
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let summary: RelayResponse = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
