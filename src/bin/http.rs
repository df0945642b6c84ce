#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use pricing_tool::{BidPlan, RateCard, http_api};

    let addr: SocketAddr = std::env::var("PRICING_TOOL_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let (plan, card) = match std::env::var("PRICING_TOOL_PLAN") {
        Ok(path) => pricing_tool::persistence::load_plan_from_json(path)?,
        Err(_) => (BidPlan::default(), RateCard::new()),
    };

    println!("pricing-tool HTTP API listening on http://{addr}");
    http_api::serve(addr, plan, card).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
