use server_tcp::{BenchClient, Response};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:5500".to_string());
    let mut client = BenchClient::connect(&addr).await?;
    println!("Connected to server at {}", addr);

    println!("\n=== Testing PING ===");
    println!("Response: {:?}", client.ping().await?);

    for mode in ["platform", "virtual", "reactive"] {
        println!("\n=== Testing HELLO {} ===", mode);
        match client.hello(mode, 0).await? {
            Response::Value { value } => println!("Body: {}", String::from_utf8_lossy(&value)),
            other => println!("Response: {:?}", other),
        }
    }

    println!("\n=== Testing GET ===");
    println!("Response: {:?}", client.get("1").await?);

    println!("\n=== Testing GET (non-existent key) ===");
    println!("Response: {:?}", client.get("nonexistent").await?);

    Ok(())
}
