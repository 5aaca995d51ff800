use anyhow::Result;
use tokio::sync::broadcast::error::TryRecvError;

use owlstream::addon::{StreamResponse, WireStream};
use owlstream::{Config, Diagnostics, StreamResolver};

pub async fn cmd_streams(config: &Config, id: &str, json: bool) -> Result<()> {
    let diagnostics = Diagnostics::default();
    let mut rx = diagnostics.subscribe();
    let resolver = StreamResolver::new(config, diagnostics)?;

    let streams = resolver.resolve_streams(id).await;

    if json {
        let response = StreamResponse {
            streams: streams.into_iter().map(WireStream::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if streams.is_empty() {
        println!("No streams for {id}");
        loop {
            match rx.try_recv() {
                Ok(diag) => println!("   {} at {}: {}", diag.stage.as_str(), diag.url, diag.message),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        return Ok(());
    }

    for stream in &streams {
        println!("{} ({})", stream.name, stream.title);
        println!("   {}", stream.url);
        for sub in &stream.subtitles {
            println!("   subtitle [{}]: {}", sub.lang, sub.url);
        }
    }
    println!("\n({} streams)", streams.len());
    Ok(())
}
