// crates/parlor-server/examples/wire_probe.rs
//
// Minimal wire probe for a running coordinator: speaks a few frames of
// the line protocol directly over TCP and prints every response. Handy
// for eyeballing a live server next to `nc`:
//
//   cargo run -p parlor-server               # terminal 1
//   cargo run -p parlor-server --example wire_probe   # terminal 2
//
// Override the target with PARLOR_ADDR=host:port.

use std::env;
use std::error::Error;

use parlor_protocol::TypeTag;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let addr = env::var("PARLOR_ADDR").unwrap_or_else(|_| "127.0.0.1:9040".to_string());
    let stream = TcpStream::connect(&addr).await?;
    println!("connected to {}", addr);

    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    write.write_all(b"check name\nprobe\n").await?;
    let taken = expect_reply(&mut lines, TypeTag::Boolean).await?;
    println!("nickname 'probe' taken: {}", taken);
    if taken == "true" {
        println!("a probe is already attached; pick another nickname");
        return Ok(());
    }

    write.write_all(b"add match\nprobe\n").await?;
    let match_id = expect_reply(&mut lines, TypeTag::Integer).await?;
    println!("opened match {}", match_id);

    write
        .write_all(format!("view table\n{}\n", match_id).as_bytes())
        .await?;
    let table = expect_reply(&mut lines, TypeTag::Table).await?;
    println!("table snapshot: {}", table);

    // Leave politely so the nickname frees up for the next probe run.
    write.write_all(b"remove client\nprobe\n").await?;
    println!("left the coordinator");
    Ok(())
}

/// Read frames until the wanted solicited tag shows up, printing any
/// pushes that arrive in between. Returns the payload line.
async fn expect_reply(
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    wanted: TypeTag,
) -> Result<String, Box<dyn Error>> {
    loop {
        let tag_line = lines
            .next_line()
            .await?
            .ok_or("coordinator closed the stream")?;
        let Some(tag) = TypeTag::parse(&tag_line) else {
            println!("?? unknown tag {:?}", tag_line);
            continue;
        };

        let mut payload = String::new();
        for _ in 0..tag.payload_lines() {
            payload = lines
                .next_line()
                .await?
                .ok_or("coordinator closed mid-frame")?;
        }

        if tag == wanted {
            return Ok(payload);
        }
        println!(".. {} {}", tag.as_str(), payload);
    }
}
