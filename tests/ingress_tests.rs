use luma::ingress::TcpIngress;
use luma::kernel::event::{Event, InputContent, SOURCE_BOT};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

async fn send(addr: std::net::SocketAddr, payload: &[u8]) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    // The server reads once and hangs up, so late writes may be reset
    let _ = stream.write_all(payload).await;
    let _ = stream.shutdown().await;
}

#[tokio::test]
async fn test_message_becomes_bot_signal() {
    let (tx, mut rx) = mpsc::channel(10);
    let token = CancellationToken::new();
    let ingress = TcpIngress::bind("127.0.0.1:0", tx, token.clone()).await.unwrap();
    let addr = ingress.local_addr().unwrap();
    let server = tokio::spawn(ingress.run());

    send(addr, b"  hello luma \n").await;

    let event = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    match event {
        Event::Input(input) => {
            assert_eq!(input.source, SOURCE_BOT);
            assert_eq!(input.content, InputContent::Signal("127.0.0.1: hello luma".to_string()));
        }
        other => panic!("unexpected event {:?}", other),
    }

    token.cancel();
    timeout(Duration::from_secs(2), server).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_blank_and_invalid_messages() {
    let (tx, mut rx) = mpsc::channel(10);
    let token = CancellationToken::new();
    let ingress = TcpIngress::bind("127.0.0.1:0", tx, token.clone()).await.unwrap();
    let addr = ingress.local_addr().unwrap();
    tokio::spawn(ingress.run());

    // Whitespace only is dropped
    send(addr, b"   \r\n").await;
    // Invalid UTF-8 is decoded lossily
    send(addr, &[b'h', b'i', 0xff]).await;

    let event = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    let Event::Input(input) = event else { panic!("expected input") };
    assert_eq!(input.content, InputContent::Signal("127.0.0.1: hi\u{fffd}".to_string()));

    token.cancel();
}

#[tokio::test]
async fn test_long_message_is_truncated_to_one_read() {
    let (tx, mut rx) = mpsc::channel(10);
    let token = CancellationToken::new();
    let ingress = TcpIngress::bind("127.0.0.1:0", tx, token.clone()).await.unwrap();
    let addr = ingress.local_addr().unwrap();
    tokio::spawn(ingress.run());

    send(addr, &vec![b'a'; 10_000]).await;

    let event = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    let Event::Input(input) = event else { panic!("expected input") };
    let InputContent::Signal(text) = input.content else { panic!("expected signal") };
    let msg = text.trim_start_matches("127.0.0.1: ");
    assert!(!msg.is_empty() && msg.len() <= 4096);

    token.cancel();
}

#[tokio::test]
async fn test_idle_client_does_not_block_listener() {
    let (tx, mut rx) = mpsc::channel(10);
    let token = CancellationToken::new();
    let ingress = TcpIngress::bind("127.0.0.1:0", tx, token.clone())
        .await
        .unwrap()
        .with_read_timeout(Duration::from_millis(200));
    let addr = ingress.local_addr().unwrap();
    tokio::spawn(ingress.run());

    // Connects first and never writes
    let _idle = TcpStream::connect(addr).await.unwrap();
    send(addr, b"still here").await;

    let event = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    let Event::Input(input) = event else { panic!("expected input") };
    assert_eq!(input.content, InputContent::Signal("127.0.0.1: still here".to_string()));

    token.cancel();
}
