//! Tests for the Waveshare HTTP configuration sequence
//!
//! A scripted loopback server plays the device role, answering one canned
//! response per accepted connection and recording the request heads it saw.

use std::time::Duration;

use anyhow::Result;
use netserial_core::{ConfigError, Error, SerialSettings};
use netserial_transport::{
    RemoteConfigurator, RetryPolicy, TcpSerialSettings, WaveshareConfigurator,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Clone, Copy)]
enum Canned {
    Ok200,
    NotFound404,
    ServerError500,
    /// Read the request, then close without answering
    Drop,
}

fn spawn_device(listener: TcpListener, script: Vec<Canned>) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let mut heads = Vec::new();
        for step in script {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut head = String::new();
            let mut chunk = [0u8; 1024];
            while !head.contains("\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.push_str(&String::from_utf8_lossy(&chunk[..n])),
                }
            }
            heads.push(head);
            let response: &[u8] = match step {
                Canned::Ok200 => {
                    b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                }
                Canned::NotFound404 => {
                    b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                }
                Canned::ServerError500 => {
                    b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                }
                Canned::Drop => continue,
            };
            let _ = socket.write_all(response).await;
        }
        heads
    })
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        attempts: 5,
        backoff: Duration::from_millis(10),
    }
}

fn bridge_settings() -> TcpSerialSettings {
    TcpSerialSettings::from_serial(&SerialSettings::with_baud_rate(9600), "192.168.1.50:8000")
        .expect("address parses")
        .with_packet_framing(10, 64)
}

fn device_configurator(host: &str) -> Result<WaveshareConfigurator> {
    let configurator = WaveshareConfigurator::new(host, "admin", "admin")?
        .with_retry_policy(fast_retry())
        .with_reboot_wait(Duration::from_millis(10));
    Ok(configurator)
}

fn request_line(head: &str) -> &str {
    head.lines().next().unwrap_or_default()
}

#[tokio::test]
async fn push_walks_the_three_step_sequence() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let host = listener.local_addr()?.to_string();
    let device = spawn_device(listener, vec![Canned::Ok200, Canned::Ok200, Canned::Ok200]);

    let configurator = device_configurator(&host)?;
    configurator.push(&bridge_settings()).await?;

    let heads = device.await?;
    assert_eq!(heads.len(), 3);
    let config = request_line(&heads[0]);
    assert!(config.starts_with("GET /config.cgi?"), "got: {}", config);
    assert!(config.contains("br=9600&bc=8&parity=1&stop=One&xon=0&tim=10&num=64&srf=1"));
    assert!(config.contains("tlp=8000"));
    assert!(request_line(&heads[1]).starts_with("GET /login.cgi"));
    assert!(request_line(&heads[2]).starts_with("GET / "));
    for head in &heads {
        assert!(
            head.to_lowercase().contains("authorization: basic"),
            "request lacked credentials: {}",
            request_line(head)
        );
    }
    Ok(())
}

#[tokio::test]
async fn transient_failures_retry_until_success() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let host = listener.local_addr()?.to_string();
    let device = spawn_device(
        listener,
        vec![
            Canned::Drop,
            Canned::Drop,
            Canned::Drop,
            Canned::Drop,
            Canned::Ok200,
            Canned::Ok200,
            Canned::Ok200,
        ],
    );

    let configurator = device_configurator(&host)?;
    configurator.push(&bridge_settings()).await?;

    let heads = device.await?;
    assert_eq!(heads.len(), 7);
    for head in &heads[..5] {
        assert!(request_line(head).starts_with("GET /config.cgi?"));
    }
    assert!(request_line(&heads[5]).starts_with("GET /login.cgi"));
    assert!(request_line(&heads[6]).starts_with("GET / "));
    Ok(())
}

#[tokio::test]
async fn exhausted_retries_fail_the_push() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let host = listener.local_addr()?.to_string();
    let device = spawn_device(listener, vec![Canned::Drop; 5]);

    let configurator = device_configurator(&host)?;
    let err = configurator.push(&bridge_settings()).await.unwrap_err();
    assert!(err.is_config_error());
    match err {
        Error::Config(ConfigError::StepFailed { step, attempts }) => {
            assert_eq!(step, "config.cgi");
            assert_eq!(attempts, 5);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // The sequence stopped at the first step.
    let heads = device.await?;
    assert_eq!(heads.len(), 5);
    Ok(())
}

#[tokio::test]
async fn not_found_short_circuits_as_success() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let host = listener.local_addr()?.to_string();
    let device = spawn_device(
        listener,
        vec![Canned::NotFound404, Canned::NotFound404, Canned::NotFound404],
    );

    let configurator = device_configurator(&host)?;
    configurator.push(&bridge_settings()).await?;

    // Old firmware lacks some pages; one request per step, no retries.
    let heads = device.await?;
    assert_eq!(heads.len(), 3);
    Ok(())
}

#[tokio::test]
async fn http_errors_retry_with_backoff() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let host = listener.local_addr()?.to_string();
    let device = spawn_device(
        listener,
        vec![
            Canned::ServerError500,
            Canned::Ok200,
            Canned::Ok200,
            Canned::Ok200,
        ],
    );

    let configurator = device_configurator(&host)?;
    configurator.push(&bridge_settings()).await?;

    let heads = device.await?;
    assert_eq!(heads.len(), 4);
    assert!(request_line(&heads[0]).starts_with("GET /config.cgi?"));
    assert!(request_line(&heads[1]).starts_with("GET /config.cgi?"));
    Ok(())
}
