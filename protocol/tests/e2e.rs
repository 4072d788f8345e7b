//! End-to-end exercise of the full stack over a real UDP socket:
//! client exchange → wire codec → dispatcher → handlers → token
//! authority, and back. The server runs in a background task on an
//! ephemeral localhost port.

use std::time::Duration;

use tokio::net::UdpSocket;

use sasp_protocol::client::{exchange, RetryPolicy};
use sasp_protocol::sas::{Gas, Identity, Sas};
use sasp_protocol::server::ServerContext;
use sasp_protocol::token::derive_individual;
use sasp_protocol::wire::{WireMessage, STATUS_FAIL, STATUS_PASS};

/// Short timeouts: localhost doesn't lose packets, and when a test does
/// fail we want it to fail in seconds, not after the production ceiling.
fn test_policy() -> RetryPolicy {
    RetryPolicy {
        attempt_timeout: Duration::from_millis(500),
        give_up_after: Duration::from_secs(2),
    }
}

/// Start a server on an ephemeral port and return a connected client socket.
async fn start_server() -> UdpSocket {
    let context = ServerContext::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral server port");
    let server_addr = context.local_addr().unwrap();
    tokio::spawn(async move { context.serve().await });

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.connect(server_addr).await.unwrap();
    client
}

async fn send(client: &UdpSocket, request: WireMessage) -> WireMessage {
    exchange(client, &request, test_policy())
        .await
        .expect("exchange against local server")
}

#[tokio::test]
async fn individual_issue_then_validate() {
    let client = start_server().await;

    let identity = Identity::new("A00123456", 42).unwrap();
    let reply = send(&client, WireMessage::IndividualRequest(identity)).await;
    let sas = match reply {
        WireMessage::IndividualResponse(sas) => sas,
        other => panic!("unexpected reply: {:?}", other),
    };
    assert_eq!(sas.to_string(), format!("A00123456:42:{}", sas.token()));
    assert_eq!(sas.token(), derive_individual("A00123456", 42));

    // The issued token validates...
    let reply = send(&client, WireMessage::IndividualValidate(sas.clone())).await;
    assert!(matches!(
        reply,
        WireMessage::IndividualValidateResponse {
            status: STATUS_PASS,
            ..
        }
    ));

    // ...and a forged one gets a fail verdict, not an error.
    let forged = Sas::new(sas.identity().clone(), "0".repeat(64)).unwrap();
    let reply = send(&client, WireMessage::IndividualValidate(forged)).await;
    assert!(matches!(
        reply,
        WireMessage::IndividualValidateResponse {
            status: STATUS_FAIL,
            ..
        }
    ));
}

#[tokio::test]
async fn group_issue_then_validate() {
    let client = start_server().await;

    let members = vec![
        Sas::derive(Identity::new("A1", 1).unwrap()),
        Sas::derive(Identity::new("B2", 2).unwrap()),
    ];
    let reply = send(&client, WireMessage::GroupRequest(members.clone())).await;
    let gas = match reply {
        WireMessage::GroupResponse(gas) => gas,
        other => panic!("unexpected reply: {:?}", other),
    };
    assert_eq!(gas.members(), members.as_slice());
    // Text form: SAS_1+SAS_2+group_token.
    assert!(gas.to_string().ends_with(gas.token()));

    let reply = send(&client, WireMessage::GroupValidate(gas.clone())).await;
    assert!(matches!(
        reply,
        WireMessage::GroupValidateResponse {
            status: STATUS_PASS,
            ..
        }
    ));

    // Tampering with the aggregate flips the verdict.
    let tampered = Gas::new(gas.members().to_vec(), "f".repeat(64)).unwrap();
    let reply = send(&client, WireMessage::GroupValidate(tampered)).await;
    assert!(matches!(
        reply,
        WireMessage::GroupValidateResponse {
            status: STATUS_FAIL,
            ..
        }
    ));
}

#[tokio::test]
async fn group_issue_rejects_bad_member() {
    let client = start_server().await;

    let members = vec![
        Sas::derive(Identity::new("A1", 1).unwrap()),
        Sas::new(Identity::new("B2", 2).unwrap(), "0".repeat(64)).unwrap(),
    ];
    let reply = send(&client, WireMessage::GroupRequest(members)).await;
    assert_eq!(reply, WireMessage::Error(4));
}

#[tokio::test]
async fn malformed_datagrams_get_error_replies() {
    let client = start_server().await;
    let mut buf = vec![0u8; 2048];

    // Unknown type tag 99 → Error(1).
    let mut datagram = 99u16.to_be_bytes().to_vec();
    datagram.extend_from_slice(&[0u8; 16]);
    client.send(&datagram).await.unwrap();
    let n = client.recv(&mut buf).await.unwrap();
    assert_eq!(WireMessage::decode(&buf[..n]).unwrap(), WireMessage::Error(1));

    // Truncated individual request → Error(2).
    let mut datagram = 1u16.to_be_bytes().to_vec();
    datagram.extend_from_slice(&[b'A'; 15]);
    client.send(&datagram).await.unwrap();
    let n = client.recv(&mut buf).await.unwrap();
    assert_eq!(WireMessage::decode(&buf[..n]).unwrap(), WireMessage::Error(2));

    // The loop survived both — a normal request still works.
    let reply = send(
        &client,
        WireMessage::IndividualRequest(Identity::new("A1", 1).unwrap()),
    )
    .await;
    assert!(matches!(reply, WireMessage::IndividualResponse(_)));
}

#[tokio::test]
async fn retry_recovers_from_a_lost_datagram() {
    // A proxy that drops the first request outright, then forwards
    // everything. The client's second attempt must succeed.
    let context = ServerContext::bind("127.0.0.1:0").await.unwrap();
    let server_addr = context.local_addr().unwrap();
    tokio::spawn(async move { context.serve().await });

    let proxy = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let proxy_addr = proxy.local_addr().unwrap();
    tokio::spawn(async move {
        let mut buf = vec![0u8; 2048];
        let upstream = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        upstream.connect(server_addr).await.unwrap();

        // Drop the first datagram.
        let (_, _) = proxy.recv_from(&mut buf).await.unwrap();

        loop {
            let (n, peer) = proxy.recv_from(&mut buf).await.unwrap();
            upstream.send(&buf[..n]).await.unwrap();
            let m = upstream.recv(&mut buf).await.unwrap();
            proxy.send_to(&buf[..m], peer).await.unwrap();
        }
    });

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.connect(proxy_addr).await.unwrap();

    let reply = exchange(
        &client,
        &WireMessage::IndividualRequest(Identity::new("A1", 7).unwrap()),
        test_policy(),
    )
    .await
    .expect("second attempt should get through");
    assert!(matches!(reply, WireMessage::IndividualResponse(_)));
}
