//! Tests for the color handshake over an in-memory stream.

use connectn::{
    Board, Connection, NegotiationConfig, Notification, PlayerColor, Session, SessionError,
    TurnState, negotiate,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};

type Client = Connection<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

struct Peer {
    lines: tokio::io::Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl Peer {
    async fn expect(&mut self, line: &str) {
        let got = self.lines.next_line().await.unwrap();
        assert_eq!(got.as_deref(), Some(line));
    }

    async fn say(&mut self, line: &str) {
        self.writer.write_all(format!("{line}\n").as_bytes()).await.unwrap();
    }
}

fn pair() -> (Client, Peer) {
    let (local, remote) = tokio::io::duplex(1024);
    let (read, write) = tokio::io::split(local);
    let (remote_read, remote_write) = tokio::io::split(remote);
    (
        Connection::new(read, write),
        Peer {
            lines: BufReader::new(remote_read).lines(),
            writer: remote_write,
        },
    )
}

fn session() -> Session {
    Session::new(PlayerColor::new("Red"), Board::default())
}

fn fast(rounds: u32) -> NegotiationConfig {
    NegotiationConfig::new(rounds, 20)
}

#[tokio::test]
async fn test_send_color_then_accepted() {
    let (mut client, mut peer) = pair();
    let mut session = session();

    let server = tokio::spawn(async move {
        peer.expect("Ana").await;
        peer.expect("COLOR red").await;
        peer.say("SEND_COLOR").await;
        peer.expect("COLOR red").await;
        peer.say("COLOR yellow").await;
        peer.say("COLOR_ACCEPTED").await;
        peer
    });

    let notifications = negotiate(&mut session, &mut client, "Ana", &fast(30))
        .await
        .expect("negotiation succeeds");
    server.await.unwrap();

    assert_eq!(session.state(), TurnState::AwaitingRole);
    assert_eq!(
        notifications,
        vec![Notification::ColorAssigned {
            local: PlayerColor::new("red"),
            opponent: PlayerColor::new("yellow"),
        }]
    );
}

#[tokio::test]
async fn test_line_that_is_not_utf8_uses_a_round_but_not_the_session() {
    let (mut client, mut peer) = pair();
    let mut session = session();

    peer.writer.write_all(b"\xc3\x28 COLOR\n").await.unwrap();
    peer.say("COLOR_ACCEPTED").await;

    let notifications = negotiate(&mut session, &mut client, "Ana", &fast(30))
        .await
        .expect("negotiation survives a garbled line");
    assert_eq!(session.state(), TurnState::AwaitingRole);
    assert!(matches!(
        notifications.as_slice(),
        [Notification::InputDiscarded { .. }]
    ));
}

#[tokio::test]
async fn test_silence_times_out_and_closes() {
    let (mut client, mut peer) = pair();
    let mut session = session();

    let err = negotiate(&mut session, &mut client, "Ana", &fast(3))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::NegotiationTimeout { rounds: 3 }));

    peer.expect("Ana").await;
    peer.expect("COLOR red").await;
    assert_eq!(peer.lines.next_line().await.unwrap(), None);
}

#[tokio::test]
async fn test_thirty_send_colors_time_out() {
    let (mut client, mut peer) = pair();
    let mut session = session();

    let server = tokio::spawn(async move {
        peer.expect("Ana").await;
        peer.expect("COLOR red").await;
        for _ in 0..30 {
            peer.say("SEND_COLOR").await;
            peer.expect("COLOR red").await;
        }
        peer
    });

    let err = negotiate(&mut session, &mut client, "Ana", &NegotiationConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::NegotiationTimeout { rounds: 30 }));

    let mut peer = server.await.unwrap();
    assert_eq!(peer.lines.next_line().await.unwrap(), None);
}

#[tokio::test]
async fn test_rejection_is_fatal() {
    let (mut client, mut peer) = pair();
    let mut session = session();

    peer.say("COLOR_REJECTED color already taken").await;
    let err = negotiate(&mut session, &mut client, "Ana", &fast(30))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::ColorRejected { ref reason } if reason == "color already taken"
    ));

    peer.expect("Ana").await;
    peer.expect("COLOR red").await;
    assert_eq!(peer.lines.next_line().await.unwrap(), None);
}

#[tokio::test]
async fn test_eof_during_negotiation_is_transport_error() {
    let (mut client, peer) = pair();
    let mut session = session();
    drop(peer);

    let err = negotiate(&mut session, &mut client, "Ana", &fast(30))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));
}
