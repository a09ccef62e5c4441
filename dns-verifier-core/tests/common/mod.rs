//! Loopback UDP nameserver for exercising the real resolver client.

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::{Ipv4Addr, SocketAddr};

use dns_verifier_core::Nameserver;
use hickory_resolver::proto::{
    op::{Message, MessageType, OpCode, ResponseCode},
    rr::{
        rdata::{A, MX, TXT},
        Name, RData, Record, RecordType,
    },
};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// Decides which datagrams to send back for one request.
pub type Handler = dyn Fn(&Message) -> Vec<Vec<u8>> + Send + Sync + 'static;

/// A nameserver bound to 127.0.0.1 on an ephemeral port.
///
/// The serving task is aborted on drop.
pub struct FakeNameserver {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl FakeNameserver {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Message) -> Vec<Vec<u8>> + Send + Sync + 'static,
    {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("failed to bind fake nameserver");
        let addr = socket.local_addr().unwrap();
        let handler: Box<Handler> = Box::new(handler);

        let task = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                let Ok(request) = Message::from_vec(&buf[..len]) else {
                    continue;
                };
                for datagram in handler(&request) {
                    let _ = socket.send_to(&datagram, peer).await;
                }
            }
        });

        Self { addr, task }
    }

    pub fn nameserver(&self) -> Nameserver {
        Nameserver::new(self.addr.ip().to_string(), self.addr.port())
    }
}

impl Drop for FakeNameserver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Question name of a request, with trailing dot.
pub fn question_name(request: &Message) -> String {
    request.queries()[0].name().to_string()
}

/// Question type of a request.
pub fn question_type(request: &Message) -> RecordType {
    request.queries()[0].query_type()
}

/// Encoded response to `request` carrying `answers` under `rcode`.
pub fn response(request: &Message, id: u16, rcode: ResponseCode, answers: Vec<Record>) -> Vec<u8> {
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(true)
        .set_response_code(rcode);
    for query in request.queries() {
        message.add_query(query.clone());
    }
    message.add_answers(answers);
    message.to_vec().unwrap()
}

/// Successful response to `request`.
pub fn answer(request: &Message, answers: Vec<Record>) -> Vec<u8> {
    response(request, request.id(), ResponseCode::NoError, answers)
}

/// Error response to `request`.
pub fn rcode(request: &Message, rcode: ResponseCode) -> Vec<u8> {
    response(request, request.id(), rcode, Vec::new())
}

fn name(fqdn: &str) -> Name {
    Name::from_ascii(fqdn).unwrap()
}

pub fn a(owner: &str, ttl: u32, ip: Ipv4Addr) -> Record {
    Record::from_rdata(name(owner), ttl, RData::A(A(ip)))
}

pub fn mx(owner: &str, ttl: u32, preference: u16, exchange: &str) -> Record {
    Record::from_rdata(
        name(owner),
        ttl,
        RData::MX(MX::new(preference, name(exchange))),
    )
}

pub fn txt(owner: &str, ttl: u32, segments: &[&str]) -> Record {
    Record::from_rdata(
        name(owner),
        ttl,
        RData::TXT(TXT::new(segments.iter().map(ToString::to_string).collect())),
    )
}
