//! Single-shot DNS exchange against one nameserver.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::proto::{
    op::{Message, MessageType, OpCode, Query, ResponseCode},
    rr::{Name, RData, Record, RecordType as WireType},
};
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};

use crate::error::{QueryError, QueryResult};
use crate::types::{AnswerData, AnswerRecord, Nameserver, QueryTarget, RecordType};

/// Default exchange timeout.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Receive buffer size; large enough for any UDP DNS payload.
const MAX_DATAGRAM: usize = 65_535;

/// Issues one query for a (nameserver, name, type) target.
///
/// Implementations make exactly one attempt and return the answer section in
/// the order it was received.
#[async_trait]
pub trait DnsQuery: Send + Sync {
    /// Query `target` and return its answer records.
    async fn query(&self, target: &QueryTarget) -> QueryResult<Vec<AnswerRecord>>;
}

/// [`DnsQuery`] over a connectionless UDP exchange with a bounded timeout.
#[derive(Debug, Clone)]
pub struct UdpResolverClient {
    timeout: Duration,
}

impl UdpResolverClient {
    /// Client whose exchanges give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Exchange timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for UdpResolverClient {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_TIMEOUT)
    }
}

#[async_trait]
impl DnsQuery for UdpResolverClient {
    async fn query(&self, target: &QueryTarget) -> QueryResult<Vec<AnswerRecord>> {
        let id: u16 = rand::random();
        let request = build_query(id, &target.name, &target.record_type)?
            .to_vec()
            .map_err(|e| QueryError::Transport(format!("failed to encode query: {e}")))?;

        let addr = resolve_endpoint(&target.nameserver).await?;
        let bind_addr: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind_addr).await.map_err(transport)?;
        socket.connect(addr).await.map_err(transport)?;

        log::debug!("[{id:#06x}] query {target}");
        let deadline = Instant::now() + self.timeout;
        socket.send(&request).await.map_err(transport)?;

        let response = timeout_at(deadline, receive_response(&socket, id))
            .await
            .map_err(|_| {
                QueryError::Transport(format!(
                    "no response from {} within {}ms",
                    target.nameserver,
                    self.timeout.as_millis()
                ))
            })??;

        let rcode = response.response_code();
        if rcode != ResponseCode::NoError {
            let code = u16::from(rcode);
            return Err(QueryError::NonSuccessRcode {
                code,
                name: rcode_name(code),
            });
        }

        let answers: Vec<AnswerRecord> = response.answers().iter().map(to_answer).collect();
        log::debug!("[{id:#06x}] {} answer(s) for {target}", answers.len());
        Ok(answers)
    }
}

/// Build a recursive query message with the given transaction ID.
pub(crate) fn build_query(id: u16, name: &str, record_type: &RecordType) -> QueryResult<Message> {
    let fqdn = if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    };
    let name = Name::from_ascii(&fqdn)
        .map_err(|e| QueryError::Transport(format!("invalid query name '{fqdn}': {e}")))?;

    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(Query::query(name, wire_type(record_type)?));
    Ok(message)
}

fn wire_type(record_type: &RecordType) -> QueryResult<WireType> {
    match record_type {
        RecordType::A => Ok(WireType::A),
        RecordType::Aaaa => Ok(WireType::AAAA),
        RecordType::Cname => Ok(WireType::CNAME),
        RecordType::Caa => Ok(WireType::CAA),
        RecordType::Mx => Ok(WireType::MX),
        RecordType::Txt => Ok(WireType::TXT),
        RecordType::Unsupported(mnemonic) => WireType::from_str(mnemonic).map_err(|_| {
            QueryError::Transport(format!("cannot encode record type {mnemonic}"))
        }),
    }
}

/// Wait for the datagram answering transaction `id`, skipping stray ones.
async fn receive_response(socket: &UdpSocket, id: u16) -> QueryResult<Message> {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    loop {
        let len = socket.recv(&mut buf).await.map_err(transport)?;
        if len == 0 {
            return Err(QueryError::EmptyResponse);
        }
        let message = Message::from_vec(&buf[..len])
            .map_err(|e| QueryError::Transport(format!("malformed response: {e}")))?;
        if message.id() != id || message.message_type() != MessageType::Response {
            log::debug!(
                "[{id:#06x}] discarding unrelated datagram (id {:#06x})",
                message.id()
            );
            continue;
        }
        return Ok(message);
    }
}

async fn resolve_endpoint(nameserver: &Nameserver) -> QueryResult<SocketAddr> {
    if let Some(ip) = nameserver.ip() {
        return Ok(SocketAddr::new(ip, nameserver.port()));
    }
    tokio::net::lookup_host((nameserver.host(), nameserver.port()))
        .await
        .map_err(|e| QueryError::Transport(format!("cannot resolve nameserver {nameserver}: {e}")))?
        .next()
        .ok_or_else(|| QueryError::Transport(format!("nameserver {nameserver} has no address")))
}

fn to_answer(record: &Record) -> AnswerRecord {
    let data = match record.data() {
        RData::A(a) => AnswerData::A(a.0),
        RData::AAAA(aaaa) => AnswerData::Aaaa(aaaa.0),
        RData::CNAME(cname) => AnswerData::Cname(cname.0.to_string()),
        RData::CAA(caa) => AnswerData::Caa {
            tag: caa.tag().as_str().to_string(),
            value: String::from_utf8_lossy(caa.raw_value()).into_owned(),
        },
        RData::MX(mx) => AnswerData::Mx {
            preference: mx.preference(),
            exchange: mx.exchange().to_string(),
        },
        RData::TXT(txt) => AnswerData::Txt(
            txt.iter()
                .map(|segment| String::from_utf8_lossy(segment).into_owned())
                .collect(),
        ),
        _ => AnswerData::Other(record.record_type().to_string()),
    };
    AnswerRecord::new(record.ttl(), data)
}

/// Mnemonic for a response code, as printed by common DNS tooling.
fn rcode_name(code: u16) -> String {
    match code {
        0 => "NOERROR".to_string(),
        1 => "FORMERR".to_string(),
        2 => "SERVFAIL".to_string(),
        3 => "NXDOMAIN".to_string(),
        4 => "NOTIMP".to_string(),
        5 => "REFUSED".to_string(),
        6 => "YXDOMAIN".to_string(),
        7 => "YXRRSET".to_string(),
        8 => "NXRRSET".to_string(),
        9 => "NOTAUTH".to_string(),
        10 => "NOTZONE".to_string(),
        _ => format!("RCODE{code}"),
    }
}

#[allow(clippy::needless_pass_by_value)]
fn transport(e: std::io::Error) -> QueryError {
    QueryError::Transport(e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hickory_resolver::proto::rr::rdata::{A, AAAA, CNAME, MX, TXT};

    #[test]
    fn test_build_query_sets_header_and_question() {
        let message = build_query(0x1234, "www.example.com", &RecordType::Aaaa).unwrap();
        assert_eq!(message.id(), 0x1234);
        assert!(message.recursion_desired());
        assert_eq!(message.message_type(), MessageType::Query);
        assert_eq!(message.queries().len(), 1);
        let query = &message.queries()[0];
        assert_eq!(query.name().to_string(), "www.example.com.");
        assert_eq!(query.query_type(), WireType::AAAA);
    }

    #[test]
    fn test_build_query_keeps_trailing_dot() {
        let message = build_query(1, "example.com.", &RecordType::Txt).unwrap();
        assert_eq!(message.queries()[0].name().to_string(), "example.com.");
    }

    #[test]
    fn test_build_query_unknown_type() {
        let result = build_query(1, "example.com", &RecordType::from("BOGUS"));
        assert!(matches!(result, Err(QueryError::Transport(_))));
    }

    #[test]
    fn test_build_query_encodes() {
        let message = build_query(7, "example.com", &RecordType::Mx).unwrap();
        let bytes = message.to_vec().unwrap();
        let decoded = Message::from_vec(&bytes).unwrap();
        assert_eq!(decoded.id(), 7);
        assert!(decoded.recursion_desired());
    }

    #[test]
    fn test_to_answer_payloads() {
        let name = Name::from_ascii("example.com.").unwrap();

        let a = Record::from_rdata(name.clone(), 120, RData::A(A::new(192, 0, 2, 1)));
        assert_eq!(
            to_answer(&a),
            AnswerRecord::new(120, AnswerData::A(Ipv4Addr::new(192, 0, 2, 1)))
        );

        let exchange = Name::from_ascii("mx.example.com.").unwrap();
        let mx = Record::from_rdata(name.clone(), 300, RData::MX(MX::new(10, exchange)));
        assert_eq!(
            to_answer(&mx).data,
            AnswerData::Mx {
                preference: 10,
                exchange: "mx.example.com.".to_string()
            }
        );

        let txt = Record::from_rdata(
            name,
            60,
            RData::TXT(TXT::new(vec!["ab".to_string(), "c".to_string()])),
        );
        assert_eq!(
            to_answer(&txt).data,
            AnswerData::Txt(vec!["ab".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_to_answer_aaaa_and_cname() {
        let name = Name::from_ascii("www.example.com.").unwrap();

        let addr: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let aaaa = Record::from_rdata(name.clone(), 60, RData::AAAA(AAAA(addr)));
        assert_eq!(to_answer(&aaaa), AnswerRecord::new(60, AnswerData::Aaaa(addr)));

        let alias = Name::from_ascii("a.example.net.").unwrap();
        let cname = Record::from_rdata(name, 300, RData::CNAME(CNAME(alias)));
        assert_eq!(
            to_answer(&cname).data,
            AnswerData::Cname("a.example.net.".to_string())
        );
    }

    /// Response carrying one `example.com. 300 IN CAA 0 issue "letsencrypt.org"`.
    fn caa_response_bytes() -> Vec<u8> {
        let mut bytes = vec![
            0x00, 0x01, // id
            0x81, 0x80, // response, RD, RA, NOERROR
            0x00, 0x00, // qdcount
            0x00, 0x01, // ancount
            0x00, 0x00, // nscount
            0x00, 0x00, // arcount
        ];
        bytes.push(7);
        bytes.extend_from_slice(b"example");
        bytes.push(3);
        bytes.extend_from_slice(b"com");
        bytes.push(0);
        bytes.extend_from_slice(&[0x01, 0x01]); // CAA
        bytes.extend_from_slice(&[0x00, 0x01]); // IN
        bytes.extend_from_slice(&300u32.to_be_bytes());

        let mut rdata = vec![0x00, 5];
        rdata.extend_from_slice(b"issue");
        rdata.extend_from_slice(b"letsencrypt.org");
        bytes.extend_from_slice(&u16::try_from(rdata.len()).unwrap().to_be_bytes());
        bytes.extend_from_slice(&rdata);
        bytes
    }

    #[test]
    fn test_to_answer_caa_from_wire() {
        let message = Message::from_vec(&caa_response_bytes()).unwrap();
        assert_eq!(message.answers().len(), 1);
        assert_eq!(
            to_answer(&message.answers()[0]),
            AnswerRecord::new(
                300,
                AnswerData::Caa {
                    tag: "issue".to_string(),
                    value: "letsencrypt.org".to_string(),
                }
            )
        );
    }

    #[test]
    fn test_rcode_name() {
        assert_eq!(rcode_name(2), "SERVFAIL");
        assert_eq!(rcode_name(3), "NXDOMAIN");
        assert_eq!(rcode_name(23), "RCODE23");
    }

    #[test]
    fn test_default_timeout_is_bounded() {
        assert_eq!(UdpResolverClient::default().timeout(), DEFAULT_QUERY_TIMEOUT);
        assert!(DEFAULT_QUERY_TIMEOUT <= Duration::from_secs(10));
    }
}
