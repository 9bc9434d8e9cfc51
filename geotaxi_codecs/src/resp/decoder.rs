use super::{Reply, RespError};
use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplyDecoder;

impl Decoder for ReplyDecoder {
    type Item = Reply;

    type Error = RespError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match parse(src)? {
            Some((reply, used)) => {
                src.advance(used);
                Ok(Some(reply))
            }
            None => Ok(None),
        }
    }
}

/// Parses one reply off the front of `buf`, returning it with the number of
/// bytes it spans, or `None` if `buf` does not hold a complete reply yet.
fn parse(buf: &[u8]) -> Result<Option<(Reply, usize)>, RespError> {
    let Some((&kind, rest)) = buf.split_first() else {
        return Ok(None);
    };
    let Some(end) = rest.windows(2).position(|w| w == b"\r\n") else {
        return Ok(None);
    };
    let line = &rest[..end];
    let after = 1 + end + 2;

    match kind {
        b'+' => Ok(Some((Reply::Simple(text(line)?), after))),
        b'-' => Ok(Some((Reply::Error(text(line)?), after))),
        b':' => Ok(Some((Reply::Integer(number(line)?), after))),
        b'$' => {
            let Ok(len) = usize::try_from(number(line)?) else {
                return Ok(Some((Reply::Bulk(None), after)));
            };
            if buf.len() < after + len + 2 {
                return Ok(None);
            }
            if &buf[after + len..after + len + 2] != b"\r\n" {
                return Err(RespError::Protocol(
                    "bulk string not terminated by CRLF".to_string(),
                ));
            }
            let data = Bytes::copy_from_slice(&buf[after..after + len]);
            Ok(Some((Reply::Bulk(Some(data)), after + len + 2)))
        }
        b'*' => {
            let Ok(count) = usize::try_from(number(line)?) else {
                return Ok(Some((Reply::Array(None), after)));
            };
            let mut items = Vec::with_capacity(count.min(64));
            let mut position = after;
            for _ in 0..count {
                match parse(&buf[position..])? {
                    Some((item, used)) => {
                        items.push(item);
                        position += used;
                    }
                    None => return Ok(None),
                }
            }
            Ok(Some((Reply::Array(Some(items)), position)))
        }
        n => Err(RespError::Protocol(format!("invalid reply type 0x{n:x}"))),
    }
}

fn text(line: &[u8]) -> Result<String, RespError> {
    String::from_utf8(line.to_vec()).map_err(|e| RespError::Protocol(e.to_string()))
}

fn number(line: &[u8]) -> Result<i64, RespError> {
    text(line)?
        .parse()
        .map_err(|e| RespError::Protocol(format!("invalid integer: {e}")))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn example() {
        let mut input = BytesMut::from(&b"*2\r\n$4\r\ntaxi\r\n:7\r\n"[..]);

        let mut decoder = ReplyDecoder;
        let first = decoder.decode(&mut BytesMut::from(&input[0..12][..]));
        assert!(matches!(first, Ok(None)));

        let second = decoder.decode(&mut input).unwrap().unwrap();
        let expected = Reply::Array(Some(vec![
            Reply::Bulk(Some(Bytes::from_static(b"taxi"))),
            Reply::Integer(7),
        ]));
        assert_eq!(expected, second);
        assert!(input.is_empty());
    }

    #[test]
    fn null_values() {
        let mut input = BytesMut::from(&b"$-1\r\n*-1\r\n"[..]);
        let mut decoder = ReplyDecoder;
        assert_eq!(decoder.decode(&mut input).unwrap(), Some(Reply::Bulk(None)));
        assert_eq!(decoder.decode(&mut input).unwrap(), Some(Reply::Array(None)));
        assert_eq!(decoder.decode(&mut input).unwrap(), None);
    }

    #[test]
    fn rejects_garbage() {
        let mut input = BytesMut::from(&b"?what\r\n"[..]);
        assert!(matches!(
            ReplyDecoder.decode(&mut input),
            Err(RespError::Protocol(_))
        ));

        let mut input = BytesMut::from(&b":twelve\r\n"[..]);
        assert!(matches!(
            ReplyDecoder.decode(&mut input),
            Err(RespError::Protocol(_))
        ));
    }
}
