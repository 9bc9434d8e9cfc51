use super::{Command, RespError};
use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandEncoder;

impl Encoder<Command> for CommandEncoder {
    type Error = RespError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let args = item.args();
        dst.put_slice(format!("*{}\r\n", args.len() + 1).as_bytes());
        put_bulk(dst, item.name().as_bytes());
        for arg in &args {
            put_bulk(dst, arg.as_bytes());
        }
        Ok(())
    }
}

fn put_bulk(dst: &mut BytesMut, bytes: &[u8]) {
    dst.put_slice(format!("${}\r\n", bytes.len()).as_bytes());
    dst.put_slice(bytes);
    dst.put_slice(b"\r\n");
}
