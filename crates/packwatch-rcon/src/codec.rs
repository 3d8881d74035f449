//! Frame codec for the console protocol
//!
//! Every frame is `i32 length, i32 request_id, i32 type, payload, 0x00 0x00`,
//! all integers little-endian. `length` counts everything after itself,
//! including the two terminator bytes.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::RconError;

/// Bytes of `request_id` + `type`
const ID_AND_TYPE_LEN: usize = 8;

/// Two trailing null bytes after every payload
const TERMINATOR_LEN: usize = 2;

/// Upper bound accepted for an incoming frame length
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Request id the server echoes back as `-1` when authentication fails
pub const AUTH_FAILED_ID: i32 = -1;

/// Frame types used by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    /// Execute a console command
    ExecCommand,
    /// Authenticate with the console password
    Auth,
}

impl PacketType {
    /// Numeric wire value
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            PacketType::ExecCommand => 2,
            PacketType::Auth => 3,
        }
    }
}

/// A decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Request id echoed by the server
    pub request_id: i32,
    /// Raw frame type
    pub kind: i32,
    /// Body text, lossily decoded
    pub body: String,
}

impl Packet {
    /// Whether the server rejected the authentication request
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        self.request_id == AUTH_FAILED_ID
    }
}

/// Encode one frame
///
/// The payload is UTF-8 encoded and no size limit is applied here; commands
/// are expected to stay short.
#[must_use]
pub fn encode(request_id: i32, kind: i32, payload: &str) -> Vec<u8> {
    let data = payload.as_bytes();
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let length = (data.len() + ID_AND_TYPE_LEN + TERMINATOR_LEN) as i32;

    let mut buf = Vec::with_capacity(4 + ID_AND_TYPE_LEN + data.len() + TERMINATOR_LEN);
    buf.extend_from_slice(&length.to_le_bytes());
    buf.extend_from_slice(&request_id.to_le_bytes());
    buf.extend_from_slice(&kind.to_le_bytes());
    buf.extend_from_slice(data);
    buf.extend_from_slice(&[0u8; TERMINATOR_LEN]);
    buf
}

/// Encode and write one frame
///
/// # Errors
/// Returns `RconError::IoError` if writing fails
pub async fn write_packet<W: AsyncWrite + Unpin>(
    writer: &mut W,
    request_id: i32,
    kind: PacketType,
    payload: &str,
) -> Result<(), RconError> {
    let frame = encode(request_id, kind.code(), payload);
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame from a stream
///
/// # Errors
/// - `RconError::Protocol("incomplete header")` if the stream ends before 4 bytes
/// - `RconError::Protocol("incomplete payload")` if it ends before `length`
///   bytes, or `length` is too short to hold the id and type fields
/// - `RconError::Protocol("frame too large")` above [`MAX_FRAME_SIZE`]
pub async fn read_packet<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Packet, RconError> {
    let mut header = [0u8; 4];
    if read_full(reader, &mut header).await? < header.len() {
        return Err(RconError::protocol("incomplete header"));
    }

    // Negative lengths are treated as empty and rejected below
    let length = usize::try_from(i32::from_le_bytes(header)).unwrap_or(0);
    if length > MAX_FRAME_SIZE {
        return Err(RconError::protocol("frame too large"));
    }

    let mut payload = vec![0u8; length];
    let received = read_full(reader, &mut payload).await?;
    if received < length || received < ID_AND_TYPE_LEN {
        return Err(RconError::protocol("incomplete payload"));
    }

    let request_id = i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
    let kind = i32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]);
    let body_end = payload
        .len()
        .saturating_sub(TERMINATOR_LEN)
        .max(ID_AND_TYPE_LEN);
    let body = String::from_utf8_lossy(&payload[ID_AND_TYPE_LEN..body_end]).into_owned();

    Ok(Packet {
        request_id,
        kind,
        body,
    })
}

/// Fill `buf` until it is full or the stream closes, returning bytes read
async fn read_full<R: AsyncRead + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<usize, RconError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn decode(bytes: &[u8]) -> Result<Packet, RconError> {
        let mut reader = bytes;
        read_packet(&mut reader).await
    }

    #[test]
    fn test_encode_layout() {
        let frame = encode(1, PacketType::Auth.code(), "pw");

        assert_eq!(frame.len(), 4 + 8 + 2 + 2);
        assert_eq!(&frame[0..4], &12i32.to_le_bytes());
        assert_eq!(&frame[4..8], &1i32.to_le_bytes());
        assert_eq!(&frame[8..12], &3i32.to_le_bytes());
        assert_eq!(&frame[12..14], b"pw");
        assert_eq!(&frame[14..], &[0, 0]);
    }

    #[test]
    fn test_encode_counts_utf8_bytes() {
        let frame = encode(2, PacketType::ExecCommand.code(), "héllo ✓");
        let payload_len = "héllo ✓".len();

        assert_eq!(&frame[0..4], &((payload_len + 10) as i32).to_le_bytes());
        assert_eq!(frame.len(), payload_len + 14);
    }

    #[tokio::test]
    async fn test_decode_roundtrip_multibyte() {
        for (id, kind, text) in [
            (0, 0, ""),
            (-1, 2, "Ünïcödé ✓ 🚀"),
            (i32::MAX, i32::MIN, "say hi"),
        ] {
            let packet = decode(&encode(id, kind, text)).await.unwrap();
            assert_eq!(packet.request_id, id);
            assert_eq!(packet.kind, kind);
            assert_eq!(packet.body, text);
        }
    }

    #[tokio::test]
    async fn test_decode_incomplete_header() {
        let err = decode(&[10, 0]).await.unwrap_err();
        assert_eq!(err, RconError::Protocol("incomplete header".to_string()));

        let err = decode(&[]).await.unwrap_err();
        assert_eq!(err, RconError::Protocol("incomplete header".to_string()));
    }

    #[tokio::test]
    async fn test_decode_truncated_payload() {
        let frame = encode(5, 0, "truncated body");
        let err = decode(&frame[..frame.len() - 3]).await.unwrap_err();
        assert_eq!(err, RconError::Protocol("incomplete payload".to_string()));
    }

    #[tokio::test]
    async fn test_decode_length_too_short_for_ids() {
        let mut frame = 4i32.to_le_bytes().to_vec();
        frame.extend_from_slice(&[1, 0, 0, 0]);
        let err = decode(&frame).await.unwrap_err();
        assert_eq!(err, RconError::Protocol("incomplete payload".to_string()));
    }

    #[tokio::test]
    async fn test_decode_negative_length() {
        let frame = (-20i32).to_le_bytes();
        let err = decode(&frame).await.unwrap_err();
        assert_eq!(err, RconError::Protocol("incomplete payload".to_string()));
    }

    #[tokio::test]
    async fn test_decode_rejects_huge_frame() {
        let frame = i32::MAX.to_le_bytes();
        let err = decode(&frame).await.unwrap_err();
        assert_eq!(err, RconError::Protocol("frame too large".to_string()));
    }

    #[tokio::test]
    async fn test_decode_lossy_body() {
        let mut frame = 12i32.to_le_bytes().to_vec();
        frame.extend_from_slice(&7i32.to_le_bytes());
        frame.extend_from_slice(&0i32.to_le_bytes());
        frame.extend_from_slice(&[0xff, b'a', 0, 0]);

        let packet = decode(&frame).await.unwrap();
        assert_eq!(packet.request_id, 7);
        assert_eq!(packet.body, "\u{fffd}a");
    }

    #[tokio::test]
    async fn test_decode_fragmented_stream() {
        let frame = encode(9, 0, "fragmented");
        let (mut client, mut server) = tokio::io::duplex(4);

        let writer = tokio::spawn(async move {
            for chunk in frame.chunks(3) {
                server.write_all(chunk).await.unwrap();
            }
        });

        let packet = read_packet(&mut client).await.unwrap();
        writer.await.unwrap();

        assert_eq!(packet.request_id, 9);
        assert_eq!(packet.body, "fragmented");
    }

    #[tokio::test]
    async fn test_decode_reads_one_frame_at_a_time() {
        let mut bytes = encode(1, 2, "first");
        bytes.extend(encode(2, 0, "second"));
        let mut reader = &bytes[..];

        assert_eq!(read_packet(&mut reader).await.unwrap().body, "first");
        assert_eq!(read_packet(&mut reader).await.unwrap().body, "second");
    }
}
