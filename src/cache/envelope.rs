//! Durable Envelope Module
//!
//! Framing for values written to the durable tier. The envelope carries the
//! absolute expiry next to the encoded value, so an entry read back from the
//! durable tier keeps the lifetime it was written with.
//!
//! Layout: one version byte, the expiry as big-endian Unix milliseconds, then
//! the encoded value.

use bytes::{Buf, BufMut, Bytes, BytesMut};

const VERSION: u8 = 1;
const HEADER_LEN: usize = 1 + 8;

// == Envelope ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Unix millisecond at which the value stops being live
    pub expires_at_ms: u64,
    /// Encoded value, as held by the fast tier
    pub payload: Bytes,
}

impl Envelope {
    pub fn new(payload: Bytes, expires_at_ms: u64) -> Self {
        Self {
            expires_at_ms,
            payload,
        }
    }

    // == Encode ==
    /// Frames the envelope for the durable store.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.payload.len());
        buf.put_u8(VERSION);
        buf.put_u64(self.expires_at_ms);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    // == Decode ==
    /// Parses a framed envelope. Returns `None` for anything this version
    /// did not write.
    pub fn decode(mut raw: Bytes) -> Option<Self> {
        if raw.len() < HEADER_LEN || raw[0] != VERSION {
            return None;
        }
        raw.advance(1);
        let expires_at_ms = raw.get_u64();
        Some(Self {
            expires_at_ms,
            payload: raw,
        })
    }

    /// Same boundary rule as the fast tier: expired once `now >= expires_at`.
    pub fn is_live(&self, now: u64) -> bool {
        now < self.expires_at_ms
    }

    /// Returns remaining lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at_ms.saturating_sub(now)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let framed = Envelope::new(Bytes::from_static(b"abc"), 0x0102).encode();

        assert_eq!(framed.len(), HEADER_LEN + 3);
        assert_eq!(framed[0], VERSION);
        assert_eq!(&framed[1..9], &[0, 0, 0, 0, 0, 0, 1, 2]);
        assert_eq!(&framed[9..], b"abc");
    }

    #[test]
    fn test_decode_framed_value() {
        let envelope = Envelope::new(Bytes::from_static(b"\xa3Ada"), 65_000);
        assert_eq!(Envelope::decode(envelope.encode()), Some(envelope));
    }

    #[test]
    fn test_decode_empty_payload() {
        let decoded = Envelope::decode(Envelope::new(Bytes::new(), 5).encode()).unwrap();
        assert!(decoded.payload.is_empty());
        assert_eq!(decoded.expires_at_ms, 5);
    }

    #[test]
    fn test_decode_rejects_foreign_bytes() {
        assert_eq!(Envelope::decode(Bytes::new()), None);
        assert_eq!(Envelope::decode(Bytes::from_static(b"\x01short")), None);
        assert_eq!(Envelope::decode(Bytes::from_static(b"{\"not\": \"framed\"}")), None);
    }

    #[test]
    fn test_remaining_lifetime() {
        let envelope = Envelope::new(Bytes::new(), 10_000);

        assert!(envelope.is_live(9_999));
        assert!(!envelope.is_live(10_000));
        assert_eq!(envelope.ttl_remaining_ms(4_000), 6_000);
        assert_eq!(envelope.ttl_remaining_ms(10_000), 0);
        assert_eq!(envelope.ttl_remaining_ms(50_000), 0);
    }
}
