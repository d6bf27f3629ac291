// Song <-> share token.
//
//   SongData -> compact JSON -> UTF-16 units -> LZ (16 bits/unit)
//            -> big-endian bytes -> padded base64 -> percent-encoded
//
// Decoding runs the same chain backwards and fails loudly at whichever stage
// the token stops making sense.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::pipeline::lz;
use crate::pipeline::persistence::{self, SongData};
use crate::pipeline::song::Song;

/// Characters `encodeURIComponent` escapes: everything except
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("token is not valid percent-encoded UTF-8: {0}")]
    PercentEncoding(#[from] std::str::Utf8Error),

    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("compressed payload has an odd byte length ({0})")]
    OddLength(usize),

    #[error("compressed payload is corrupt or truncated")]
    Compression,

    #[error("decompressed payload is not valid UTF-16")]
    Utf16,

    #[error("song data is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("song tempo must be at least 1")]
    InvalidTempo,

    #[error("channel {index} has no steps")]
    EmptyChannel { index: usize },

    #[error("channel {index} volume is outside 0..=1")]
    InvalidVolume { index: usize },

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("unrecognised route: {0}")]
    UnknownRoute(String),
}

#[derive(Debug, thiserror::Error)]
#[error("failed to serialise song: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

pub fn encode(data: &SongData) -> Result<String, EncodeError> {
    let json = serde_json::to_string(data)?;
    let units: Vec<u16> = json.encode_utf16().collect();
    let bytes: Vec<u8> = lz::compress(&units)
        .into_iter()
        .flat_map(u16::to_be_bytes)
        .collect();
    let base64 = BASE64.encode(bytes);
    Ok(utf8_percent_encode(&base64, URI_COMPONENT).to_string())
}

pub fn decode(token: &str) -> Result<SongData, DecodeError> {
    let json = decode_text(token)?;
    Ok(serde_json::from_str(&json)?)
}

// Everything up to, but not including, the JSON parse.
pub(crate) fn decode_text(token: &str) -> Result<String, DecodeError> {
    let base64 = percent_decode_str(token).decode_utf8()?;
    let bytes = BASE64.decode(base64.as_bytes())?;
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddLength(bytes.len()));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    let text = lz::decompress(&units).ok_or(DecodeError::Compression)?;
    String::from_utf16(&text).map_err(|_| DecodeError::Utf16)
}

pub fn song_to_token(song: &Song) -> Result<String, EncodeError> {
    encode(&persistence::serialize(song))
}

pub fn song_from_token(token: &str) -> Result<Song, DecodeError> {
    persistence::deserialize(decode(token)?)
}

#[cfg(test)]
pub(crate) fn encode_text(text: &str) -> String {
    let units: Vec<u16> = text.encode_utf16().collect();
    let bytes: Vec<u8> = lz::compress(&units)
        .into_iter()
        .flat_map(u16::to_be_bytes)
        .collect();
    utf8_percent_encode(&BASE64.encode(bytes), URI_COMPONENT).to_string()
}
