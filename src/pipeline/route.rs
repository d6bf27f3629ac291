// The two URL shapes the app answers to: the index, which plays the default
// preset, and `/song/<token>`. A leading `#` is tolerated since links are
// handed out in hash form.

use crate::pipeline::codec::{self, DecodeError};
use crate::pipeline::presets;
use crate::pipeline::song::Song;

const SONG_PREFIX: &str = "/song/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route<'a> {
    Index,
    Song(&'a str),
}

impl<'a> Route<'a> {
    pub fn parse(path: &'a str) -> Result<Self, DecodeError> {
        let path = path.strip_prefix('#').unwrap_or(path);
        if path.is_empty() || path == "/" {
            return Ok(Route::Index);
        }
        match path.strip_prefix(SONG_PREFIX) {
            Some(token) if !token.is_empty() => Ok(Route::Song(token)),
            _ => Err(DecodeError::UnknownRoute(path.to_string())),
        }
    }

    pub fn resolve(&self) -> Result<Song, DecodeError> {
        match self {
            Route::Index => presets::default_song(),
            Route::Song(token) => codec::song_from_token(token),
        }
    }
}

pub fn song_path(token: &str) -> String {
    format!("#{SONG_PREFIX}{token}")
}

/// Absolute link for `token` under `origin` (scheme and host, no trailing slash).
pub fn permalink(origin: &str, token: &str) -> String {
    format!("{}/{}", origin.trim_end_matches('/'), song_path(token))
}
