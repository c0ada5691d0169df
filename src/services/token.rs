use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;

pub const DEFAULT_TOKEN_LENGTH: usize = 20;

/// Random URL-safe token without look-alike characters (`l`, `I`, `O`, `0`).
pub fn friendly_token(length: usize) -> String {
    let mut bytes = vec![0u8; (length * 3).div_ceil(4)];
    rand::thread_rng().fill_bytes(&mut bytes);

    URL_SAFE_NO_PAD
        .encode(&bytes)
        .chars()
        .map(|c| match c {
            'l' => 's',
            'I' => 'x',
            'O' => 'y',
            '0' => 'z',
            other => other,
        })
        .take(length)
        .collect()
}
