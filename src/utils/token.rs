use crate::error::{AppError, AppResult};

const ALPHANUMERIC: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Length of a share token id. 20 characters over a 62-symbol alphabet is
/// ~119 bits of keyspace, comfortably past the 2^80 guessing bar.
pub const SHARE_TOKEN_LEN: usize = 20;

/// Generate an opaque share-token id from OS randomness. Rejection
/// sampling keeps the character distribution uniform.
pub fn generate_share_token_id() -> AppResult<String> {
    let mut out = String::with_capacity(SHARE_TOKEN_LEN);
    let mut buf = [0u8; 32];

    while out.len() < SHARE_TOKEN_LEN {
        getrandom::getrandom(&mut buf)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("OS RNG unavailable: {}", e)))?;
        for b in buf {
            // Reject bytes that would bias the modulo. 248 = 4 * 62.
            if b < 248 {
                out.push(ALPHANUMERIC[(b % 62) as usize] as char);
                if out.len() == SHARE_TOKEN_LEN {
                    break;
                }
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_alphanumeric_and_long_enough() {
        let token = generate_share_token_id().unwrap();
        assert_eq!(token.len(), SHARE_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(SHARE_TOKEN_LEN >= 16);
    }

    #[test]
    fn tokens_do_not_repeat() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(generate_share_token_id().unwrap()));
        }
    }
}
