use crate::error::{AppError, AppResult};

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a public tracking code of the form `IB-XXXX-XXXXXX` where each
/// X is an uppercase base36 character drawn from OS randomness. The code is
/// the only handle a reporter holds on their case, so it must be
/// unpredictable; uniqueness is enforced by the store's unique index and a
/// retry at the insert site.
pub fn generate_tracking_code() -> AppResult<String> {
    let mut buf = [0u8; 10];
    getrandom::getrandom(&mut buf)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("OS RNG unavailable: {}", e)))?;

    let chars: Vec<char> = buf
        .iter()
        .map(|b| BASE36[(*b as usize) % BASE36.len()] as char)
        .collect();

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[4..].iter().collect();
    Ok(format!("IB-{}-{}", head, tail))
}

/// Tracking lookups are case-insensitive; codes are stored uppercase.
pub fn normalize_tracking_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches_format(code: &str) -> bool {
        let parts: Vec<&str> = code.split('-').collect();
        parts.len() == 3
            && parts[0] == "IB"
            && parts[1].len() == 4
            && parts[2].len() == 6
            && parts[1..]
                .iter()
                .all(|p| p.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()))
    }

    #[test]
    fn code_has_expected_shape() {
        for _ in 0..50 {
            let code = generate_tracking_code().unwrap();
            assert!(matches_format(&code), "bad code: {}", code);
        }
    }

    #[test]
    fn codes_are_not_constant() {
        let a = generate_tracking_code().unwrap();
        let b = generate_tracking_code().unwrap();
        let c = generate_tracking_code().unwrap();
        assert!(a != b || b != c);
    }

    #[test]
    fn normalize_uppercases_and_trims() {
        assert_eq!(normalize_tracking_code(" ib-a1b2-c3d4e5 "), "IB-A1B2-C3D4E5");
        assert_eq!(normalize_tracking_code("IB-0000-000000"), "IB-0000-000000");
    }
}
