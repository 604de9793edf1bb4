use anyhow::Result;

pub const CODE_LENGTH: usize = 6;

// Largest multiple of 1_000_000 that fits in a u32; draws at or above
// this are rejected so the modulo stays uniform.
const REJECT_ABOVE: u32 = 4_294_000_000;

/// Generate a uniformly distributed six-digit reset code, zero-padded.
pub fn generate_code() -> Result<String> {
    loop {
        let mut buf = [0u8; 4];
        getrandom::getrandom(&mut buf)
            .map_err(|e| anyhow::anyhow!("OS RNG unavailable: {}", e))?;
        let n = u32::from_le_bytes(buf);
        if n < REJECT_ABOVE {
            return Ok(format!("{:06}", n % 1_000_000));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..200 {
            let code = generate_code().unwrap();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert!(code.parse::<u32>().unwrap() < 1_000_000);
        }
    }

    #[test]
    fn leading_zeros_are_preserved() {
        // 0 % 1_000_000 formats as "000000"; spot-check the formatter.
        assert_eq!(format!("{:06}", 7u32), "000007");
        assert_eq!(format!("{:06}", 0u32), "000000");
    }

    #[test]
    fn rejection_bound_is_a_multiple_of_the_range() {
        assert_eq!(REJECT_ABOVE % 1_000_000, 0);
        assert!(u32::MAX - REJECT_ABOVE < 1_000_000);
    }
}
