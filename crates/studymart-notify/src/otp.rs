//! One-time code generation

use rand::Rng;

/// Number of digits in a delivery-confirmation OTP
pub const OTP_DIGITS: usize = 6;

/// Generate a fresh 6-digit numeric OTP, zero-padded.
pub fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_is_six_numeric_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), OTP_DIGITS);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
