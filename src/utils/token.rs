use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Random alphanumeric token used as the opaque share link for an exam.
pub fn generate_share_token(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_token_has_requested_length_and_charset() {
        let token = generate_share_token(32);
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn share_tokens_do_not_repeat() {
        let a = generate_share_token(32);
        let b = generate_share_token(32);
        assert_ne!(a, b);
    }
}
