use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

// m=8MB, t=2 iterations, p=1 parallelism
fn get_argon2() -> Result<Argon2<'static>, argon2::password_hash::Error> {
    let params = Params::new(8192, 2, 1, None)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = get_argon2()?.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(get_argon2()?.verify_password(password.as_bytes(), &parsed_hash).is_ok())
}

/// Hash verified against when no account matches, so an unknown email costs as much as a wrong password.
pub fn dummy_password_hash() -> Result<&'static str, argon2::password_hash::Error> {
    static DUMMY: OnceLock<String> = OnceLock::new();

    if let Some(hash) = DUMMY.get() {
        return Ok(hash);
    }
    let hash = hash_password("khazaana-placeholder-credential")?;
    Ok(DUMMY.get_or_init(|| hash))
}

/// SHA-256 hex digest of a one-time code, as stored at rest.
pub fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.trim().as_bytes()))
}

pub fn verify_code(candidate: &str, code_hash: &str) -> bool {
    let candidate = hash_code(candidate);
    // length is fixed by the digest, compare without early exit
    candidate.len() == code_hash.len()
        && candidate
            .bytes()
            .zip(code_hash.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
