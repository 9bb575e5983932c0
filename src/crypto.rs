//! Cryptographic logics.

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit, Nonce};
use aes_gcm::{Aes256Gcm, Key};
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Argon2, Params, Version};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use validator::{ValidationError, ValidationErrors};
use zeroize::Zeroizing;

use crate::config::Argon2 as ArgonConfig;

const NONCE_SIZE: usize = 12;
const KEY_LENGTH: usize = 32;

type Result<T> = std::result::Result<T, CryptoError>;

#[derive(thiserror::Error, Debug)]
pub enum CryptoError {
    #[error(transparent)]
    AesGcm(#[from] aes_gcm::Error),
    #[error("argon2 error: {0}")]
    Argon2(String),

    #[error("hex is not valid")]
    Hex(#[from] hex::FromHexError),
    #[error("encrypted data is not utf8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("data length is {value} while at least {excepted} is excepted")]
    DataLength { value: usize, excepted: usize },
}

/// Cryptographic manager.
pub struct Crypto {
    pub symmetric: SymmetricCipher,
    pub pwd: PasswordManager,
    pub hasher: Hasher,
}

impl Crypto {
    /// Create a new [`Crypto`].
    pub fn new(
        config: Option<ArgonConfig>,
        master_key: impl AsRef<[u8]>,
        salt: impl AsRef<[u8]>,
    ) -> Result<Self> {
        let key = SymmetricKey::derive_from_password(master_key, &salt)?;
        let symmetric = SymmetricCipher::new(key);
        let pwd = PasswordManager::new(config)?;
        let hasher = Hasher::new(salt);

        Ok(Self {
            symmetric,
            pwd,
            hasher,
        })
    }
}

/// SymmetricKey holds a fixed-size key protected by Zeroizing.
#[derive(Clone)]
pub struct SymmetricKey(Zeroizing<[u8; KEY_LENGTH]>);

impl SymmetricKey {
    /// Create from raw bytes (must be 32 bytes).
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let length = bytes.len();
        let bytes: [u8; KEY_LENGTH] =
            bytes.try_into().map_err(|_| CryptoError::DataLength {
                value: length,
                excepted: KEY_LENGTH,
            })?;

        Ok(Self(Zeroizing::new(bytes)))
    }

    /// Derive key from a password + salt using Argon2.
    pub fn derive_from_password(
        password: impl AsRef<[u8]>,
        salt: impl AsRef<[u8]>,
    ) -> Result<Self> {
        let config = ArgonConfig {
            memory_cost: 1024 * 64,
            iterations: 8,
            parallelism: 2,
            hash_length: KEY_LENGTH,
        };

        let mut pwd = PasswordManager::new(Some(config))?;
        pwd.salt(Some(salt.as_ref().to_vec()));
        let phc_hash_string = pwd.hash_password(password)?;
        pwd.salt(None); // remove fixed salt.
        let password_hash = PasswordHash::new(&phc_hash_string)
            .map_err(|e| CryptoError::Argon2(e.to_string()))?;

        let hash = password_hash
            .hash
            .ok_or_else(|| CryptoError::Argon2("empty hash output".into()))?;

        Self::from_bytes(hash.as_bytes().to_vec())
    }

    fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }
}

/// SymmetricCipher provides encrypt/decrypt operations with AES-256-GCM.
///
/// Sauce accounts never store the raw email: the ciphertext below is the
/// reversible mask, while [`Hasher`] provides the lookup digest.
pub struct SymmetricCipher {
    key: SymmetricKey,
}

impl SymmetricCipher {
    /// Create a new [`SymmetricCipher`].
    pub fn new(key: SymmetricKey) -> Self {
        Self { key }
    }

    pub fn encrypt_and_hex(
        &self,
        plaintext: impl AsRef<[u8]>,
    ) -> Result<String> {
        let cipher_text = self.encrypt(plaintext)?;
        Ok(hex::encode(cipher_text))
    }

    pub fn decrypt_from_hex(&self, data: impl AsRef<[u8]>) -> Result<String> {
        let data = hex::decode(data)?;
        let plain = self.decrypt(data)?;
        Ok(String::from_utf8(plain)?)
    }

    /// Encrypts data returning raw bytes.
    pub fn encrypt(&self, plaintext: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let key = Key::<Aes256Gcm>::from_slice(self.key.as_slice());
        let cipher = Aes256Gcm::new(key);

        // Generate random 96-bit nonce.
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = GenericArray::from_slice(&nonce_bytes);

        let cipher_text = cipher.encrypt(nonce, plaintext.as_ref())?;

        let mut out = Vec::with_capacity(NONCE_SIZE + cipher_text.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&cipher_text);
        Ok(out)
    }

    /// Decrypt raw data.
    pub fn decrypt(&self, data: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let data = data.as_ref();
        if data.len() < NONCE_SIZE {
            return Err(CryptoError::DataLength {
                value: data.len(),
                excepted: NONCE_SIZE,
            });
        }

        let (nonce_bytes, cipher_text) = data.split_at(NONCE_SIZE);
        let nonce = Nonce::<Aes256Gcm>::clone_from_slice(nonce_bytes);

        let key = Key::<Aes256Gcm>::from_slice(self.key.as_slice());
        let cipher = Aes256Gcm::new(key);

        let plain = cipher.decrypt(&nonce, cipher_text.as_ref())?;

        Ok(plain)
    }
}

/// Password manager that uses Argon2id and PHC string format for hashing and
/// verification.
pub struct PasswordManager {
    params: Params,
    fixed_salt: Option<Vec<u8>>,
}

impl PasswordManager {
    /// Create a new [`PasswordManager`].
    pub fn new(config: Option<ArgonConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();

        let params = Params::new(
            config.memory_cost,
            config.iterations,
            config.parallelism,
            Some(config.hash_length),
        )
        .map_err(|err| CryptoError::Argon2(err.to_string()))?;

        Ok(Self {
            params,
            fixed_salt: None,
        })
    }

    /// Set a fixed salt.
    /// **Used for derivation password only!**
    fn salt(&mut self, salt: Option<Vec<u8>>) {
        self.fixed_salt = salt;
    }

    /// Hash password using Argon2id.
    pub fn hash_password(
        &self,
        password: impl AsRef<[u8]>,
    ) -> std::result::Result<String, CryptoError> {
        let argon2 = Argon2::new(
            argon2::Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        );
        let salt = match &self.fixed_salt {
            Some(salt) => SaltString::encode_b64(salt)
                .map_err(|e| CryptoError::Argon2(e.to_string()))?,
            None => SaltString::generate(&mut OsRng),
        };
        let hash = argon2
            .hash_password(password.as_ref(), &salt)
            .map_err(|e| CryptoError::Argon2(e.to_string()))?;

        Ok(hash.to_string())
    }

    fn invalid_password() -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.add(
            "password",
            ValidationError::new("invalid_password")
                .with_message("Invalid password.".into()),
        );
        errors
    }

    /// Verify password against a PHC.
    pub fn verify_password(
        &self,
        password: impl AsRef<[u8]>,
        phc_hash: impl ToString,
    ) -> std::result::Result<(), ValidationErrors> {
        let argon2 = Argon2::new(
            argon2::Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        );
        let phc_hash = phc_hash.to_string();

        let parsed = PasswordHash::new(&phc_hash)
            .map_err(|_| Self::invalid_password())?;

        argon2
            .verify_password(password.as_ref(), &parsed)
            .map_err(|_| Self::invalid_password())
    }
}

/// Fresh random identifier, hex-encoded.
pub fn random_id(bytes: usize) -> String {
    let mut raw = vec![0u8; bytes];
    OsRng.fill_bytes(&mut raw);
    hex::encode(raw)
}

/// Peppered SHA-256, used as deterministic lookup digest for emails.
pub struct Hasher(Zeroizing<Vec<u8>>);

impl Hasher {
    /// Create a new [`Hasher`].
    pub fn new(pepper: impl AsRef<[u8]>) -> Self {
        Self(Zeroizing::new(pepper.as_ref().to_vec()))
    }

    /// Digest data into SHA256.
    pub fn digest(&self, data: impl AsRef<[u8]>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.0);
        hasher.update(&data);
        let hash = hasher.finalize();

        hex::encode(hash)
    }
}
