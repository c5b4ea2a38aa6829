//! In-place file envelope
//!
//! Encryption wraps the entire current content, including any header that is
//! not an envelope header, and prepends the suite's synthesized header.
//! Decryption requires the document to start with exactly that header and
//! leaves only the plaintext behind.

use std::path::Path;

use super::{EnvelopeState, Outcome, PlaintextCheck};
use crate::crypto::{CipherSuite, EnvelopeKey};
use crate::error::{KpfError, KpfResult};
use crate::storage::{read_bytes, write_bytes_atomic, FileLock};

/// Encrypts and decrypts documents in place under one key and suite
#[derive(Debug, Clone)]
pub struct FileEnvelope {
    key: EnvelopeKey,
    suite: CipherSuite,
    check: PlaintextCheck,
    locking: bool,
}

impl FileEnvelope {
    /// Create an envelope using the legacy suite, without locking
    pub fn new(key: EnvelopeKey) -> Self {
        Self {
            key,
            suite: CipherSuite::default(),
            check: PlaintextCheck::default(),
            locking: false,
        }
    }

    pub fn with_suite(mut self, suite: CipherSuite) -> Self {
        self.suite = suite;
        self
    }

    /// Check run on plaintext from suites without authentication
    pub fn with_plaintext_check(mut self, check: PlaintextCheck) -> Self {
        self.check = check;
        self
    }

    /// Hold an exclusive advisory lock on the document during each operation
    pub fn with_locking(mut self, locking: bool) -> Self {
        self.locking = locking;
        self
    }

    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    /// Wrap a document; `None` if it is already wrapped
    pub fn encrypt_bytes(&self, content: &[u8]) -> KpfResult<Option<Vec<u8>>> {
        if EnvelopeState::of(content) == EnvelopeState::Wrapped {
            return Ok(None);
        }

        let ciphertext = self.suite.encrypt(content, &self.key)?;
        let mut doc = self.suite.header().into_bytes();
        doc.extend_from_slice(ciphertext.as_bytes());
        Ok(Some(doc))
    }

    /// Unwrap a document produced by [`FileEnvelope::encrypt_bytes`]
    pub fn decrypt_bytes(&self, doc: &[u8]) -> KpfResult<Vec<u8>> {
        self.unwrap_document(doc, Path::new("<document>"))
    }

    fn unwrap_document(&self, doc: &[u8], origin: &Path) -> KpfResult<Vec<u8>> {
        let header = self.suite.header();
        let ciphertext = doc.strip_prefix(header.as_bytes()).ok_or_else(|| {
            KpfError::precondition(
                origin,
                format!(
                    "not encrypted or header differs from the {} envelope header",
                    self.suite.tag()
                ),
            )
        })?;

        let plaintext = self.suite.decrypt(ciphertext, &self.key)?;
        if !self.suite.is_authenticated() {
            self.check.verify(&plaintext)?;
        }
        Ok(plaintext)
    }

    /// Encrypt a file in place; skipped if it is already wrapped
    pub fn encrypt(&self, path: impl AsRef<Path>) -> KpfResult<Outcome> {
        let path = path.as_ref();
        let _lock = self.lock(path)?;

        let content = read_bytes(path)?;
        match self.encrypt_bytes(&content)? {
            Some(doc) => {
                write_bytes_atomic(path, &doc)?;
                Ok(Outcome::Applied)
            }
            None => Ok(Outcome::Skipped),
        }
    }

    /// Decrypt a file in place, replacing it with the plaintext
    pub fn decrypt(&self, path: impl AsRef<Path>) -> KpfResult<Outcome> {
        let path = path.as_ref();
        let _lock = self.lock(path)?;

        let doc = read_bytes(path)?;
        let plaintext = self.unwrap_document(&doc, path)?;
        write_bytes_atomic(path, &plaintext)?;
        Ok(Outcome::Applied)
    }

    /// Current state of a file
    pub fn state(&self, path: impl AsRef<Path>) -> KpfResult<EnvelopeState> {
        let doc = read_bytes(path)?;
        Ok(EnvelopeState::of(&doc))
    }

    fn lock(&self, path: &Path) -> KpfResult<Option<FileLock>> {
        if !self.locking {
            return Ok(None);
        }
        if !path.is_file() {
            return Err(KpfError::file_not_found(path));
        }
        FileLock::acquire(path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    const LEGACY_HEADER: &str = "#!!\n    @kpfenc true#~>AES-256-cbc\n~!!#\n";

    fn test_key() -> EnvelopeKey {
        EnvelopeKey::from_material(b"0123456789abcdef0123456789abcdef").unwrap()
    }

    fn envelope() -> FileEnvelope {
        FileEnvelope::new(test_key())
    }

    fn write_doc(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_encrypt_hello_world() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, "hello.txt", b"hello world");

        assert_eq!(envelope().encrypt(&path).unwrap(), Outcome::Applied);

        let on_disk = fs::read(&path).unwrap();
        assert_eq!(
            on_disk,
            format!("{}k9UqsBbfHgv6fqa1leyUXw==", LEGACY_HEADER).into_bytes()
        );
        assert_eq!(envelope().state(&path).unwrap(), EnvelopeState::Wrapped);

        assert_eq!(envelope().decrypt(&path).unwrap(), Outcome::Applied);
        assert_eq!(fs::read(&path).unwrap(), b"hello world");
    }

    #[test]
    fn test_encrypt_twice_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, "doc.txt", b"content");

        envelope().encrypt(&path).unwrap();
        let once = fs::read(&path).unwrap();

        assert_eq!(envelope().encrypt(&path).unwrap(), Outcome::Skipped);
        assert_eq!(fs::read(&path).unwrap(), once);
    }

    #[test]
    fn test_existing_header_is_encrypted_as_payload() {
        let temp_dir = TempDir::new().unwrap();
        let original = b"#!!\n    @title notes\n~!!#\nbody with ~!!# and #!! inside";
        let path = write_doc(&temp_dir, "notes.kpf", original);

        envelope().encrypt(&path).unwrap();
        let on_disk = fs::read(&path).unwrap();
        assert!(on_disk.starts_with(LEGACY_HEADER.as_bytes()));
        assert!(!String::from_utf8_lossy(&on_disk).contains("title"));

        envelope().decrypt(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn test_empty_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, "empty.txt", b"");

        envelope().encrypt(&path).unwrap();
        assert!(fs::read(&path).unwrap().len() > LEGACY_HEADER.len());

        envelope().decrypt(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"");
    }

    #[test]
    fn test_decrypt_requires_exact_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, "doc.txt", b"secret");
        envelope().encrypt(&path).unwrap();

        // One extra space in the indentation
        let wrapped = fs::read(&path).unwrap();
        let mut altered = b"#!!\n     @kpfenc".to_vec();
        altered.extend_from_slice(&wrapped["#!!\n    @kpfenc".len()..]);
        fs::write(&path, &altered).unwrap();

        let err = envelope().decrypt(&path).unwrap_err();
        assert!(err.is_precondition());
        assert!(err.to_string().contains("doc.txt"));
        assert_eq!(fs::read(&path).unwrap(), altered);
    }

    #[test]
    fn test_decrypt_plain_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, "plain.txt", b"not encrypted");

        assert!(envelope().decrypt(&path).unwrap_err().is_precondition());
        assert_eq!(fs::read(&path).unwrap(), b"not encrypted");
    }

    #[test]
    fn test_wrong_key_leaves_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, "hello.txt", b"hello world");
        envelope().encrypt(&path).unwrap();
        let wrapped = fs::read(&path).unwrap();

        let wrong = FileEnvelope::new(
            EnvelopeKey::from_material(b"ffffffffffffffffffffffffffffffff").unwrap(),
        );
        assert!(wrong.decrypt(&path).unwrap_err().is_crypto());
        assert_eq!(fs::read(&path).unwrap(), wrapped);
    }

    #[test]
    fn test_wrong_key_with_valid_padding_is_rejected() {
        // This key passes the padding check on the hello world ciphertext
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, "hello.txt", b"hello world");
        envelope().encrypt(&path).unwrap();
        let wrapped = fs::read(&path).unwrap();

        let wrong = FileEnvelope::new(
            EnvelopeKey::from_material(b"wrongkey-00000000000000000000351").unwrap(),
        );
        let err = wrong.decrypt(&path).unwrap_err();
        assert!(err.is_crypto());
        assert!(err.to_string().contains("UTF-8"));
        assert_eq!(fs::read(&path).unwrap(), wrapped);
    }

    #[test]
    fn test_binary_payload_needs_check_off() {
        let payload = [0u8, 0xff, 0xfe, 0x80];
        let wrapped = envelope().encrypt_bytes(&payload).unwrap().unwrap();

        assert!(envelope().decrypt_bytes(&wrapped).unwrap_err().is_crypto());
        let binary = envelope().with_plaintext_check(PlaintextCheck::Off);
        assert_eq!(binary.decrypt_bytes(&wrapped).unwrap(), payload);

        // GCM authenticates, so no text check applies
        let gcm = envelope().with_suite(CipherSuite::Aes256Gcm);
        let wrapped = gcm.encrypt_bytes(&payload).unwrap().unwrap();
        assert_eq!(gcm.decrypt_bytes(&wrapped).unwrap(), payload);
    }

    #[cfg(unix)]
    #[test]
    fn test_round_trip_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, "secret.txt", b"private");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        envelope().encrypt(&path).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o640);
        envelope().decrypt(&path).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o640);
    }

    #[test]
    fn test_gcm_suite_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, "doc.txt", b"authenticated");
        let gcm = envelope().with_suite(CipherSuite::Aes256Gcm);

        gcm.encrypt(&path).unwrap();
        assert!(fs::read(&path)
            .unwrap()
            .starts_with(b"#!!\n    @kpfenc true#~>AES-256-gcm\n~!!#\n"));

        // The legacy envelope sees the flag but not its own header
        assert_eq!(envelope().encrypt(&path).unwrap(), Outcome::Skipped);
        assert!(envelope().decrypt(&path).unwrap_err().is_precondition());

        gcm.decrypt(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"authenticated");
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.txt");
        assert!(envelope().encrypt(&path).unwrap_err().is_not_found());
        assert!(envelope()
            .with_locking(true)
            .decrypt(&path)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_locking_envelope() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, "locked.txt", b"data");
        let locked = envelope().with_locking(true);

        locked.encrypt(&path).unwrap();
        locked.decrypt(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"data");
        assert!(temp_dir.path().join("locked.txt.lock").exists());
    }

    #[test]
    fn test_bytes_api() {
        let env = envelope();
        let wrapped = env.encrypt_bytes(b"abc").unwrap().unwrap();
        assert!(env.encrypt_bytes(&wrapped).unwrap().is_none());
        assert_eq!(env.decrypt_bytes(&wrapped).unwrap(), b"abc");
        assert!(env.decrypt_bytes(b"abc").unwrap_err().is_precondition());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn encrypt_decrypt_is_identity(payload in prop::collection::vec(any::<u8>(), 0..512)) {
            let env = envelope().with_plaintext_check(PlaintextCheck::Off);
            let result = env.encrypt_bytes(&payload).unwrap();
            match result {
                Some(wrapped) => prop_assert_eq!(env.decrypt_bytes(&wrapped).unwrap(), payload),
                // Random bytes that already form an envelope header are left alone
                None => prop_assert_eq!(EnvelopeState::of(&payload), EnvelopeState::Wrapped),
            }
        }

        #[test]
        fn marker_text_payloads_round_trip(body in "[#!~@a-z \n]{0,200}") {
            let env = envelope();
            let payload = format!("#!!\n@note x\n~!!#\n{}", body);
            let wrapped = env.encrypt_bytes(payload.as_bytes()).unwrap().unwrap();
            prop_assert_eq!(env.decrypt_bytes(&wrapped).unwrap(), payload.into_bytes());
        }
    }
}
