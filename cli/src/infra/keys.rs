//! Filesystem implementation of the `KeyStore` port.
//!
//! Keys live at `<dir>/tins-<short name>` and `<dir>/tins-<short name>.pub`,
//! where `dir` defaults to `~/.ssh`.

use std::fs::File;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use ssh_key::public::KeyData;

use crate::application::ports::{KeyPair, KeyStore};
use crate::domain::{InstanceIdentity, naming};
use crate::domain::error::KeyError;

/// RSA modulus size for generated keys.
pub const RSA_KEY_BITS: usize = 2048;

/// Key pair store rooted at a single directory.
pub struct FsKeyStore {
    dir: PathBuf,
}

impl FsKeyStore {
    /// Creates a store rooted at `~/.ssh`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_dir(home.join(".ssh")))
    }

    /// Creates a store rooted at an arbitrary directory (for testing).
    #[must_use]
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn public_path(&self, identity: &InstanceIdentity) -> PathBuf {
        let mut path = self.path(identity).into_os_string();
        path.push(".pub");
        PathBuf::from(path)
    }
}

impl KeyStore for FsKeyStore {
    fn generate(&self, identity: &InstanceIdentity) -> Result<KeyPair> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create dir {}", self.dir.display()))?;
        set_permissions(&self.dir, 0o700)?;

        let private_key_path = self.path(identity);
        let public_key_path = self.public_path(identity);

        // Claim the private key path first so an existing key is never replaced.
        let mut private_file = create_new(&private_key_path, 0o600)?;
        let written = generate_rsa_pair().map_err(anyhow::Error::from).and_then(
            |(private_pem, public_key)| {
                private_file
                    .write_all(private_pem.as_bytes())
                    .with_context(|| format!("write {}", private_key_path.display()))?;
                std::fs::write(&public_key_path, public_key.as_bytes())
                    .with_context(|| format!("write {}", public_key_path.display()))?;
                set_permissions(&public_key_path, 0o644)?;
                Ok(public_key)
            },
        );
        let public_key = match written {
            Ok(public_key) => public_key,
            Err(e) => {
                let _ = std::fs::remove_file(&private_key_path);
                let _ = std::fs::remove_file(&public_key_path);
                return Err(e);
            }
        };

        tracing::debug!(path = %private_key_path.display(), "generated key pair");
        Ok(KeyPair {
            private_key_path,
            public_key_path,
            public_key,
        })
    }

    fn delete(&self, identity: &InstanceIdentity) -> Result<()> {
        remove_if_present(&self.path(identity))?;
        remove_if_present(&self.public_path(identity))
    }

    fn path(&self, identity: &InstanceIdentity) -> PathBuf {
        self.dir.join(naming::full_name(&identity.short_name))
    }

    fn exists(&self, identity: &InstanceIdentity) -> bool {
        self.path(identity).exists()
    }
}

/// PKCS#1 PEM private key and OpenSSH public key line.
fn generate_rsa_pair() -> Result<(String, String), KeyError> {
    let private = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
        .map_err(|e| KeyError::Generate(e.to_string()))?;
    let pem = private
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| KeyError::Encode(e.to_string()))?;

    let public = ssh_key::public::RsaPublicKey::try_from(private.to_public_key())
        .map_err(|e| KeyError::Encode(e.to_string()))?;
    let openssh = ssh_key::PublicKey::new(KeyData::Rsa(public), "")
        .to_openssh()
        .map_err(|e| KeyError::Encode(e.to_string()))?;

    Ok((pem.to_string(), format!("{openssh}\n")))
}

fn remove_if_present(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
    }
}

/// Create `path` exclusively, with `mode` applied at creation on unix.
fn create_new(path: &Path, mode: u32) -> Result<File> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    match options.open(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(KeyError::AlreadyExists(path.to_path_buf()).into())
        }
        Err(e) => Err(e).with_context(|| format!("create {}", path.display())),
    }
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .with_context(|| format!("set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
