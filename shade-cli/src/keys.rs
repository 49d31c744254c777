//! Key file handling.
//!
//! Keys are stored as pretty JSON with hex scalars and compressed public keys.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use shade_core::types::{KeyPair, MetaAddress, PublicKey, ShadeKeys};
use shade_core::Scalar;

/// On-disk key set.
#[derive(Serialize, Deserialize)]
pub struct KeyFile {
    pub spend_secret: String,
    pub view_secret: String,
    pub spend_public: String,
    pub view_public: String,
    pub meta_address: String,
}

impl KeyFile {
    pub fn from_keys(keys: &ShadeKeys) -> Self {
        Self {
            spend_secret: keys.spend.secret().to_hex(),
            view_secret: keys.view.secret().to_hex(),
            spend_public: keys.spend.public().to_hex(),
            view_public: keys.view.public().to_hex(),
            meta_address: keys.meta_address().to_hex(),
        }
    }

    /// Rebuilds the key set. Stored public keys must match the secrets.
    pub fn to_keys(&self) -> Result<ShadeKeys> {
        let spend = pair(&self.spend_secret, &self.spend_public, "spend")?;
        let view = pair(&self.view_secret, &self.view_public, "view")?;
        let keys = ShadeKeys::new(spend, view);

        let stored = MetaAddress::from_hex(&self.meta_address).context("Invalid meta_address")?;
        if stored != keys.meta_address() {
            bail!("meta_address does not match the stored keys");
        }
        Ok(keys)
    }

    pub fn load(path: &Path) -> Result<ShadeKeys> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open keys file {}", path.display()))?;
        let key_file: KeyFile =
            serde_json::from_reader(file).context("Keys file is not valid JSON")?;
        key_file.to_keys()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write keys file {}", path.display()))
    }
}

fn pair(secret_hex: &str, public_hex: &str, name: &str) -> Result<KeyPair> {
    let secret = Scalar::from_hex(secret_hex)
        .with_context(|| format!("Invalid {name}_secret"))?;
    let public = PublicKey::from_hex(public_hex)
        .with_context(|| format!("Invalid {name}_public"))?;

    let pair = KeyPair::from_secret(secret);
    if pair.public() != &public {
        bail!("{name}_public does not match {name}_secret");
    }
    Ok(pair)
}
