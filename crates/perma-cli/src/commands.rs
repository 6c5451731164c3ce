use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use perma_crypto::{decrypt_object, encrypt_object};
use perma_sdk::{
    ContentHasher, LocalSigner, Permastore, PublicKey, ServiceConfig, SymmetricKey,
};
use serde_json::{json, Value};

use crate::cli::*;

/// Global options, split off before the command is consumed.
struct Settings {
    format: OutputFormat,
    config: Option<PathBuf>,
    api_url: Option<String>,
    mirror_url: Option<String>,
}

impl Settings {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format.clone(),
            config: cli.config.clone(),
            api_url: cli.api_url.clone(),
            mirror_url: cli.mirror_url.clone(),
        }
    }

    /// File config (or production defaults) with command-line overrides applied.
    fn service_config(&self) -> anyhow::Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ServiceConfig::production(),
        };
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(url) = &self.mirror_url {
            config.mirror_url = url.clone();
        }
        config.validate()?;
        tracing::debug!(
            api = %config.api_url,
            mirror = %config.mirror_url,
            "resolved service config"
        );
        Ok(config)
    }

    fn connect(&self) -> anyhow::Result<Permastore> {
        Ok(Permastore::connect(self.service_config()?)?)
    }

    fn json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::from_cli(&cli);
    match cli.command {
        Command::Keygen => cmd_keygen(&settings),
        Command::Hash(args) => cmd_hash(&settings, args),
        Command::Store(args) => cmd_store(&settings, args).await,
        Command::Fetch(args) => cmd_fetch(&settings, args).await,
        Command::List(args) => cmd_list(&settings, args).await,
        Command::Insert(args) => cmd_insert(&settings, args).await,
        Command::Feed(args) => cmd_feed(&settings, args).await,
        Command::Encrypt(args) => cmd_encrypt(&settings, args),
        Command::Decrypt(args) => cmd_decrypt(&settings, args),
    }
}

fn cmd_keygen(settings: &Settings) -> anyhow::Result<()> {
    let signer = LocalSigner::generate();
    if settings.json() {
        print_json(&json!({
            "secret": signer.secret_hex(),
            "public": signer.public_key().to_hex(),
        }))
    } else {
        println!("{} Generated key pair", "✓".green().bold());
        println!("  Secret: {}", signer.secret_hex().red());
        println!("  Public: {}", signer.public_key().to_hex().cyan());
        Ok(())
    }
}

fn cmd_hash(settings: &Settings, args: FileArgs) -> anyhow::Result<()> {
    let data = read_file(&args.file)?;
    let cid = ContentHasher::hash(&data);
    if settings.json() {
        print_json(&json!({ "cid": cid, "bytes": data.len() }))
    } else {
        println!("{}", cid.to_string().yellow());
        Ok(())
    }
}

async fn cmd_store(settings: &Settings, args: FileArgs) -> anyhow::Result<()> {
    let data = read_file(&args.file)?;
    let cid = settings.connect()?.put(&data).await?;
    if settings.json() {
        print_json(&json!({ "cid": cid, "bytes": data.len() }))
    } else {
        println!("{} Stored {} bytes", "✓".green().bold(), data.len());
        println!("  CID: {}", cid.to_string().yellow());
        Ok(())
    }
}

async fn cmd_fetch(settings: &Settings, args: FetchArgs) -> anyhow::Result<()> {
    let data = settings.connect()?.get(&args.cid).await?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, &data).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("{} Wrote {} bytes to {}", "✓".green().bold(), data.len(), path.display());
        }
        None => std::io::stdout().write_all(&data)?,
    }
    Ok(())
}

async fn cmd_list(settings: &Settings, args: ListArgs) -> anyhow::Result<()> {
    let owner = parse_pubkey(&args.pubkey)?;
    let entries = settings.connect()?.list(&owner).await?;
    if settings.json() {
        return print_json(&json!(entries));
    }
    if entries.is_empty() {
        println!("No entries for {}.", owner.to_hex().cyan());
    }
    for (i, entry) in entries.iter().enumerate() {
        println!(
            "{:>4}  {}  {}  {}",
            i.to_string().dimmed(),
            entry.version.dimmed(),
            entry.content.to_string().yellow(),
            format!("proof {}", entry.proof.short()).dimmed()
        );
    }
    Ok(())
}

async fn cmd_insert(settings: &Settings, args: InsertArgs) -> anyhow::Result<()> {
    let data = read_file(&args.file)?;
    let signer = parse_signer(&args.key)?;
    let ack = settings.connect()?.insert(&data, &signer).await?;
    if settings.json() {
        print_json(&json!(ack))
    } else {
        println!("{} Indexed ({})", "✓".green().bold(), ack.status);
        println!("  Path: {}", ack.path.yellow());
        Ok(())
    }
}

async fn cmd_feed(settings: &Settings, args: FeedArgs) -> anyhow::Result<()> {
    match args.action {
        FeedAction::Publish { file, key, aes } => {
            let document: Value = serde_json::from_slice(&read_file(&file)?)
                .with_context(|| format!("{} is not JSON", file.display()))?;
            let signer = parse_signer(&key)?;
            let feed = settings.connect()?.feed();
            let ack = match aes.as_deref().map(parse_aes_key).transpose()? {
                Some(aes) => feed.publish_encrypted(&document, &signer, &aes).await?,
                None => feed.publish_plaintext(&document, &signer).await?,
            };
            if settings.json() {
                print_json(&json!(ack))
            } else {
                let mode = if aes.is_some() { "encrypted" } else { "plaintext" };
                println!("{} Published {} document", "✓".green().bold(), mode);
                println!("  Path: {}", ack.path.yellow());
                Ok(())
            }
        }
        FeedAction::List { pubkey, aes } => {
            let owner = parse_pubkey(&pubkey)?;
            let aes = aes.as_deref().map(parse_aes_key).transpose()?;
            let documents = settings.connect()?.feed().list(&owner, aes.as_ref()).await?;
            if settings.json() {
                return print_json(&json!(documents));
            }
            for document in &documents {
                println!("{}", serde_json::to_string(document)?);
            }
            Ok(())
        }
    }
}

fn cmd_encrypt(settings: &Settings, args: FileArgs) -> anyhow::Result<()> {
    let document: Value = serde_json::from_slice(&read_file(&args.file)?)
        .with_context(|| format!("{} is not JSON", args.file.display()))?;
    let encrypted = encrypt_object(&document)?;
    let ciphertext = hex::encode(&encrypted.ciphertext);
    if settings.json() {
        print_json(&json!({ "ciphertext": ciphertext, "key_iv": encrypted.key_iv }))
    } else {
        println!("  Ciphertext: {}", ciphertext);
        println!("  Key/IV:     {}", encrypted.key_iv.red());
        Ok(())
    }
}

fn cmd_decrypt(settings: &Settings, args: DecryptArgs) -> anyhow::Result<()> {
    let ciphertext = hex::decode(args.ciphertext.trim()).context("ciphertext is not hex")?;
    let document: Value = decrypt_object(&ciphertext, args.key_iv.trim())?;
    if settings.json() {
        print_json(&document)
    } else {
        println!("{}", serde_json::to_string_pretty(&document)?);
        Ok(())
    }
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn parse_pubkey(s: &str) -> anyhow::Result<PublicKey> {
    PublicKey::from_hex(s.trim()).context("invalid public key")
}

fn parse_signer(s: &str) -> anyhow::Result<LocalSigner> {
    LocalSigner::from_hex(s.trim()).context("invalid secret key")
}

fn parse_aes_key(s: &str) -> anyhow::Result<SymmetricKey> {
    SymmetricKey::from_hex(s.trim()).context("AES key must be 16 bytes of hex")
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(config: Option<PathBuf>, api_url: Option<&str>) -> Settings {
        Settings {
            format: OutputFormat::Text,
            config,
            api_url: api_url.map(str::to_string),
            mirror_url: None,
        }
    }

    #[test]
    fn defaults_to_production() {
        let config = settings(None, None).service_config().unwrap();
        assert_eq!(config, ServiceConfig::production());
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perma.toml");
        std::fs::write(
            &path,
            "api_url = \"http://file.test\"\nmirror_url = \"http://mirror.test\"\n",
        )
        .unwrap();

        let config = settings(Some(path.clone()), None).service_config().unwrap();
        assert_eq!(config.api_url, "http://file.test");

        let config = settings(Some(path), Some("http://flag.test")).service_config().unwrap();
        assert_eq!(config.api_url, "http://flag.test");
        assert_eq!(config.mirror_url, "http://mirror.test");
    }

    #[test]
    fn invalid_override_rejected() {
        assert!(settings(None, Some("nope")).service_config().is_err());
    }

    #[test]
    fn key_parsers() {
        let signer = LocalSigner::generate();
        assert_eq!(parse_signer(&signer.secret_hex()).unwrap().public_key(), signer.public_key());
        assert_eq!(parse_pubkey(&signer.public_key().to_hex()).unwrap(), signer.public_key());
        assert!(parse_aes_key("00112233445566778899aabbccddeeff").is_ok());
        assert!(parse_aes_key("0011").is_err());
        assert!(parse_pubkey("xyz").is_err());
    }
}
