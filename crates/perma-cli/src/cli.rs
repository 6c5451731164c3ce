use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "perma",
    about = "Permastore: content-addressed storage, signed indexes, and feeds",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with `api_url` and `mirror_url`
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[arg(long, global = true)]
    pub mirror_url: Option<String>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a secp256k1 key pair
    Keygen,
    /// Compute the content identifier of a file without uploading it
    Hash(FileArgs),
    /// Upload a file to the content store
    Store(FileArgs),
    /// Download and verify an object
    Fetch(FetchArgs),
    /// List index entries for a public key
    List(ListArgs),
    /// Store a file and index it under a key
    Insert(InsertArgs),
    /// Publish to or read from a feed
    Feed(FeedArgs),
    /// Encrypt a JSON document under a fresh key
    Encrypt(FileArgs),
    /// Decrypt a document produced by `encrypt`
    Decrypt(DecryptArgs),
}

#[derive(Args)]
pub struct FileArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct FetchArgs {
    pub cid: String,
    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Compressed or uncompressed public key, hex
    pub pubkey: String,
}

#[derive(Args)]
pub struct InsertArgs {
    pub file: PathBuf,
    /// Secret key, hex
    #[arg(long)]
    pub key: String,
}

#[derive(Args)]
pub struct FeedArgs {
    #[command(subcommand)]
    pub action: FeedAction,
}

#[derive(Subcommand)]
pub enum FeedAction {
    /// Publish a JSON document
    Publish {
        file: PathBuf,
        /// Secret key, hex
        #[arg(long)]
        key: String,
        /// 128-bit AES key, hex; publishes encrypted when set
        #[arg(long)]
        aes: Option<String>,
    },
    /// List documents published by a key
    List {
        pubkey: String,
        #[arg(long)]
        aes: Option<String>,
    },
}

#[derive(Args)]
pub struct DecryptArgs {
    /// Ciphertext, hex
    pub ciphertext: String,
    /// Combined key and IV, base-58
    pub key_iv: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keygen() {
        let cli = Cli::try_parse_from(["perma", "keygen"]).unwrap();
        assert!(matches!(cli.command, Command::Keygen));
    }

    #[test]
    fn parse_fetch_output() {
        let cli = Cli::try_parse_from(["perma", "fetch", "Qmabc", "-o", "out.bin"]).unwrap();
        if let Command::Fetch(args) = cli.command {
            assert_eq!(args.cid, "Qmabc");
            assert_eq!(args.output, Some(PathBuf::from("out.bin")));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_insert_requires_key() {
        assert!(Cli::try_parse_from(["perma", "insert", "file.txt"]).is_err());
        let cli = Cli::try_parse_from(["perma", "insert", "file.txt", "--key", "ab"]).unwrap();
        if let Command::Insert(args) = cli.command {
            assert_eq!(args.key, "ab");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_feed_publish_encrypted() {
        let cli = Cli::try_parse_from([
            "perma", "feed", "publish", "doc.json", "--key", "ab", "--aes", "cd",
        ])
        .unwrap();
        if let Command::Feed(args) = cli.command {
            assert!(matches!(
                args.action,
                FeedAction::Publish { aes: Some(ref a), .. } if a == "cd"
            ));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_feed_list() {
        let cli = Cli::try_parse_from(["perma", "feed", "list", "02ab"]).unwrap();
        if let Command::Feed(args) = cli.command {
            assert!(matches!(args.action, FeedAction::List { aes: None, .. }));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "perma", "list", "02ab", "--api-url", "http://localhost:1", "--config", "p.toml",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:1"));
        assert_eq!(cli.config, Some(PathBuf::from("p.toml")));
        assert!(cli.mirror_url.is_none());
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["perma", "--verbose", "keygen"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["perma", "--format", "json", "hash", "x"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
