//! SHADE CLI
//!
//! Command-line interface for the SHADE stealth address protocol.

mod keys;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::OsRng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shade_core::constants::{
    DEFAULT_SCAN_BATCH_SIZE, DEFAULT_SCAN_WORKERS, VIEW_TAG_EFFICIENCY, VIEW_TAG_SPACE,
};
use shade_core::types::{Announcement, MetaAddress, PublicKey, ShadeKeys, StealthAddress};
use shade_crypto::ViewTagStats;
use shade_registry::{AnnouncementLog, MemoryAnnouncementLog};
use shade_scanner::{ProgressCallback, ScanSummary, Scanner, ScannerConfig};
use shade_stealth::{
    check_ownership, create_stealth_payment, recover_stealth_key, StealthPaymentBuilder,
};

use crate::keys::KeyFile;

/// One in this many synthetic announcements pays the scanning wallet.
const OWN_PAYMENT_INTERVAL: usize = 100;

/// SHADE - Stealth addresses over secp256k1
#[derive(Parser)]
#[command(name = "shade")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new spend/view key set
    Keygen {
        /// Output file for keys (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create a stealth payment to a meta-address
    Send {
        /// Recipient's meta-address (hex, 66 bytes)
        meta_address: String,
        /// Amount to note in the announcement metadata
        #[arg(long)]
        amount: Option<String>,
        /// Token to note in the announcement metadata
        #[arg(long)]
        token: Option<String>,
        /// Free-form memo
        #[arg(long)]
        memo: Option<String>,
    },

    /// Check whether a stealth address belongs to a key set
    Check {
        /// Path to keys file
        #[arg(short, long, env = "SHADE_KEYS")]
        keys: PathBuf,
        /// Candidate stealth address (0x-prefixed hex)
        #[arg(long)]
        address: String,
        /// Ephemeral public key from the announcement (compressed hex)
        #[arg(long)]
        ephemeral: String,
        /// View tag from the announcement, enables the fast rejection path
        #[arg(long)]
        tag: Option<u8>,
    },

    /// Recover the private key of an owned stealth address
    Recover {
        /// Path to keys file
        #[arg(short, long, env = "SHADE_KEYS")]
        keys: PathBuf,
        /// Stealth address (0x-prefixed hex)
        #[arg(long)]
        address: String,
        /// Ephemeral public key from the announcement (compressed hex)
        #[arg(long)]
        ephemeral: String,
    },

    /// Scan announcements for payments
    Scan {
        /// Path to keys file
        #[arg(short, long, env = "SHADE_KEYS")]
        keys: PathBuf,
        /// Announcements to synthesize when no file is given
        #[arg(short, long, default_value = "10000")]
        count: usize,
        /// JSON array of announcements to scan instead
        #[arg(short, long)]
        announcements: Option<PathBuf>,
        /// Parallel scan workers
        #[arg(short, long, env = "SHADE_SCAN_WORKERS", default_value_t = DEFAULT_SCAN_WORKERS)]
        workers: usize,
        /// Announcements per log query
        #[arg(short, long, env = "SHADE_BATCH_SIZE", default_value_t = DEFAULT_SCAN_BATCH_SIZE)]
        batch_size: usize,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run benchmarks
    Bench {
        /// Number of announcements to generate
        #[arg(short, long, default_value = "10000")]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "shade=debug,info"
    } else {
        "shade=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Keygen { output } => cmd_keygen(output.as_deref()),
        Commands::Send {
            meta_address,
            amount,
            token,
            memo,
        } => cmd_send(&meta_address, amount, token, memo),
        Commands::Check {
            keys,
            address,
            ephemeral,
            tag,
        } => cmd_check(&keys, &address, &ephemeral, tag),
        Commands::Recover {
            keys,
            address,
            ephemeral,
        } => cmd_recover(&keys, &address, &ephemeral),
        Commands::Scan {
            keys,
            count,
            announcements,
            workers,
            batch_size,
            json,
        } => {
            let config = ScannerConfig::new().batch_size(batch_size).workers(workers);
            cmd_scan(&keys, count, announcements.as_deref(), config, json).await
        }
        Commands::Bench { count } => cmd_bench(count).await,
    }
}

/// Generate a new key set
fn cmd_keygen(output: Option<&Path>) -> Result<()> {
    println!("{}", "🔑 Generating SHADE keys...".cyan().bold());

    let keys = ShadeKeys::generate(&mut OsRng).context("Failed to generate keys")?;
    let key_file = KeyFile::from_keys(&keys);

    if let Some(path) = output {
        key_file.save(path)?;
        println!("{} {}", "✅ Keys saved to:".green(), path.display());
    } else {
        println!("\n{}", "Keys (JSON):".yellow().bold());
        println!("{}", serde_json::to_string_pretty(&key_file)?);
    }

    println!("\n{}", "📬 Meta-address (share this):".green().bold());
    println!("   {}", key_file.meta_address);

    println!("\n{}", "⚠️  IMPORTANT: Keep your secret keys safe!".red().bold());
    println!("   spend_secret controls funds; view_secret reveals which payments are yours.");

    Ok(())
}

/// Create a stealth payment
fn cmd_send(
    meta_hex: &str,
    amount: Option<String>,
    token: Option<String>,
    memo: Option<String>,
) -> Result<()> {
    let meta = MetaAddress::from_hex(meta_hex).context("Invalid meta-address")?;
    println!("{}", "💸 Creating stealth payment...".cyan().bold());

    let mut builder = StealthPaymentBuilder::new().recipient(meta);
    if let Some(amount) = amount {
        builder = builder.amount(amount);
    }
    if let Some(token) = token {
        builder = builder.token(token);
    }
    if let Some(memo) = memo {
        builder = builder.memo(memo);
    }

    let payment = builder
        .build(&mut OsRng)
        .context("Failed to create stealth payment")?;

    println!("\n{}", "✅ Stealth payment created:".green().bold());
    println!("   {} {}", "Address:".yellow(), payment.stealth_address);
    println!("   {} {}", "View tag:".dimmed(), payment.announcement.view_tag);
    println!(
        "   {} {}",
        "Ephemeral key:".dimmed(),
        payment.announcement.ephemeral_pub.to_hex()
    );

    println!("\n{}", "📋 Announcement (JSON):".yellow().bold());
    println!("{}", serde_json::to_string_pretty(&payment.announcement)?);

    println!("\n{}", "ℹ️  Next steps:".cyan());
    println!("   1. Send funds to the stealth address above");
    println!("   2. Publish the announcement");

    Ok(())
}

/// Check ownership of a stealth address
fn cmd_check(keys_path: &Path, address: &str, ephemeral: &str, tag: Option<u8>) -> Result<()> {
    let keys = KeyFile::load(keys_path)?;
    let address = StealthAddress::from_hex(address).context("Invalid stealth address")?;
    let ephemeral = PublicKey::from_hex(ephemeral).context("Invalid ephemeral public key")?;

    let owned = check_ownership(
        &address,
        &ephemeral,
        keys.view.secret(),
        keys.spend.public(),
        tag,
    );

    if owned {
        println!("{} {} belongs to these keys", "✅".green(), address);
    } else {
        println!("{} {} is not ours", "❌".red(), address);
    }

    Ok(())
}

/// Recover a stealth private key
fn cmd_recover(keys_path: &Path, address: &str, ephemeral: &str) -> Result<()> {
    let keys = KeyFile::load(keys_path)?;
    let address = StealthAddress::from_hex(address).context("Invalid stealth address")?;
    let ephemeral = PublicKey::from_hex(ephemeral).context("Invalid ephemeral public key")?;

    let recovered = recover_stealth_key(
        &address,
        &ephemeral,
        keys.spend.secret(),
        keys.view.secret(),
    )
    .context("Failed to recover stealth key")?;

    println!("{}", "🔓 Stealth key recovered:".green().bold());
    println!("   {} {}", "Address:".yellow(), recovered.address());
    println!("   {} {}", "Public key:".dimmed(), recovered.public().to_hex());
    println!("   {} {}", "Private key:".red(), recovered.private().to_hex());
    println!("\n{}", "⚠️  Anyone with this private key can spend the funds.".red().bold());

    Ok(())
}

/// Scan for payments
async fn cmd_scan(
    keys_path: &Path,
    count: usize,
    announcements: Option<&Path>,
    config: ScannerConfig,
    json: bool,
) -> Result<()> {
    config.validate()?;
    let keys = KeyFile::load(keys_path)?;
    let log = MemoryAnnouncementLog::new();

    if let Some(path) = announcements {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let loaded: Vec<Announcement> =
            serde_json::from_reader(file).context("Announcements file is not valid JSON")?;
        let imported = log.import(loaded).context("Failed to import announcements")?;
        info!(imported, "Loaded announcements");
    } else {
        println!(
            "{} {} announcements (1 in {} ours)",
            "🧪 Synthesizing".cyan().bold(),
            count,
            OWN_PAYMENT_INTERVAL
        );
        populate(&log, &keys.meta_address(), count).await?;
    }

    let total = log.count().await?;
    if total == 0 {
        println!("\n{}", "⚠️  No announcements to scan.".yellow());
        return Ok(());
    }

    println!("{}", "🔎 Scanning for payments...".cyan().bold());
    let pb = progress_bar(total, "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?;
    let pb_callback = pb.clone();
    let callback: ProgressCallback =
        Box::new(move |progress| pb_callback.set_position(progress.scanned));

    let scanner = Scanner::new(keys.viewing_key());
    let discoveries = if config.workers > 1 {
        scanner
            .scan_parallel_with_progress(&log, config, callback)
            .await?
    } else {
        scanner.scan_with_progress(&log, config, callback).await?
    };
    pb.finish_and_clear();

    let summary = ScanSummary::from(scanner.stats());
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if discoveries.is_empty() {
        println!("\n{}", "No payments found.".yellow());
    } else {
        println!("\n{} {} payment(s) found:", "✅".green(), discoveries.len());
        for payment in &discoveries {
            println!(
                "   {} {}  (announcement #{}, tag {})",
                "Address:".green(),
                payment.announcement.stealth_address,
                payment.announcement.id,
                payment.announcement.view_tag
            );
        }
    }

    println!("\n{}", "📈 Summary:".green().bold());
    println!("   Scanned: {}", summary.total_scanned);
    println!(
        "   Rejected by view tag: {} ({:.1}%)",
        summary.tag_rejections, summary.filter_efficiency
    );
    println!("   Full checks: {}", summary.full_checks);
    println!("   Errors: {}", summary.errors);
    println!("   Rate: {:.0} announcements/sec", summary.rate);

    Ok(())
}

/// Run benchmarks
async fn cmd_bench(count: usize) -> Result<()> {
    if count == 0 {
        bail!("count must be at least 1");
    }
    println!("{} {} announcements", "📊 Benchmarking with".cyan().bold(), count);

    // Generate keys
    println!("\n{}", "1. Generating keys...".dimmed());
    let start = Instant::now();
    let keys = ShadeKeys::generate(&mut OsRng)?;
    println!("   ✓ Key generation: {:?}", start.elapsed());

    // Create announcements
    println!("\n{}", "2. Creating announcements...".dimmed());
    let log = MemoryAnnouncementLog::with_capacity(count);
    let start = Instant::now();
    let expected = populate(&log, &keys.meta_address(), count).await?;
    let creation_time = start.elapsed();
    println!("   ✓ Created {} announcements: {:?}", count, creation_time);
    println!(
        "   ✓ Generation: {:.2}µs per address",
        creation_time.as_micros() as f64 / count as f64
    );

    // View tag distribution
    println!("\n{}", "3. View tag distribution...".dimmed());
    let mut tag_stats = ViewTagStats::new();
    for announcement in log.all_announcements() {
        tag_stats.add(announcement.view_tag);
    }
    if let Some((tag, hits)) = tag_stats.most_common() {
        println!(
            "   ✓ Most common tag: {} ({} hits, {:.1} expected)",
            tag,
            hits,
            tag_stats.expected_uniform_count()
        );
    }
    println!(
        "   ✓ Chi-squared: {:.1} ({} degrees of freedom)",
        tag_stats.chi_squared(),
        VIEW_TAG_SPACE - 1
    );

    // Scan
    println!("\n{}", "4. Scanning...".dimmed());
    let with_tags = Scanner::new(keys.viewing_key());
    let start = Instant::now();
    let found = with_tags.scan_all(&log).await?;
    let tagged_time = start.elapsed();

    let without_tags = Scanner::new(keys.viewing_key());
    let start = Instant::now();
    let found_full = without_tags
        .scan_with_config(&log, ScannerConfig::new().without_view_tags())
        .await?;
    let full_time = start.elapsed();

    println!("   ✓ With view tags: {:?}", tagged_time);
    println!("   ✓ Without view tags: {:?}", full_time);
    println!("   ✓ Found {} payments", found.len());

    let stats = with_tags.stats();
    println!("\n{}", "📈 Results:".green().bold());
    println!(
        "   Scan rate: {:.0} announcements/sec",
        count as f64 / tagged_time.as_secs_f64()
    );
    println!(
        "   Time per announcement: {:.2}µs",
        tagged_time.as_micros() as f64 / count as f64
    );
    println!(
        "   Filter efficiency: {:.1}% (uniform tags: {:.1}%)",
        stats.filter_efficiency(),
        VIEW_TAG_EFFICIENCY
    );
    println!(
        "   View tag speedup: {:.1}x",
        full_time.as_secs_f64() / tagged_time.as_secs_f64().max(f64::EPSILON)
    );

    if found.len() == expected && found_full.len() == expected {
        println!("   {} All expected payments found!", "✅".green());
    } else {
        println!(
            "   {} Expected {}, found {} (with tags) / {} (without)",
            "❌".red(),
            expected,
            found.len(),
            found_full.len()
        );
    }

    Ok(())
}

/// Fills `log` with `count` payments, one in [`OWN_PAYMENT_INTERVAL`] to
/// `ours` and the rest to a throwaway recipient. Returns how many are ours.
async fn populate(log: &MemoryAnnouncementLog, ours: &MetaAddress, count: usize) -> Result<usize> {
    let decoy = ShadeKeys::generate(&mut OsRng)?.meta_address();
    let pb = progress_bar(count as u64, "   [{bar:40.cyan/blue}] {pos}/{len}")?;

    let mut own = 0;
    for i in 0..count {
        let recipient = if i % OWN_PAYMENT_INTERVAL == 0 {
            own += 1;
            ours
        } else {
            &decoy
        };
        let payment = create_stealth_payment(recipient, &mut OsRng)?;
        log.publish(payment.announcement).await?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(own)
}

fn progress_bar(len: u64, template: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(template)?
            .progress_chars("#>-"),
    );
    Ok(pb)
}
