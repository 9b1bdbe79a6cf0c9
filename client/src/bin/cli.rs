use anyhow::Result;
use clap::{Parser, Subcommand};
use client::read_phrase;
use kod_core::config::TOKEN_SYMBOL;
use kod_core::contract_view::render_text;
use kod_core::decrypt::{Participant, Phrase};
use kod_core::utils::format::{format_balance, group_thousands, hex0x};
use kod_core::types::{AccountId32, Trade};
use kod_core::{Config, Context, TradeLookup};
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about = "KOD trade explorer CLI")]
#[command(long_about = r#"Terminal client for the KOD trade explorer.

WORKFLOW - Read a trade contract:
  1. Check the node:        kod-cli stats
  2. Look up the trade:     kod-cli trade 42
  3. Check your role:       kod-cli party 42 5GrwvaEF...
  4. Decrypt the contract:  kod-cli decrypt 42 --phrase-env KOD_PHRASE

RECOVERY PHRASE:
  The 12-word phrase is never accepted as an argument. Pass the name of an
  environment variable holding it with --phrase-env, or type it on stdin.
  It is used inside this process only and is never sent to the node.

Environment variables:
  KOD_WS_URL   - Default node websocket endpoint (default ws://127.0.0.1:9944)
  SS58_PREFIX  - Address prefix for rendered accounts (default 42)"#)]
struct Cli {
    /// Node websocket endpoint (falls back to KOD_WS_URL env var)
    #[arg(long = "url", global = true)]
    url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print chain statistics: trades, completed trades, volume, listings
    Stats,
    /// Print the on-chain record of a trade
    Trade {
        /// Trade id
        id: u64,
    },
    /// Decrypt the contract of a trade as its buyer or seller
    Decrypt {
        /// Trade id
        id: u64,
        /// Environment variable holding the recovery phrase (stdin if absent)
        #[arg(long = "phrase-env")]
        phrase_env: Option<String>,
        /// Print the decrypted contract as JSON instead of sections
        #[arg(long)]
        json: bool,
    },
    /// Tell whether an SS58 address is the buyer or the seller of a trade
    Party {
        /// Trade id
        id: u64,
        /// SS58 account address
        address: String,
    },
    /// Print the account address derived from a recovery phrase, offline
    Address {
        /// Environment variable holding the recovery phrase (stdin if absent)
        #[arg(long = "phrase-env")]
        phrase_env: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match cli.url.as_deref() {
        Some(url) => Config::with_ws_url(url),
        None => Config::from_env(),
    };

    match cli.command {
        Commands::Stats => handle_stats(&*connect(config).await?).await?,
        Commands::Trade { id } => handle_trade(&*connect(config).await?, id).await?,
        Commands::Decrypt { id, phrase_env, json } => {
            let phrase = read_phrase(phrase_env.as_deref())?;
            // a malformed phrase never reaches the node
            Phrase::parse(&phrase)?;
            handle_decrypt(&*connect(config).await?, id, &phrase, json).await?;
        }
        Commands::Party { id, address } => {
            let (account, prefix) = AccountId32::from_ss58(&address)?;
            if prefix != config.ss58_prefix {
                eprintln!("note: address uses prefix {prefix}, explorer is set to {}", config.ss58_prefix);
            }
            handle_party(&*connect(config).await?, id, &account).await?;
        }
        Commands::Address { phrase_env } => {
            let phrase = read_phrase(phrase_env.as_deref())?;
            handle_address(&config, &phrase)?;
        }
    }

    Ok(())
}

async fn connect(config: Config) -> Result<Arc<Context>> {
    let ws_url = config.ws_url.clone();
    let ctx = Context::new(config);
    let chain = ctx.connect(&ws_url).await?;
    eprintln!("connected to {chain} at {ws_url}");
    Ok(ctx)
}

async fn handle_stats(ctx: &Context) -> Result<()> {
    let stats = ctx.load_stats().await?;
    println!("Total trades:     {}", group_thousands(stats.total_trades));
    println!("Completed:        {}", group_thousands(stats.trades_completed));
    println!("Total volume:     {} {TOKEN_SYMBOL}", format_balance(stats.total_volume));
    println!("Listings:         {}", group_thousands(stats.total_listings));
    Ok(())
}

async fn handle_trade(ctx: &Context, id: u64) -> Result<()> {
    let lookup = ctx.query_trade(id).await?;
    print!("{}", trade_text(&lookup, ctx.config().ss58_prefix));
    Ok(())
}

async fn handle_decrypt(ctx: &Context, id: u64, phrase: &str, json: bool) -> Result<()> {
    let lookup = ctx.query_trade(id).await?;
    eprint!("{}", trade_text(&lookup, ctx.config().ss58_prefix));
    let decrypted = ctx.decrypt_current(phrase).await?;
    eprintln!("decrypted trade #{} as {}", decrypted.trade_id, decrypted.address);
    match json {
        true => println!("{}", serde_json::to_string_pretty(&decrypted.contract)?),
        false => print!("{}", render_text(&decrypted.sections)),
    }
    Ok(())
}

async fn handle_party(ctx: &Context, id: u64, account: &AccountId32) -> Result<()> {
    let lookup = ctx.query_trade(id).await?;
    let role = party_role(&lookup.trade, account);
    println!("{} is {role} of trade #{id}", account.to_ss58(ctx.config().ss58_prefix));
    Ok(())
}

fn party_role(trade: &Trade, account: &AccountId32) -> &'static str {
    match account {
        a if !trade.is_party(a) => "not a party",
        a if *a == trade.buyer => "buyer",
        _ => "seller",
    }
}

fn handle_address(config: &Config, phrase: &str) -> Result<()> {
    let participant = Participant::from_phrase(&Phrase::parse(phrase)?)?;
    println!("{}", participant.address(config.ss58_prefix));
    Ok(())
}

fn trade_text(lookup: &TradeLookup, prefix: u8) -> String {
    let t = &lookup.trade;
    let balance = |raw: u128| format!("{} {TOKEN_SYMBOL}", format_balance(raw));

    let mut rows = vec![
        ("Status", t.status.label()),
        ("Listing", format!("#{}", t.listing_id)),
        ("Buyer", t.buyer.to_ss58(prefix)),
        ("Seller", t.seller.to_ss58(prefix)),
        ("Price", balance(t.price)),
        ("Buyer bond", balance(t.buyer_bond)),
        ("Seller bond", balance(t.seller_bond)),
    ];
    if t.tl_price > 0 {
        rows.push(("TL price", format!("{}.{:02} TL", t.tl_price / 100, t.tl_price % 100)));
    }
    rows.push(("Created at block", format!("#{}", t.created_at)));
    rows.push(("Contract hash", hex0x(&t.contract_hash)));
    if let Some(h) = &t.delivery_attestation_hash {
        rows.push(("Delivery attestation", hex0x(h)));
    }
    if let Some(h) = &t.final_hash {
        rows.push(("Final hash", hex0x(h)));
    }
    rows.push(("Encrypted contract", if lookup.has_encrypted { "Yes" } else { "No" }.to_string()));
    if let Some(d) = &lookup.diagnostics {
        rows.push(("Diagnostics score", format!("{}/100", d.score_pct())));
        rows.push(("Passed / failed", format!("{} / {} of {}", d.passed_count, d.failed_count, d.total())));
    }

    let mut out = format!("Trade #{}\n", lookup.trade_id);
    for (key, value) in rows {
        out.push_str(&format!("  {key:<22}{value}\n"));
    }
    out
}
