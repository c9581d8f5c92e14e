//! starboard-draw - Prize draw over the season standings
//!
//! Interactive weighted lottery: every eligible member holds one coupon
//! per draw entry, and winners are drawn without replacement. Top-ranked
//! members and a name denylist are excluded from the pool. Run under
//! human supervision; any failure is fatal to the run.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::seq::SliceRandom;
use rand::Rng;

use starboard_common::cache::StandingsCache;
use starboard_common::config::Config;
use starboard_common::engine::MemberStanding;
use starboard_common::feed::HttpFeedClient;
use starboard_common::time;

/// Command-line arguments for starboard-draw
#[derive(Parser, Debug)]
#[command(name = "starboard-draw")]
#[command(about = "Weighted prize draw over the season standings")]
#[command(version)]
struct Args {
    /// Contest year to draw over (defaults to the current year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Number of winners to draw
    #[arg(short, long, default_value = "3")]
    winners: usize,

    /// Skip the top N entries of the standings; they get real prizes
    /// instead of lottery tickets
    #[arg(long, default_value = "2")]
    skip_top: usize,

    /// Member name excluded from the pool (repeatable)
    #[arg(short, long = "exclude")]
    exclude: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();
    let year = args.year.unwrap_or_else(time::current_year);

    let config = Config::load().context("Failed to load configuration")?;
    let feed = HttpFeedClient::new(&config).context("Failed to create feed client")?;
    let cache = StandingsCache::new(&config, Box::new(feed));

    let standings = cache.get_standings(year).await?.standings;
    for member in &standings {
        println!(
            "{:>2}. {}: {}",
            member.position, member.name, member.draw_entries
        );
    }

    let mut coupons = coupon_pool(&standings, args.skip_top, &args.exclude);
    if coupons.is_empty() {
        bail!("no eligible coupons in the pool for {year}");
    }

    let mut rng = rand::thread_rng();
    coupons.shuffle(&mut rng);

    for n in 1..=args.winners {
        if coupons.is_empty() {
            bail!("coupon pool exhausted after {} winner(s)", n - 1);
        }

        wait_for_enter(&format!("\nPress enter to draw winner #{n}"))?;
        let winner = draw(&mut coupons, &mut rng)?;
        coupons.retain(|name| name != &winner);
    }

    Ok(())
}

/// Build the coupon pool: one coupon per draw entry for every member past
/// the skipped top entries and outside the denylist.
fn coupon_pool(standings: &[MemberStanding], skip_top: usize, exclude: &[String]) -> Vec<String> {
    standings
        .iter()
        .skip(skip_top)
        .filter(|member| !exclude.contains(&member.name))
        .flat_map(|member| {
            std::iter::repeat(member.name.clone()).take(member.draw_entries as usize)
        })
        .collect()
}

/// Pick one coupon at random.
fn pick(coupons: &mut Vec<String>, rng: &mut impl Rng) -> Result<String> {
    coupons.shuffle(rng);
    Ok(coupons.choose(rng).context("empty coupon pool")?.clone())
}

/// Draw one coupon, with a little suspense.
fn draw(coupons: &mut Vec<String>, rng: &mut impl Rng) -> Result<String> {
    for _ in 0..3 {
        print!(".");
        io::stdout().flush()?;
        std::thread::sleep(Duration::from_secs(1));
    }

    let winner = pick(coupons, rng)?;
    println!(" {winner}");

    Ok(winner)
}

fn wait_for_enter(message: &str) -> Result<()> {
    println!("{message}");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
