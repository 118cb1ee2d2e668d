/// Basic usage of the job market engine
///
/// Walks one job from posting to payout and shows the depreciation a dormant
/// account pays on its next call.
///
/// Run with: cargo run --example basic_usage
use jobmarket_core::*;
use jobmarket_ledger::{AccountId, MemoryLedger, TokenAmount, TokenLedger};

fn main() -> Result<()> {
    println!("🚀 Job Market - Basic Usage Example\n");

    // ============================================================================
    // STEP 1: Set up the market
    // ============================================================================
    let admin = AccountId::from_label("admin");
    let escrow = AccountId::from_label("escrow");
    let alice = AccountId::from_label("alice");
    let bob = AccountId::from_label("bob");

    let mut market = JobMarket::new(MarketConfig::default(), admin, escrow, MemoryLedger::new())?;
    for account in [alice, bob] {
        market.verify(admin, account, 0)?;
        market.enroll(account, 0)?;
    }
    println!("📦 Registered alice and bob, {} each\n", market.config().registration_grant);

    // ============================================================================
    // STEP 2: Post, take and complete a job
    // ============================================================================
    let reward = TokenAmount::from_tokens(50);
    market.ledger_mut().approve(&alice, &escrow, reward)?;

    let job_id = market.create_job(alice, "Translate the README", reward, 60)?;
    println!("📋 Alice posted job {} for {}", job_id, reward);

    market.take_job(bob, job_id, 120)?;
    println!("👷 Bob took job {}", job_id);

    market.complete_and_review_job(alice, job_id, 5, false, 180)?;
    println!("✅ Alice rated it 5 stars and released payment");
    println!("   alice: {}", market.ledger().balance_of(&alice));
    println!("   bob:   {}\n", market.ledger().balance_of(&bob));

    // ============================================================================
    // STEP 3: Depreciation after 90 idle days
    // ============================================================================
    let later = 180 + 90 * SECONDS_PER_DAY;
    let quote = market.quote_depreciation(&bob, later)?;
    println!(
        "📉 After 90 idle days bob owes {} ({}% of {})",
        quote.amount, quote.rate_percent, quote.balance
    );

    let stats = market.stats();
    println!("\n📊 Jobs: {} total, {} completed", stats.total_jobs, stats.completed_jobs);
    println!("   Paid out: {}", stats.totals.paid_out);

    for event in market.drain_events() {
        println!("   event: {}", event.event_type());
    }

    Ok(())
}
