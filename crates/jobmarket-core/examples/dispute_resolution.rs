/// Dispute resolution example
///
/// The creator flags a job as disputed at review time; the administrator then
/// decides who gets the escrowed reward.
///
/// Run with: cargo run --example dispute_resolution
use jobmarket_core::*;
use jobmarket_ledger::{AccountId, MemoryLedger, TokenAmount, TokenLedger};

fn print_balances(market: &JobMarket<MemoryLedger>, accounts: &[(&str, AccountId)]) {
    for (name, account) in accounts {
        println!("   {:<8} {}", name, market.ledger().balance_of(account));
    }
}

fn main() -> Result<()> {
    println!("⚖️ Job Market - Dispute Resolution Example\n");

    let admin = AccountId::from_label("admin");
    let escrow = AccountId::from_label("escrow");
    let creator = AccountId::from_label("creator");
    let worker = AccountId::from_label("worker");
    let accounts = [("creator", creator), ("worker", worker), ("escrow", escrow)];

    let mut market = JobMarket::new(MarketConfig::default(), admin, escrow, MemoryLedger::new())?;
    for account in [creator, worker] {
        market.verify(admin, account, 0)?;
        market.enroll(account, 0)?;
    }

    let reward = TokenAmount::from_tokens(40);
    market.ledger_mut().approve(&creator, &escrow, reward.saturating_add(reward))?;

    // Job 1: disputed, resolved for the creator
    let first = market.create_job(creator, "Design a logo", reward, 10)?;
    market.take_job(worker, first, 20)?;
    market.complete_and_review_job(creator, first, 1, true, 30)?;
    println!("🚩 Job {} disputed, reward still in escrow:", first);
    print_balances(&market, &accounts);

    let resolution = market.handle_disputed_job(admin, first, false, 40)?;
    println!("\n⚖️ Job {} resolved: {:?}", first, resolution);
    print_balances(&market, &accounts);

    // Job 2: disputed, resolved for the worker
    let second = market.create_job(creator, "Fix the build", reward, 50)?;
    market.take_job(worker, second, 60)?;
    market.complete_and_review_job(creator, second, 2, true, 70)?;
    let resolution = market.handle_disputed_job(admin, second, true, 80)?;
    println!("\n⚖️ Job {} resolved: {:?}", second, resolution);
    print_balances(&market, &accounts);

    // A resolved dispute cannot be reopened
    match market.handle_disputed_job(admin, second, false, 90) {
        Err(e) => println!("\n❌ Second resolution rejected: {}", e),
        Ok(_) => println!("\n⚠️ Unexpectedly resolved twice"),
    }

    let worker_record = market.account(&worker).cloned().unwrap_or_default();
    println!(
        "\n🏅 Worker: {} completed job(s), badge {}",
        worker_record.completed_jobs, worker_record.badge
    );
    Ok(())
}
