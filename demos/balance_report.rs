//! Log a handful of events, close the ledger, reopen it and print the report.

use lifefold::{FileStore, Ledger, Polarity, now_millis};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    {
        let mut ledger = Ledger::open(FileStore::open(dir.path())?);
        let ana = ledger.add_friend("Ana", 0.8)?;
        let bo = ledger.add_friend("Bo", 0.3)?;

        ledger.add_event(Polarity::Negative, 9, "lost my wallet", &[])?;
        ledger.add_event(Polarity::Negative, 4, "missed the train", &[])?;
        ledger.add_event(Polarity::Positive, 12, "got the job", &[ana.clone(), bo])?;
        ledger.add_event(Polarity::Positive, 5, "sunny weekend", &[ana])?;
        println!("Logged 4 events");

        ledger.close()?;
    }

    // Reopen to read everything back from disk
    let ledger = Ledger::open(FileStore::open(dir.path())?);
    let summary = ledger.summary();
    let now = now_millis();

    println!("\nEvents:");
    for event in ledger.snapshot().events_newest_first() {
        let friends = ledger.snapshot().shared_friend_names(event);
        println!(
            "  [{}] {:>2} {} ({}){}",
            if event.is_negative() { "-" } else { "+" },
            event.magnitude,
            event.description,
            event.age_label(now),
            if friends.is_empty() {
                String::new()
            } else {
                format!(" with {}", friends.join(", "))
            }
        );
    }

    println!("\nDirect balance:     {}", summary.direct_balance);
    println!("Network effect:     {:.1}", summary.network_effect);
    println!("Total balance:      {:.1}", summary.total_balance);
    println!("Network multiplier: {:.1}x", summary.network_multiplier);
    println!("Debt:               {}", summary.debt.prediction);
    println!("Ratio:              {}", summary.ratio.ratio_label());
    if let Some(warning) = &summary.ratio.warning {
        println!("  {warning}");
    }

    for contribution in ledger.network_effect().breakdown {
        println!(
            "  {} adds {:.1}",
            contribution.friend_name, contribution.contribution
        );
    }

    Ok(())
}
