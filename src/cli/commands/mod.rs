//! One-shot CLI command handlers.

use crate::categories;
use crate::config::Config;
use crate::db::Store;
use crate::services::ReportService;
use crate::worktime::format_duration;

pub async fn cmd_users(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let users = store.list_users().await?;

    if users.is_empty() {
        println!("The directory is empty.");
        return Ok(());
    }

    println!("Directory ({} users)", users.len());
    println!("{:-<70}", "");

    for user in users {
        println!("• {} [{}]", user.name, user.role);
        println!("  NIK: {}", user.nik);

        let approvers = match (&user.approver1, &user.approver2) {
            (None, None) => "none".to_string(),
            (a1, a2) => format!(
                "{} / {}",
                a1.as_deref().unwrap_or("-"),
                a2.as_deref().unwrap_or("-")
            ),
        };
        println!("  Approvers: {}", approvers);
    }

    Ok(())
}

pub fn cmd_categories() -> anyhow::Result<()> {
    println!("Overtime Categories");
    println!("{:-<70}", "");

    for cat in categories::all() {
        println!(
            "• {:<26} {} - {}  [{}]",
            cat.name, cat.start_time, cat.end_time, cat.key
        );
    }

    Ok(())
}

pub async fn cmd_report(config: &Config, start: &str, end: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let reports = ReportService::new(store);

    let summaries = reports
        .user_summaries(start, end)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    if summaries.is_empty() {
        println!("No overtime requests between {} and {}.", start, end);
        return Ok(());
    }

    println!("Overtime Report {} .. {}", start, end);
    println!("{:-<70}", "");

    let mut total_hours = 0.0;
    for summary in &summaries {
        println!("• {} (NIK: {})", summary.name, summary.nik);
        println!(
            "  Requests: {} total | {} approved | {} rejected | {} pending",
            summary.total_requests,
            summary.approved_requests,
            summary.rejected_requests,
            summary.pending_requests
        );
        println!("  Approved hours: {}", format_duration(summary.total_hours));
        total_hours += summary.total_hours;
    }

    println!();
    println!(
        "Total: {} users, {} approved hours",
        summaries.len(),
        format_duration(total_hours)
    );

    Ok(())
}
